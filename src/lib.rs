extern crate self as everscale_emulator;

/// Prevents using `From::from` for plain error conversion.
macro_rules! ok {
    ($e:expr $(,)?) => {
        match $e {
            core::result::Result::Ok(val) => val,
            core::result::Result::Err(err) => return core::result::Result::Err(err),
        }
    };
}

macro_rules! exec_log {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($tt)*)
    };
}

pub use self::action::{find_new_code, parse_actions_list};
pub use self::engine::{Engine, EngineRequest, EngineResponse, JsonEngine};
pub use self::error::{ExecutorError, ExecutorResult, MarshalError, StackError};
pub use self::executor::{
    ContractExecutor, ContractExecutorBuilder, ExecuteParams, ExecutionResult, ExternalMessage,
    GetterOutput, InternalMessage, MessageOutput, Now, StateUpdate,
};
pub use self::marshal::WireStackEntry;
pub use self::remote::{RemoteAccountState, StateProvider};
pub use self::smc_info::SmcInfo;
pub use self::stack::{StackReader, StackValue, StackValueType};

pub mod action;
pub mod engine;
pub mod error;
pub mod executor;
pub mod marshal;
pub mod remote;
pub mod smc_info;
pub mod stack;
mod util;

#[cfg(test)]
mod tests {
    use std::cell::{Cell as StdCell, RefCell};
    use std::collections::VecDeque;

    use everscale_types::prelude::*;

    use crate::engine::{Engine, EngineRequest, EngineResponse};
    use crate::marshal::WireStackEntry;

    /// Engine double which replays prepared responses and records requests.
    #[derive(Default)]
    pub struct ScriptedEngine {
        responses: RefCell<VecDeque<EngineResponse>>,
        pub requests: RefCell<Vec<EngineRequest>>,
        pub calls: StdCell<usize>,
    }

    impl ScriptedEngine {
        pub fn new<I: IntoIterator<Item = EngineResponse>>(responses: I) -> Self {
            Self {
                responses: RefCell::new(responses.into_iter().collect()),
                ..Default::default()
            }
        }

        pub fn push(&self, response: EngineResponse) {
            self.responses.borrow_mut().push_back(response);
        }

        pub fn last_request(&self) -> EngineRequest {
            self.requests.borrow().last().cloned().unwrap()
        }
    }

    impl Engine for ScriptedEngine {
        fn run(&self, request: &EngineRequest) -> anyhow::Result<EngineResponse> {
            self.calls.set(self.calls.get() + 1);
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted response left"))
        }
    }

    pub fn success(stack: Vec<WireStackEntry>) -> EngineResponse {
        EngineResponse {
            ok: true,
            exit_code: 0,
            gas_consumed: 1000,
            logs: String::new(),
            stack,
            data_cell: None,
            action_list_cell: None,
        }
    }

    pub fn failure(exit_code: i32) -> EngineResponse {
        EngineResponse {
            ok: false,
            exit_code,
            gas_consumed: 0,
            logs: String::new(),
            stack: Vec::new(),
            data_cell: None,
            action_list_cell: None,
        }
    }

    pub fn make_cell(value: u32) -> Cell {
        CellBuilder::build_from(value).unwrap()
    }
}
