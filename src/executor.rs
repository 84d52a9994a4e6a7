use base64::Engine as _;
use everscale_types::error::Error;
use everscale_types::models::{
    ExtInMsgInfo, IntMsgInfo, MsgInfo, OutAction, OwnedMessage, StateInit, StdAddr,
};
use everscale_types::prelude::*;
use num_bigint::{BigInt, BigUint};

use crate::action::{find_new_code, parse_actions_list};
use crate::engine::{Engine, EngineRequest};
use crate::error::{ExecutorError, ExecutorResult};
use crate::marshal;
use crate::smc_info::SmcInfo;
use crate::stack::{StackReader, StackValue};
use crate::util::now_sec;

/// Method which handles inbound internal messages.
pub const RECV_INTERNAL: &str = "recv_internal";
/// Method which handles inbound external messages.
pub const RECV_EXTERNAL: &str = "recv_external";

/// Local executor of a single contract.
///
/// Keeps the account state between calls the same way a real account
/// would: successful message handlers commit new data and code and bump
/// the account logical time. Getters never change anything (unless called
/// with a message handler name).
pub struct ContractExecutor<E> {
    engine: E,
    params: ExecuteParams,
    state: ContractState,
}

#[derive(Debug, Clone)]
struct ContractState {
    code: Cell,
    data: Cell,
    balance: BigUint,
    config: Cell,
    address: StdAddr,
    now: u32,
    block_lt: u64,
    account_lt: u64,
}

impl ContractExecutor<()> {
    pub fn builder(code: Cell, data: Cell) -> ContractExecutorBuilder {
        ContractExecutorBuilder {
            code,
            data,
            balance: None,
            config: None,
            address: None,
            now: None,
            lt: None,
            params: ExecuteParams::default(),
        }
    }
}

impl<E: Engine> ContractExecutor<E> {
    pub fn code(&self) -> &Cell {
        &self.state.code
    }

    pub fn data(&self) -> &Cell {
        &self.state.data
    }

    pub fn balance(&self) -> &BigUint {
        &self.state.balance
    }

    pub fn config(&self) -> &Cell {
        &self.state.config
    }

    pub fn address(&self) -> &StdAddr {
        &self.state.address
    }

    pub fn now(&self) -> u32 {
        self.state.now
    }

    pub fn block_lt(&self) -> u64 {
        self.state.block_lt
    }

    pub fn account_lt(&self) -> u64 {
        self.state.account_lt
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Params used by [`get`], [`internal`] and [`external`].
    ///
    /// [`get`]: Self::get
    /// [`internal`]: Self::internal
    /// [`external`]: Self::external
    pub fn set_params(&mut self, params: ExecuteParams) {
        self.params = params;
    }

    /// Applies only the specified fields.
    ///
    /// Setting the block logical time also resets the account logical time.
    pub fn update(&mut self, update: StateUpdate) {
        if let Some(config) = update.config {
            self.state.config = config;
        }
        if let Some(balance) = update.balance {
            self.state.balance = balance;
        }
        match update.now {
            Some(Now::Refresh) => self.state.now = now_sec(),
            Some(Now::At(now)) => self.state.now = now,
            None => {}
        }
        if let Some(lt) = update.lt {
            self.state.block_lt = lt;
            self.state.account_lt = lt;
        }
    }

    /// Runs the specified method with the provided stack.
    ///
    /// Only [`RECV_INTERNAL`] and [`RECV_EXTERNAL`] runs change the state,
    /// and only when the engine reports success:
    /// - data is replaced with the committed one (if any);
    /// - code is replaced by the last `SetCode` action (if any);
    /// - account logical time is incremented.
    ///
    /// Balance is never updated from the engine output.
    pub fn execute(
        &mut self,
        method: &str,
        stack: &[StackValue],
        params: ExecuteParams,
    ) -> ExecutorResult<ExecutionResult> {
        let c7 = self.smc_info().build_c7()?;
        let request = EngineRequest {
            code: self.state.code.clone(),
            data: self.state.data.clone(),
            stack: marshal::forward(stack),
            method: method.to_owned(),
            c7: marshal::forward_value(&c7),
            debug: params.debug,
        };

        exec_log!(method, account_lt = self.state.account_lt, "running contract");
        let response = self.engine.run(&request)?;
        if !response.ok {
            exec_log!(method, exit_code = response.exit_code, "contract execution failed");
            return Err(ExecutorError::ContractExecution {
                exit_code: response.exit_code,
            });
        }

        let logs = decode_logs(&response.logs)?;
        let stack = marshal::backward(&response.stack)?;
        let actions = match &response.action_list_cell {
            Some(actions) => parse_actions_list(&Boc::decode_base64(actions)?)?,
            None => Vec::new(),
        };

        if is_message_handler(method) {
            let new_data = match &response.data_cell {
                Some(data) => Some(Boc::decode_base64(data)?),
                None => None,
            };

            if let Some(data) = new_data {
                self.state.data = data;
            }
            if let Some(code) = find_new_code(&actions) {
                exec_log!(method, "contract code replaced");
                self.state.code = code.clone();
            }
            self.state.account_lt += 1;
        }

        exec_log!(
            method,
            gas_consumed = response.gas_consumed,
            actions = actions.len(),
            "contract executed"
        );

        Ok(ExecutionResult {
            stack,
            gas_consumed: response.gas_consumed,
            logs,
            actions,
        })
    }

    /// Runs a get method.
    pub fn get(&mut self, method: &str, args: &[StackValue]) -> ExecutorResult<GetterOutput> {
        let params = self.params;
        let res = ok!(self.execute(method, args, params));
        Ok(GetterOutput {
            stack: res.stack,
            gas_consumed: res.gas_consumed,
            logs: res.logs,
        })
    }

    /// Delivers an inbound internal message.
    pub fn internal(&mut self, msg: &InternalMessage) -> ExecutorResult<MessageOutput> {
        let Some(body) = &msg.body else {
            return Err(ExecutorError::MissingBody);
        };

        let msg_cell = build_message(MsgInfo::Int(msg.info.clone()), msg.init.clone(), body)?;
        let value = BigInt::from(msg.info.value.tokens.into_inner());

        let stack = [
            StackValue::Int(BigInt::from(self.state.balance.clone())),
            StackValue::Int(value),
            StackValue::Cell(msg_cell),
            StackValue::Slice(body.clone()),
        ];
        let params = self.params;
        self.execute(RECV_INTERNAL, &stack, params)
            .map(MessageOutput::from)
    }

    /// Delivers an inbound external message.
    pub fn external(&mut self, msg: &ExternalMessage) -> ExecutorResult<MessageOutput> {
        let Some(body) = &msg.body else {
            return Err(ExecutorError::MissingBody);
        };

        let msg_cell = build_message(MsgInfo::ExtIn(msg.info.clone()), msg.init.clone(), body)?;

        let stack = [
            StackValue::Int(BigInt::from(self.state.balance.clone())),
            StackValue::int(0),
            StackValue::Cell(msg_cell),
            StackValue::Slice(body.clone()),
        ];
        let params = self.params;
        self.execute(RECV_EXTERNAL, &stack, params)
            .map(MessageOutput::from)
    }

    fn smc_info(&self) -> SmcInfo {
        SmcInfo::new()
            .with_now(self.state.now)
            .with_block_lt(self.state.block_lt)
            .with_tx_lt(self.state.account_lt)
            .with_rand_seed(SmcInfo::random_seed())
            .with_balance(self.state.balance.clone())
            .with_address(self.state.address.clone())
            .with_config(self.state.config.clone())
    }
}

/// [`ContractExecutor`] initialization params.
pub struct ContractExecutorBuilder {
    code: Cell,
    data: Cell,
    balance: Option<BigUint>,
    config: Option<Cell>,
    address: Option<StdAddr>,
    now: Option<u32>,
    lt: Option<u64>,
    params: ExecuteParams,
}

impl ContractExecutorBuilder {
    pub fn with_balance<T: Into<BigUint>>(mut self, balance: T) -> Self {
        self.balance = Some(balance.into());
        self
    }

    pub fn with_config(mut self, config: Cell) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_address(mut self, address: StdAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_now(mut self, now: u32) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_lt(mut self, lt: u64) -> Self {
        self.lt = Some(lt);
        self
    }

    pub fn with_params(mut self, params: ExecuteParams) -> Self {
        self.params = params;
        self
    }

    pub fn build<E: Engine>(self, engine: E) -> ContractExecutor<E> {
        let lt = self.lt.unwrap_or_default();
        ContractExecutor {
            engine,
            params: self.params,
            state: ContractState {
                code: self.code,
                data: self.data,
                balance: self.balance.unwrap_or_default(),
                config: self.config.unwrap_or_else(Cell::empty_cell),
                address: self
                    .address
                    .unwrap_or_else(|| StdAddr::new(0, HashBytes::ZERO)),
                now: self.now.unwrap_or_else(now_sec),
                block_lt: lt,
                account_lt: lt,
            },
        }
    }
}

/// Partial state update.
#[derive(Debug, Default, Clone)]
pub struct StateUpdate {
    pub config: Option<Cell>,
    pub balance: Option<BigUint>,
    pub now: Option<Now>,
    pub lt: Option<u64>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Cell) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_balance<T: Into<BigUint>>(mut self, balance: T) -> Self {
        self.balance = Some(balance.into());
        self
    }

    pub fn with_now(mut self, now: u32) -> Self {
        self.now = Some(Now::At(now));
        self
    }

    pub fn with_current_time(mut self) -> Self {
        self.now = Some(Now::Refresh);
        self
    }

    pub fn with_lt(mut self, lt: u64) -> Self {
        self.lt = Some(lt);
        self
    }
}

/// New unix time for the executor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Now {
    /// Use the current wall time.
    Refresh,
    At(u32),
}

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ExecuteParams {
    pub debug: bool,
}

/// Inbound internal message.
#[derive(Debug, Clone)]
pub struct InternalMessage {
    pub info: IntMsgInfo,
    pub init: Option<StateInit>,
    pub body: Option<Cell>,
}

/// Inbound external message.
#[derive(Debug, Clone)]
pub struct ExternalMessage {
    pub info: ExtInMsgInfo,
    pub init: Option<StateInit>,
    pub body: Option<Cell>,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stack: Vec<StackValue>,
    pub gas_consumed: u64,
    pub logs: String,
    pub actions: Vec<OutAction>,
}

#[derive(Debug, Clone)]
pub struct GetterOutput {
    pub stack: Vec<StackValue>,
    pub gas_consumed: u64,
    pub logs: String,
}

impl GetterOutput {
    pub fn reader(&self) -> StackReader {
        StackReader::new(self.stack.clone())
    }
}

#[derive(Debug, Clone)]
pub struct MessageOutput {
    pub gas_consumed: u64,
    pub logs: String,
    pub actions: Vec<OutAction>,
}

impl From<ExecutionResult> for MessageOutput {
    fn from(value: ExecutionResult) -> Self {
        Self {
            gas_consumed: value.gas_consumed,
            logs: value.logs,
            actions: value.actions,
        }
    }
}

fn is_message_handler(method: &str) -> bool {
    method == RECV_INTERNAL || method == RECV_EXTERNAL
}

fn build_message(info: MsgInfo, init: Option<StateInit>, body: &Cell) -> Result<Cell, Error> {
    let msg = OwnedMessage {
        info,
        init,
        body: (body.clone(), CellSliceRange::full(body.as_ref())),
        layout: None,
    };
    CellBuilder::build_from(&msg)
}

fn decode_logs(logs: &str) -> ExecutorResult<String> {
    match base64::engine::general_purpose::STANDARD.decode(logs) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => Err(ExecutorError::Engine(
            anyhow::Error::new(e).context("invalid engine logs"),
        )),
    }
}
