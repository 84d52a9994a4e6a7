use everscale_types::models::StdAddr;
use everscale_types::prelude::*;
use num_bigint::BigUint;

use crate::engine::Engine;
use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::ContractExecutor;

/// Account state as reported by a chain state provider.
#[derive(Debug, Clone)]
pub enum RemoteAccountState {
    Uninit,
    Frozen,
    Active {
        code: Cell,
        data: Cell,
        balance: BigUint,
    },
}

/// Source of the chain state at some block.
pub trait StateProvider {
    /// Blockchain config root at the specified block.
    fn config(&self, block: u32) -> anyhow::Result<Cell>;

    fn account(&self, block: u32, address: &StdAddr) -> anyhow::Result<RemoteAccountState>;
}

impl<T: StateProvider + ?Sized> StateProvider for &'_ T {
    #[inline]
    fn config(&self, block: u32) -> anyhow::Result<Cell> {
        T::config(self, block)
    }

    #[inline]
    fn account(&self, block: u32, address: &StdAddr) -> anyhow::Result<RemoteAccountState> {
        T::account(self, block, address)
    }
}

impl<E: Engine> ContractExecutor<E> {
    /// Creates an executor from an active account at the specified block.
    ///
    /// Logical time starts from zero, unix time is the current wall time.
    pub fn from_remote<P: StateProvider>(
        provider: P,
        block: u32,
        address: StdAddr,
        engine: E,
    ) -> ExecutorResult<Self> {
        let config = provider.config(block)?;

        let RemoteAccountState::Active {
            code,
            data,
            balance,
        } = provider.account(block, &address)?
        else {
            exec_log!(block, %address, "account is not active");
            return Err(ExecutorError::AccountNotActive);
        };

        Ok(ContractExecutor::builder(code, data)
            .with_balance(balance)
            .with_config(config)
            .with_address(address)
            .build(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_cell, success, ScriptedEngine};

    struct StaticProvider {
        state: RemoteAccountState,
    }

    impl StateProvider for StaticProvider {
        fn config(&self, block: u32) -> anyhow::Result<Cell> {
            Ok(make_cell(block))
        }

        fn account(&self, _: u32, _: &StdAddr) -> anyhow::Result<RemoteAccountState> {
            Ok(self.state.clone())
        }
    }

    #[test]
    fn active_account_is_loaded() {
        let provider = StaticProvider {
            state: RemoteAccountState::Active {
                code: make_cell(1),
                data: make_cell(2),
                balance: BigUint::from(49_999_800_000_000u64),
            },
        };
        let address = StdAddr::new(0, HashBytes([0xec; 32]));
        let engine = ScriptedEngine::new([success(Vec::new())]);

        let mut executor =
            ContractExecutor::from_remote(&provider, 479216, address.clone(), &engine).unwrap();
        assert_eq!(executor.code(), &make_cell(1));
        assert_eq!(executor.data(), &make_cell(2));
        assert_eq!(executor.config(), &make_cell(479216));
        assert_eq!(executor.address(), &address);
        assert_eq!(executor.balance(), &BigUint::from(49_999_800_000_000u64));
        assert_eq!(executor.account_lt(), 0);

        executor.get("get_staking_status", &[]).unwrap();
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn inactive_account_is_rejected() {
        for state in [RemoteAccountState::Uninit, RemoteAccountState::Frozen] {
            let provider = StaticProvider { state };
            let engine = ScriptedEngine::default();
            let res = ContractExecutor::from_remote(
                &provider,
                1,
                StdAddr::new(0, HashBytes::ZERO),
                &engine,
            );
            assert!(matches!(res, Err(ExecutorError::AccountNotActive)));
        }
    }
}
