use everscale_types::error::Error;

use crate::stack::StackValueType;

/// Execution result.
pub type ExecutorResult<T, E = ExecutorError> = ::core::result::Result<T, E>;

/// Stack conversion error.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    #[error("unsupported stack value type: {0}")]
    UnsupportedStackType(String),
    #[error("invalid decimal integer: {0:?}")]
    InvalidInt(String),
    #[error("invalid BOC in stack entry")]
    InvalidBoc(#[source] Error),
}

/// Typed stack read error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StackError {
    #[error("stack underflow at depth {0}")]
    Underflow(usize),
    #[error("expected type {expected:?}, found {actual:?}")]
    InvalidType {
        expected: StackValueType,
        actual: StackValueType,
    },
    #[error("integer does not fit into {0} bits")]
    IntOverflow(u16),
}

/// Contract executor error.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error("no body was provided for message")]
    MissingBody,
    #[error("contract execution failed with exit code {exit_code}")]
    ContractExecution { exit_code: i32 },
    #[error("account is not active")]
    AccountNotActive,
    #[error("invalid cell")]
    InvalidCell(#[from] Error),
    #[error("engine failed")]
    Engine(#[from] anyhow::Error),
}
