use anyhow::{Context, Result};
use everscale_types::prelude::*;
use serde::{Deserialize, Serialize};

use crate::marshal::WireStackEntry;

/// Bytecode execution engine.
///
/// Runs the contract code once per request and reports the committed
/// state. Implementations must not retry failed runs.
pub trait Engine {
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse>;
}

impl<T: Engine + ?Sized> Engine for &'_ T {
    #[inline]
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse> {
        T::run(self, request)
    }
}

impl<T: Engine + ?Sized> Engine for Box<T> {
    #[inline]
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse> {
        T::run(self, request)
    }
}

/// Single engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    /// Contract code root.
    #[serde(with = "crate::util::serde_boc")]
    pub code: Cell,
    /// Persistent contract data (`c4`).
    #[serde(with = "crate::util::serde_boc")]
    pub data: Cell,
    /// Initial stack.
    pub stack: Vec<WireStackEntry>,
    /// Method name to resolve into a selector.
    pub method: String,
    /// Smart contract info (`c7`).
    pub c7: WireStackEntry,
    /// Whether the engine should collect debug output.
    pub debug: bool,
}

/// Engine output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub ok: bool,
    pub exit_code: i32,
    pub gas_consumed: u64,
    /// Base64-encoded debug output.
    #[serde(default)]
    pub logs: String,
    #[serde(default)]
    pub stack: Vec<WireStackEntry>,
    /// Base64-encoded BOC with the new persistent data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_cell: Option<String>,
    /// Base64-encoded BOC with the action list (`c5`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_list_cell: Option<String>,
}

/// Adapter for engines with a JSON-in, JSON-out entry point.
pub struct JsonEngine<F> {
    f: F,
}

impl<F> JsonEngine<F>
where
    F: Fn(&str) -> Result<String>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Engine for JsonEngine<F>
where
    F: Fn(&str) -> Result<String>,
{
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse> {
        let request = serde_json::to_string(request).context("failed to encode engine request")?;
        let response = (self.f)(&request)?;
        serde_json::from_str(&response).context("failed to decode engine response")
    }
}
