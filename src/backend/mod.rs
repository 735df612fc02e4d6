pub mod memory;
pub mod remote;

pub use memory::InMemoryBackend;
pub use remote::{InitState, RemoteBackend};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("remote configuration incomplete, missing: {}", missing.join(", "))]
    ConfigIncomplete { missing: Vec<&'static str> },

    #[error("remote backend not initialized")]
    NotInitialized,

    #[error("remote I/O error: {0}")]
    RemoteIo(String),

    #[error("transaction gave up after {attempts} conflicting writes")]
    Conflict { attempts: u32 },

    #[error("stored value is not a counter: {0}")]
    InvalidValue(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteIo(err.to_string())
    }
}

/// A source of counters. Absent counters read as 0.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<u64, BackendError>;

    /// Adds `amount` and returns the value after the increment.
    async fn increment(&self, key: &str, amount: u64) -> Result<u64, BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    #[serde(alias = "demo", alias = "inmemory")]
    Memory,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" | "firebase" => Some(Self::Remote),
            "memory" | "inmemory" | "demo" => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Memory => "memory",
        }
    }
}
