use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local precondition failures. These are surfaced before any network or
/// wallet round-trip happens and are always recoverable by correcting input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("contract source must not be empty")]
    EmptySource,
    #[error("contract name must not be empty")]
    EmptyContractName,
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("a compile cycle is already in flight")]
    CompileInFlight,
    #[error("a deploy cycle is already in flight")]
    DeployInFlight,
    #[error("deploy requires a successful compile of the current source")]
    NoSuccessfulCompile,
    #[error("deploy requires a signed-in wallet account")]
    WalletSignedOut,
}
