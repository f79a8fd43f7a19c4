use serde::{Deserialize, Serialize};

/// Wire contract of the remote build service. Field names follow the service
/// exactly; the client treats every response shape as read-only.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    pub code: String,
    pub contract_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    pub output: String,
    pub errors: Option<String>,
    pub wasm_size: Option<u64>,
}

/// Starter contract entry from `GET /templates`. Names are unique within one
/// catalogue fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTemplate {
    pub name: String,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
