use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{AccountId, WalletIdentity};

/// Receipt returned by the wallet provider once a deployment transaction has
/// been signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub transaction_id: String,
}

/// Capability seam for the external wallet/network provider. The provider
/// owns credential persistence and transaction signing; the client only ever
/// observes identities and outcomes through this trait.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Restores any previously signed-in account without user interaction.
    async fn restore_session(&self) -> Result<WalletIdentity>;

    /// Kicks off the provider's external sign-in flow (redirect or popup).
    /// There is no synchronous identity update; completion is observed
    /// through a later `restore_session` call.
    async fn request_sign_in(&self) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;

    /// Signs and submits a contract-deployment transaction carrying `wasm`
    /// under the connected account.
    async fn deploy_contract(
        &self,
        account_id: &AccountId,
        contract_id: &str,
        wasm: &[u8],
    ) -> Result<DeployOutcome>;
}

/// Default stand-in when no wallet backend is wired up. Session restore fails
/// so the client stays in compile-only mode.
pub struct MissingWalletProvider;

#[async_trait]
impl WalletProvider for MissingWalletProvider {
    async fn restore_session(&self) -> Result<WalletIdentity> {
        Err(anyhow!("wallet provider is unavailable"))
    }

    async fn request_sign_in(&self) -> Result<()> {
        Err(anyhow!("wallet provider is unavailable"))
    }

    async fn sign_out(&self) -> Result<()> {
        Err(anyhow!("wallet provider is unavailable"))
    }

    async fn deploy_contract(
        &self,
        _account_id: &AccountId,
        contract_id: &str,
        _wasm: &[u8],
    ) -> Result<DeployOutcome> {
        Err(anyhow!(
            "wallet provider is unavailable; cannot deploy {contract_id}"
        ))
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
