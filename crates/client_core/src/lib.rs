use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use shared::{
    domain::{AccountId, WalletIdentity},
    error::ValidationError,
    protocol::{CompileRequest, CompileResponse, ContractTemplate, HealthResponse},
};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{info, warn};

pub mod wallet;
pub use wallet::{DeployOutcome, MissingWalletProvider, WalletProvider};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Terminal outcome of one compile cycle. Immutable once produced; the next
/// cycle replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    pub success: bool,
    pub build_log: String,
    pub error_log: Option<String>,
    pub artifact_size_bytes: Option<u64>,
}

impl CompileResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            build_log: String::new(),
            error_log: Some(message.into()),
            artifact_size_bytes: None,
        }
    }
}

impl From<CompileResponse> for CompileResult {
    fn from(response: CompileResponse) -> Self {
        Self {
            success: response.success,
            build_log: response.output,
            error_log: response.errors,
            artifact_size_bytes: response.wasm_size,
        }
    }
}

/// Terminal outcome of one deploy cycle. Artifact-fetch, signing, and
/// submission failures all collapse into the same failure shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub deployed_contract_id: Option<String>,
    pub error_message: Option<String>,
}

impl DeployResult {
    fn deployed(transaction_id: String, deployed_contract_id: String) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id),
            deployed_contract_id: Some(deployed_contract_id),
            error_message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            deployed_contract_id: None,
            error_message: Some(message.into()),
        }
    }
}

/// All mutable client state for one editing session. Mutated exclusively by
/// orchestrator entry/completion and explicit user actions.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub source_text: String,
    pub contract_name: String,
    pub selected_template: Option<String>,
    pub compile_in_flight: bool,
    pub deploy_in_flight: bool,
    pub last_compile: Option<CompileResult>,
    pub last_deploy: Option<DeployResult>,
    pub wallet: WalletIdentity,
    /// Whether wallet provider initialization succeeded this session.
    /// `connect_wallet` is a no-op until it has.
    pub wallet_ready: bool,
}

/// Notifications for the presentation layer. Every state transition that a
/// view could render is mirrored here; consumers that lag simply miss events
/// and re-read the session snapshot.
#[derive(Debug, Clone)]
pub enum StudioEvent {
    TemplatesLoaded { count: usize },
    TemplateApplied { name: String },
    CompileStarted,
    CompileFinished(CompileResult),
    DeployStarted,
    DeployFinished(DeployResult),
    WalletChanged(WalletIdentity),
    Error(String),
}

/// Client core for the contract playground: owns the session state store and
/// drives compile/deploy cycles against the remote build service and the
/// wallet provider.
pub struct StudioClient {
    http: Client,
    build_service_url: String,
    wallet: Arc<dyn WalletProvider>,
    inner: Mutex<SessionState>,
    templates: RwLock<Vec<ContractTemplate>>,
    events: broadcast::Sender<StudioEvent>,
}

impl StudioClient {
    pub fn new(build_service_url: impl Into<String>) -> Arc<Self> {
        Self::new_with_wallet(build_service_url, Arc::new(MissingWalletProvider))
    }

    pub fn new_with_wallet(
        build_service_url: impl Into<String>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Arc<Self> {
        let build_service_url = build_service_url.into().trim_end_matches('/').to_string();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            http: Client::new(),
            build_service_url,
            wallet,
            inner: Mutex::new(SessionState::default()),
            templates: RwLock::new(Vec::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current session state for rendering.
    pub async fn session(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    /// Session-start bootstrap: template catalogue plus wallet session
    /// restore. Either collaborator may be down; the client stays usable in
    /// whatever mode remains (hand-written source, compile-only).
    pub async fn initialize(&self) -> Result<()> {
        if let Err(err) = self.load_templates().await {
            warn!("template catalogue unavailable: {err:#}");
            let _ = self
                .events
                .send(StudioEvent::Error(format!("template load failed: {err:#}")));
        }
        if let Err(err) = self.initialize_wallet().await {
            warn!("wallet session restore unavailable: {err:#}");
            let _ = self
                .events
                .send(StudioEvent::Error(format!("wallet restore failed: {err:#}")));
        }
        Ok(())
    }

    /// Fetches the starter-contract catalogue. Populated once per session
    /// load; a failure leaves the catalogue empty and is not retried here.
    pub async fn load_templates(&self) -> Result<usize> {
        let templates: Vec<ContractTemplate> = self
            .http
            .get(format!("{}/templates", self.build_service_url))
            .send()
            .await
            .context("failed to reach build service for templates")?
            .error_for_status()?
            .json()
            .await
            .context("invalid template catalogue payload")?;

        let count = templates.len();
        *self.templates.write().await = templates;
        info!(count, "template catalogue loaded");
        let _ = self.events.send(StudioEvent::TemplatesLoaded { count });
        Ok(count)
    }

    pub async fn templates(&self) -> Vec<ContractTemplate> {
        self.templates.read().await.clone()
    }

    pub async fn health_check(&self) -> Result<HealthResponse> {
        let health: HealthResponse = self
            .http
            .get(format!("{}/health", self.build_service_url))
            .send()
            .await
            .context("failed to reach build service for health check")?
            .error_for_status()?
            .json()
            .await
            .context("invalid health response payload")?;
        Ok(health)
    }

    pub async fn set_source_text(&self, source_text: impl Into<String>) {
        self.inner.lock().await.source_text = source_text.into();
    }

    pub async fn set_contract_name(&self, contract_name: impl Into<String>) {
        self.inner.lock().await.contract_name = contract_name.into();
    }

    /// Loads a starter contract into the editor: source text from the
    /// template, contract name normalized from the template name. Both stale
    /// results are cleared since the input they described is gone.
    pub async fn apply_template(&self, name: &str) -> Result<(), ValidationError> {
        let template = {
            let templates = self.templates.read().await;
            templates
                .iter()
                .find(|template| template.name == name)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownTemplate(name.to_string()))?
        };

        {
            let mut inner = self.inner.lock().await;
            inner.source_text = template.code;
            inner.contract_name = normalize_contract_name(&template.name);
            inner.selected_template = Some(template.name.clone());
            inner.last_compile = None;
            inner.last_deploy = None;
        }
        let _ = self.events.send(StudioEvent::TemplateApplied {
            name: template.name,
        });
        Ok(())
    }

    /// Restores any persisted wallet session. On provider failure the
    /// identity stays signed out and the client runs in compile-only mode.
    pub async fn initialize_wallet(&self) -> Result<WalletIdentity> {
        match self.wallet.restore_session().await {
            Ok(identity) => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.wallet = identity.clone();
                    inner.wallet_ready = true;
                }
                info!(signed_in = identity.signed_in(), "wallet session restored");
                let _ = self.events.send(StudioEvent::WalletChanged(identity.clone()));
                Ok(identity)
            }
            Err(err) => {
                let mut inner = self.inner.lock().await;
                inner.wallet = WalletIdentity::SignedOut;
                inner.wallet_ready = false;
                Err(err).context("wallet provider initialization failed")
            }
        }
    }

    /// Re-checks the provider's persisted session. This is how the outcome of
    /// an external sign-in round-trip becomes visible to the client.
    pub async fn resume_wallet_session(&self) -> Result<WalletIdentity> {
        self.initialize_wallet().await
    }

    /// Starts the provider's external sign-in flow. Returns without an
    /// identity update; call `resume_wallet_session` once the round-trip
    /// completes. No-op when the provider was never initialized.
    pub async fn connect_wallet(&self) -> Result<()> {
        let wallet_ready = { self.inner.lock().await.wallet_ready };
        if !wallet_ready {
            warn!("wallet connect ignored: provider not initialized");
            return Ok(());
        }
        self.wallet
            .request_sign_in()
            .await
            .context("wallet sign-in request failed")
    }

    /// Terminates the wallet session. The last deploy result is cleared with
    /// it; a deploy outcome is meaningless once the signing identity that
    /// produced it is gone. The last compile result survives.
    pub async fn disconnect_wallet(&self) {
        let was_signed_in = { self.inner.lock().await.wallet.signed_in() };
        if was_signed_in {
            if let Err(err) = self.wallet.sign_out().await {
                warn!("wallet provider sign-out failed: {err:#}");
            }
        }

        {
            let mut inner = self.inner.lock().await;
            inner.wallet = WalletIdentity::SignedOut;
            inner.last_deploy = None;
        }
        info!("wallet disconnected");
        let _ = self
            .events
            .send(StudioEvent::WalletChanged(WalletIdentity::SignedOut));
    }

    /// Drives one compile cycle against the build service. Preconditions are
    /// validated locally; once a cycle starts it runs to a terminal result
    /// and a second invocation in the meantime is refused, never queued.
    /// A running deploy cycle also blocks compile: its completion writes
    /// `last_deploy` back, which would resurrect a result this cycle just
    /// cleared.
    pub async fn compile(&self) -> Result<CompileResult, ValidationError> {
        let request = {
            let mut inner = self.inner.lock().await;
            if inner.compile_in_flight {
                return Err(ValidationError::CompileInFlight);
            }
            if inner.deploy_in_flight {
                return Err(ValidationError::DeployInFlight);
            }
            if inner.source_text.trim().is_empty() {
                return Err(ValidationError::EmptySource);
            }
            let contract_name = inner.contract_name.trim().to_string();
            if contract_name.is_empty() {
                return Err(ValidationError::EmptyContractName);
            }
            inner.compile_in_flight = true;
            inner.last_compile = None;
            inner.last_deploy = None;
            CompileRequest {
                code: inner.source_text.clone(),
                contract_name,
            }
        };
        let _ = self.events.send(StudioEvent::CompileStarted);

        let result = match self.request_compile(&request).await {
            Ok(response) => CompileResult::from(response),
            Err(err) => {
                warn!(
                    contract_name = %request.contract_name,
                    "compile request failed: {err:#}"
                );
                CompileResult::failed(format!("compile request failed: {err:#}"))
            }
        };

        {
            let mut inner = self.inner.lock().await;
            inner.compile_in_flight = false;
            inner.last_compile = Some(result.clone());
        }
        info!(
            contract_name = %request.contract_name,
            success = result.success,
            "compile cycle finished"
        );
        let _ = self.events.send(StudioEvent::CompileFinished(result.clone()));
        Ok(result)
    }

    async fn request_compile(&self, request: &CompileRequest) -> Result<CompileResponse> {
        let response: CompileResponse = self
            .http
            .post(format!("{}/compile", self.build_service_url))
            .json(request)
            .send()
            .await
            .context("failed to reach build service")?
            .error_for_status()?
            .json()
            .await
            .context("invalid compile response payload")?;
        Ok(response)
    }

    /// Drives one deploy cycle: fetch the compiled artifact, derive a unique
    /// deployment identifier, then have the wallet sign and submit the
    /// transaction. The artifact is re-fetched fresh on every attempt since a
    /// recompile may have replaced it.
    pub async fn deploy(&self) -> Result<DeployResult, ValidationError> {
        let (contract_name, account_id) = {
            let mut inner = self.inner.lock().await;
            if inner.deploy_in_flight {
                return Err(ValidationError::DeployInFlight);
            }
            if !inner
                .last_compile
                .as_ref()
                .is_some_and(|result| result.success)
            {
                return Err(ValidationError::NoSuccessfulCompile);
            }
            let Some(account_id) = inner.wallet.account_id().cloned() else {
                return Err(ValidationError::WalletSignedOut);
            };
            let contract_name = inner.contract_name.trim().to_string();
            if contract_name.is_empty() {
                return Err(ValidationError::EmptyContractName);
            }
            inner.deploy_in_flight = true;
            inner.last_deploy = None;
            (contract_name, account_id)
        };
        let _ = self.events.send(StudioEvent::DeployStarted);

        let result = match self.run_deploy_cycle(&contract_name, &account_id).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    contract_name = %contract_name,
                    account_id = %account_id,
                    "deploy cycle failed: {err:#}"
                );
                DeployResult::failed(format!("{err:#}"))
            }
        };

        {
            let mut inner = self.inner.lock().await;
            inner.deploy_in_flight = false;
            inner.last_deploy = Some(result.clone());
        }
        info!(
            contract_name = %contract_name,
            success = result.success,
            "deploy cycle finished"
        );
        let _ = self.events.send(StudioEvent::DeployFinished(result.clone()));
        Ok(result)
    }

    async fn run_deploy_cycle(
        &self,
        contract_name: &str,
        account_id: &AccountId,
    ) -> Result<DeployResult> {
        let wasm = self
            .download_artifact(contract_name)
            .await
            .context("artifact download failed")?;

        let deployed_contract_id =
            derive_deploy_id(contract_name, account_id, Utc::now().timestamp_millis());

        let outcome = self
            .wallet
            .deploy_contract(account_id, &deployed_contract_id, &wasm)
            .await
            .context("wallet deploy failed")?;

        Ok(DeployResult::deployed(
            outcome.transaction_id,
            deployed_contract_id,
        ))
    }

    /// Fetches the compiled binary artifact for `contract_name`. Also backs
    /// the user-initiated artifact download action.
    pub async fn download_artifact(&self, contract_name: &str) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(format!(
                "{}/download-wasm/{contract_name}",
                self.build_service_url
            ))
            .send()
            .await
            .context("failed to reach build service for artifact")?
            .error_for_status()?
            .bytes()
            .await
            .context("artifact body transfer failed")?;
        Ok(bytes.to_vec())
    }
}

/// Editor-facing form of a template name: lowercase, whitespace runs become
/// single underscores.
pub fn normalize_contract_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Deployment identifiers compose the contract name, a fresh timestamp, and
/// the connected account so repeated deployments of the same name never
/// collide with a prior on-chain contract.
fn derive_deploy_id(contract_name: &str, account_id: &AccountId, timestamp_ms: i64) -> String {
    format!("{contract_name}-{timestamp_ms}.{account_id}")
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
