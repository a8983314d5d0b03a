//! Application state shared across all request handlers.

use std::sync::Arc;

use cpgw_core::config::GatewayConfig;
use cpgw_core::ledger::LedgerSink;
use cpgw_core::orchestrator::InvoiceOrchestrator;
use cpgw_core::webhook::WebhookValidator;
use cpgw_sdk::client::{ApiClient, ClientError};

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub api: ApiClient,
    pub orchestrator: Arc<InvoiceOrchestrator>,
    pub validator: Arc<WebhookValidator>,
    /// Sink that verified transactions are handed to.
    pub ledger: Arc<dyn LedgerSink>,
}

impl AppState {
    /// Wire up the gateway collaborators around a shared config.
    pub fn new(
        config: Arc<GatewayConfig>,
        ledger: Arc<dyn LedgerSink>,
    ) -> Result<Self, ClientError> {
        let api = ApiClient::new(config.invoice_metadata())?;
        Ok(Self {
            orchestrator: Arc::new(InvoiceOrchestrator::new(api.clone(), config.clone())),
            validator: Arc::new(WebhookValidator::new(api.clone(), config.clone())),
            config,
            api,
            ledger,
        })
    }
}
