use super::outbound::{AUTHORIZATION, AuthorizationInjector, OutboundRequest};
use crate::application::slot::CredentialSlot;
use crate::domain::credentials::CredentialSet;
use crate::domain::order::OrderId;
use crate::domain::ports::{BackendConfiguration, PaymentBackend, Submission};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use http::Method;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A transaction as the simulated provider received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub order_id: OrderId,
    pub merchant_id: String,
    pub session_id: String,
    /// The `Authorization` header the registration request carried.
    pub authorization: Option<String>,
}

#[derive(Default)]
struct State {
    configured: Option<BackendConfiguration>,
    submissions: Vec<SubmittedTransaction>,
    confirmations: Vec<(OrderId, String)>,
}

/// In-process stand-in for the provider SDK.
///
/// Builds the registration request the real SDK would send and signs it through
/// an [`AuthorizationInjector`]. With [`SimulatedBackend::with_slot`] the header is
/// taken from the shared [`CredentialSlot`] instead of the call's parameters,
/// which is how a host-level request hook would sign it.
#[derive(Clone)]
pub struct SimulatedBackend {
    api_host: String,
    injector: AuthorizationInjector,
    slot: Option<Arc<CredentialSlot>>,
    latency: Duration,
    fail_submissions: Arc<AtomicBool>,
    next_session: Arc<AtomicU64>,
    state: Arc<Mutex<State>>,
}

impl SimulatedBackend {
    pub fn new(api_host: impl Into<String>) -> Self {
        let api_host = api_host.into();
        Self {
            injector: AuthorizationInjector::new(api_host.clone()),
            api_host,
            slot: None,
            latency: Duration::ZERO,
            fail_submissions: Arc::new(AtomicBool::new(false)),
            next_session: Arc::new(AtomicU64::new(1)),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Signs outbound requests from the slot rather than the explicit parameters.
    pub fn with_slot(mut self, slot: Arc<CredentialSlot>) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Delay between building a request and "sending" it.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<SubmittedTransaction> {
        self.state().submissions.clone()
    }

    pub fn confirmations(&self) -> Vec<(OrderId, String)> {
        self.state().confirmations.clone()
    }

    pub fn configured(&self) -> Option<BackendConfiguration> {
        self.state().configured.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("https://secure.{}{}", self.api_host, path);
        Url::parse(&raw).map_err(|err| RouterError::Internal(Box::new(err)))
    }

    async fn send(&self, request: &mut OutboundRequest, credentials: &CredentialSet) -> Result<()> {
        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }
        match &self.slot {
            Some(slot) => self.injector.apply_from_slot(request, slot)?,
            None => self.injector.apply(request, credentials)?,
        };
        debug!(method = %request.method, url = %request.url, "provider request");
        Ok(())
    }
}

#[async_trait]
impl PaymentBackend for SimulatedBackend {
    async fn configure(&self, configuration: &BackendConfiguration) -> Result<()> {
        if configuration.crc_key.is_empty() || configuration.api_key.is_empty() {
            return Err(RouterError::SdkInitialization(
                "missing CRC or API key".to_string(),
            ));
        }
        self.state().configured = Some(configuration.clone());
        Ok(())
    }

    async fn submit_transaction(
        &self,
        order_id: OrderId,
        credentials: &CredentialSet,
    ) -> Result<Submission> {
        let url = self.endpoint("/api/v1/transaction/register")?;
        let mut request = OutboundRequest::new(Method::POST, url);
        self.send(&mut request, credentials).await?;

        if self.fail_submissions.load(Ordering::SeqCst) {
            return Err(RouterError::TransactionSubmission(
                "provider rejected the registration".to_string(),
            ));
        }

        let sequence = self.next_session.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("{}-{:08x}", order_id, sequence);
        let redirect_url = self.endpoint(&format!("/trnRequest/{}", session_id))?;

        self.state().submissions.push(SubmittedTransaction {
            order_id,
            merchant_id: credentials.merchant_id().to_string(),
            session_id: session_id.clone(),
            authorization: request.header(AUTHORIZATION).map(str::to_string),
        });

        Ok(Submission {
            redirect_url: redirect_url.to_string(),
            session_id: Some(session_id),
        })
    }

    async fn confirm_callback(
        &self,
        order_id: OrderId,
        credentials: &CredentialSet,
        _payload: &[u8],
    ) -> Result<()> {
        let url = self.endpoint("/api/v1/transaction/verify")?;
        let mut request = OutboundRequest::new(Method::PUT, url);
        self.send(&mut request, credentials).await?;
        self.state()
            .confirmations
            .push((order_id, credentials.merchant_id().to_string()));
        Ok(())
    }
}
