use super::router::CredentialRouter;
use super::slot::CredentialSlot;
use crate::domain::credentials::CredentialSet;
use crate::domain::order::{CredentialSource, META_SESSION_ID, OrderId};
use crate::domain::ports::{BackendConfiguration, PaymentBackendBox};
use crate::error::{Result, RouterError};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the customer is sent to complete a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    pub order_id: OrderId,
    pub redirect_url: String,
    pub merchant_id: String,
    pub source: CredentialSource,
}

/// The identifying parts of an asynchronous status notification.
///
/// `order_id` and `session_id` come from the query string, `body` is the raw request body.
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    pub order_id: Option<String>,
    pub session_id: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct CallbackBody {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// A callback matched to its order and the credentials it was paid with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackContext {
    pub order_id: OrderId,
    pub credentials: CredentialSet,
}

/// Payment initiation and callback handling around the [`CredentialRouter`].
///
/// Backend calls run inside a [`CredentialSlot`] section, so anything that signs
/// requests from the slot sees the credentials of the order being processed.
pub struct CheckoutService {
    router: CredentialRouter,
    backend: PaymentBackendBox,
    slot: Arc<CredentialSlot>,
}

impl CheckoutService {
    pub fn new(
        router: CredentialRouter,
        backend: PaymentBackendBox,
        slot: Arc<CredentialSlot>,
    ) -> Self {
        Self {
            router,
            backend,
            slot,
        }
    }

    pub fn router(&self) -> &CredentialRouter {
        &self.router
    }

    /// Resolves credentials for the order, registers the transaction and
    /// returns the provider's payment page.
    ///
    /// Once the provider has registered the transaction the redirect is returned
    /// even if the session ID cannot be saved; that failure is only logged.
    pub async fn process_payment(&self, order_id: OrderId) -> Result<PaymentRedirect> {
        let resolved = self.router.resolve_order(order_id).await?;

        let submission = {
            let active = self.slot.publish(resolved.credentials.clone()).await;
            self.initialize(active.credentials()).await?;
            self.backend
                .submit_transaction(order_id, active.credentials())
                .await
                .map_err(|err| {
                    error!(%order_id, "payment processing failed: {}", err);
                    match err {
                        RouterError::TransactionSubmission(_) => err,
                        other => RouterError::TransactionSubmission(other.to_string()),
                    }
                })?
        };

        if let Some(session_id) = &submission.session_id {
            if let Err(err) = self
                .router
                .order_store()
                .put_order_meta(order_id, META_SESSION_ID, session_id)
                .await
            {
                error!(%order_id, %session_id, "failed to save provider session: {}", err);
            }
        }

        info!(%order_id, redirect = %submission.redirect_url, "transaction registered");
        Ok(PaymentRedirect {
            order_id,
            redirect_url: submission.redirect_url,
            merchant_id: resolved.credentials.merchant_id().to_string(),
            source: resolved.source,
        })
    }

    async fn initialize(&self, credentials: &CredentialSet) -> Result<()> {
        let configuration = BackendConfiguration::try_from(credentials)?;
        debug!(?configuration, "configuring payment backend");
        self.backend
            .configure(&configuration)
            .await
            .map_err(|err| {
                error!("backend configuration failed: {}", err);
                match err {
                    RouterError::SdkInitialization(_) => err,
                    other => RouterError::SdkInitialization(other.to_string()),
                }
            })
    }

    /// Matches a callback to its order and reloads that order's credentials.
    pub async fn prepare_callback(&self, request: &CallbackRequest) -> Result<CallbackContext> {
        let order_id = match self.locate_order(request).await? {
            Some(order_id) => order_id,
            None => {
                warn!("callback does not identify an order");
                return Err(RouterError::NotFound("order for callback".to_string()));
            }
        };
        let resolved = self.router.reload(order_id).await?;
        Ok(CallbackContext {
            order_id,
            credentials: resolved.credentials,
        })
    }

    /// Runs the backend's status confirmation with the order's original credentials.
    pub async fn confirm_callback(&self, request: &CallbackRequest) -> Result<CallbackContext> {
        let context = self.prepare_callback(request).await?;
        let active = self.slot.publish(context.credentials.clone()).await;
        self.initialize(active.credentials()).await?;
        if let Err(err) = self
            .backend
            .confirm_callback(context.order_id, active.credentials(), &request.body)
            .await
        {
            error!(order_id = %context.order_id, "callback confirmation failed: {}", err);
            return Err(err);
        }
        drop(active);

        info!(order_id = %context.order_id, "callback confirmed");
        Ok(context)
    }

    async fn locate_order(&self, request: &CallbackRequest) -> Result<Option<OrderId>> {
        if let Some(raw) = &request.order_id {
            match raw.parse::<OrderId>() {
                Ok(order_id) => return Ok(Some(order_id)),
                Err(_) => warn!(order_id = %raw, "ignoring malformed order-id parameter"),
            }
        }

        if let Some(session_id) = &request.session_id {
            if let Ok(order_id) = session_id.parse::<OrderId>() {
                return Ok(Some(order_id));
            }
            return self.order_by_session(session_id).await;
        }

        if request.body.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<CallbackBody>(&request.body) {
            Ok(CallbackBody {
                session_id: Some(session_id),
            }) => self.order_by_session(&session_id).await,
            Ok(_) => Ok(None),
            Err(err) => {
                debug!("callback body is not JSON: {}", err);
                Ok(None)
            }
        }
    }

    async fn order_by_session(&self, session_id: &str) -> Result<Option<OrderId>> {
        self.router
            .order_store()
            .find_order_by_meta(META_SESSION_ID, session_id)
            .await
    }
}
