use crate::application::slot::CredentialSlot;
use crate::domain::credentials::CredentialSet;
use crate::error::{Result, RouterError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::Method;
use http::header::{AsHeaderName, HeaderMap, HeaderValue};
use tracing::warn;
use url::Url;

pub use http::header::AUTHORIZATION;

/// An HTTP request about to leave the process.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// `Basic base64(merchant_id:api_key)`, the provider's REST authentication.
pub fn basic_authorization(credentials: &CredentialSet) -> String {
    let token = STANDARD.encode(format!(
        "{}:{}",
        credentials.merchant_id(),
        credentials.api_key()
    ));
    format!("Basic {}", token)
}

fn authorization_value(credentials: &CredentialSet) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&basic_authorization(credentials))
        .map_err(|err| RouterError::Internal(Box::new(err)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Adds provider authentication to requests aimed at the provider's API.
///
/// A request is targeted when its host is `api_host` or one of its subdomains
/// and its path is under `/api`. Everything else passes through untouched.
#[derive(Debug, Clone)]
pub struct AuthorizationInjector {
    api_host: String,
}

impl AuthorizationInjector {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn targets(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host_matches = host == self.api_host
            || host
                .strip_suffix(self.api_host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));
        host_matches && (url.path() == "/api" || url.path().starts_with("/api/"))
    }

    /// Sets the `Authorization` header from explicit credentials.
    ///
    /// Replaces any `Authorization` header already present. Returns whether the
    /// header was written.
    pub fn apply(
        &self,
        request: &mut OutboundRequest,
        credentials: &CredentialSet,
    ) -> Result<bool> {
        if !self.targets(&request.url) {
            return Ok(false);
        }
        request
            .headers
            .insert(AUTHORIZATION, authorization_value(credentials)?);
        Ok(true)
    }

    /// Sets the `Authorization` header from whatever the slot currently publishes.
    pub fn apply_from_slot(
        &self,
        request: &mut OutboundRequest,
        slot: &CredentialSlot,
    ) -> Result<bool> {
        if !self.targets(&request.url) {
            return Ok(false);
        }
        match slot.current() {
            Some(credentials) => self.apply(request, &credentials),
            None => {
                warn!(url = %request.url, "no active credentials for provider request");
                Ok(false)
            }
        }
    }
}
