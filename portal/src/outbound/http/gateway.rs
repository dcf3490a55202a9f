//! Reqwest-backed API gateway.
//!
//! This adapter owns transport details only: URL composition, credential
//! attachment, the request timeout, and mapping every failure into the
//! closed [`ApiError`] taxonomy. It reads the session store but never
//! writes it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, Url};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::dto::server_message;
use crate::domain::ports::{ApiGateway, HttpMethod, RequestOptions, SessionStore};
use crate::domain::{ApiError, Credential, Locale};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Gateway that performs HTTP requests against one backend base address.
pub struct HttpApiGateway {
    client: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    locale: Locale,
}

impl HttpApiGateway {
    /// Build a gateway whose every call is bounded by `timeout`.
    /// ```rust,ignore
    /// let gateway = HttpApiGateway::new(base_url, timeout, store, Locale::Vi);
    /// assert!(gateway.is_ok() || gateway.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        store: Arc<dyn SessionStore>,
        locale: Locale,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            store,
            locale,
        })
    }

    /// Configured base address.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn stored_credential(&self) -> Option<Credential> {
        match self.store.get() {
            Ok(snapshot) => snapshot.map(|stored| stored.token),
            Err(error) => {
                warn!(%error, "stored credential unreadable; sending request without it");
                None
            }
        }
    }
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = compose_url(&self.base_url, endpoint);
        let mut builder = self
            .client
            .request(to_reqwest_method(options.method), url.as_str())
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE);
        if let Some(credential) = self.stored_credential() {
            builder = builder.header(AUTHORIZATION, credential.bearer_header());
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| transport_error(endpoint, &error, self.locale))?;
        let status = response.status();
        let is_json = has_json_content_type(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|error| transport_error(endpoint, &error, self.locale))?;
        debug!(
            method = %options.method,
            endpoint,
            status = status.as_u16(),
            "backend responded"
        );

        if !status.is_success() {
            let error = classify_failure(status.as_u16(), &body, self.locale);
            warn!(
                endpoint,
                status = status.as_u16(),
                kind = %error.kind(),
                "backend call failed"
            );
            return Err(error);
        }
        decode_success(is_json, &body, self.locale)
    }

    fn locale(&self) -> Locale {
        self.locale
    }
}

/// Join the base address and an endpoint with exactly one slash between.
pub(super) fn compose_url(base: &Url, endpoint: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

pub(super) fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_MEDIA_TYPE))
}

fn transport_error(endpoint: &str, error: &reqwest::Error, locale: Locale) -> ApiError {
    warn!(
        endpoint,
        %error,
        timeout = error.is_timeout(),
        "backend unreachable"
    );
    ApiError::network_unreachable(locale)
}

/// Classify a non-success response, preferring the server's own message.
fn classify_failure(status: u16, body: &[u8], locale: Locale) -> ApiError {
    ApiError::from_status(status, server_message(body).as_deref(), locale)
}

/// Decode a 2xx body. Non-JSON and empty JSON bodies yield an empty object.
fn decode_success(is_json: bool, body: &[u8], locale: Locale) -> Result<Value, ApiError> {
    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|error| {
        warn!(%error, "success payload was not valid JSON");
        ApiError::unexpected_response(locale)
    })
}
