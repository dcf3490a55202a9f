//! Driven port for the single HTTP entry point to the grading backend.
//!
//! Adapters own transport details (URL composition, credential attachment,
//! timeouts) and must classify every failure into an [`ApiError`]. The
//! gateway never touches session state; callers react to
//! [`ApiErrorKind::SessionExpired`](crate::domain::ApiErrorKind) themselves.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ApiError, Locale};

/// HTTP verbs used against the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised method token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method '{token}'")]
pub struct UnsupportedMethodError {
    /// The rejected token.
    pub token: String,
}

impl std::str::FromStr for HttpMethod {
    type Err = UnsupportedMethodError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        [
            Self::Get,
            Self::Post,
            Self::Put,
            Self::Patch,
            Self::Delete,
        ]
        .into_iter()
        .find(|method| method.as_str().eq_ignore_ascii_case(token.trim()))
        .ok_or_else(|| UnsupportedMethodError {
            token: token.to_owned(),
        })
    }
}

/// Per-call request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Verb; defaults to `GET`.
    pub method: HttpMethod,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl RequestOptions {
    /// Options for a body-less call.
    pub fn new(method: HttpMethod) -> Self {
        Self { method, body: None }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Port for issuing requests against the configured backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Issue one request. On success the decoded JSON body is returned, or
    /// an empty object when the response is not JSON.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use portal::domain::ports::{ApiGateway, HttpMethod, RequestOptions};
    ///
    /// let body = gateway
    ///     .request("/api/student/courses", RequestOptions::new(HttpMethod::Get))
    ///     .await?;
    /// assert!(body.is_array() || body.is_object());
    /// # Ok::<(), portal::domain::ApiError>(())
    /// ```
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError>;

    /// Locale used for canned messages.
    fn locale(&self) -> Locale;
}

/// Typed verb helpers layered over [`ApiGateway::request`].
#[async_trait]
pub trait ApiGatewayExt: ApiGateway {
    /// `GET` and decode.
    async fn get<T>(&self, endpoint: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let value = self
            .request(endpoint, RequestOptions::new(HttpMethod::Get))
            .await?;
        decode(value, self.locale())
    }

    /// `POST` an optional body and decode.
    async fn post<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        self.send_with_body(HttpMethod::Post, endpoint, body).await
    }

    /// `PUT` an optional body and decode.
    async fn put<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        self.send_with_body(HttpMethod::Put, endpoint, body).await
    }

    /// `PATCH` an optional body and decode.
    async fn patch<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        self.send_with_body(HttpMethod::Patch, endpoint, body).await
    }

    /// `DELETE` and decode.
    async fn delete<T>(&self, endpoint: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let value = self
            .request(endpoint, RequestOptions::new(HttpMethod::Delete))
            .await?;
        decode(value, self.locale())
    }

    /// Shared body-carrying path for `post`, `put`, and `patch`.
    async fn send_with_body<B, T>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let mut options = RequestOptions::new(method);
        if let Some(body) = body {
            let encoded = serde_json::to_value(body).map_err(|error| {
                tracing::warn!(%error, endpoint, "request body could not be encoded");
                ApiError::fallback(crate::domain::ApiErrorKind::InvalidInput, self.locale())
            })?;
            options = options.with_body(encoded);
        }
        let value = self.request(endpoint, options).await?;
        decode(value, self.locale())
    }
}

impl<G: ApiGateway + ?Sized> ApiGatewayExt for G {}

fn decode<T: DeserializeOwned>(value: Value, locale: Locale) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|error| {
        tracing::warn!(%error, "response payload did not match the expected shape");
        ApiError::unexpected_response(locale)
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the typed helpers.
    use super::*;
    use crate::domain::ApiErrorKind;
    use mockall::predicate::eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ack {
        message: String,
    }

    #[tokio::test]
    async fn post_serialises_body_and_decodes_result() {
        let mut gateway = MockApiGateway::new();
        gateway.expect_locale().return_const(Locale::En);
        gateway
            .expect_request()
            .with(
                eq("/api/admin/users"),
                eq(RequestOptions::new(HttpMethod::Post)
                    .with_body(serde_json::json!({ "username": "new" }))),
            )
            .times(1)
            .returning(|_, _| Ok(serde_json::json!({ "message": "created" })));

        let ack: Ack = gateway
            .post("/api/admin/users", Some(&serde_json::json!({ "username": "new" })))
            .await
            .expect("request succeeds");
        assert_eq!(ack.message, "created");
    }

    #[tokio::test]
    async fn shape_mismatch_is_a_server_fault() {
        let mut gateway = MockApiGateway::new();
        gateway.expect_locale().return_const(Locale::En);
        gateway
            .expect_request()
            .returning(|_, _| Ok(serde_json::json!({})));

        let err = gateway
            .get::<Ack>("/api/dashboard")
            .await
            .expect_err("missing field");
        assert_eq!(err.kind(), ApiErrorKind::ServerFault);
        assert_eq!(err.message(), Locale::En.unexpected_response());
    }

    #[test]
    fn parses_method_tokens() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
