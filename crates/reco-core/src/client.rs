//! HTTP client for the recommendation backend.
//!
//! One operation: [`RecommendClient::recommend`] issues a single
//! `POST {base}/recomendar` with a JSON body `{"producto": <query>}` and
//! decodes the response into a list of [`Recommendation`].
//!
//! The error taxonomy is deliberately flat: transport failure, non-2xx
//! status, and decode failure all become a [`RequestError`] that renders as
//! one static user-facing message. The mechanical cause is preserved for the
//! debug log only.

use crate::types::{Recommendation, RecommendRequest};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tracing::debug;

pub use hyper::StatusCode;

/// The one message shown to the user for any failed request.
pub const USER_ERROR_MESSAGE: &str = "Ocurrió un error al obtener recomendaciones.";

/// Failure while talking to the recommendation backend.
///
/// Variants exist so the debug log can tell a refused connection from a 500
/// from a garbled body; the UI must not distinguish them — it shows
/// [`RequestError::user_message`] in every case.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to build request: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("backend returned status {0}")]
    Status(StatusCode),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RequestError {
    /// The static, undifferentiated message presented to the user.
    pub fn user_message(&self) -> &'static str {
        USER_ERROR_MESSAGE
    }
}

/// Client for the recommendation backend.
///
/// Cheap to clone-by-Arc and safe to share: the underlying hyper client
/// manages its own connection pool.
pub struct RecommendClient {
    http: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
}

impl RecommendClient {
    /// Create a client against a fixed base URL, e.g.
    /// `http://localhost:8080/api`. A trailing slash is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            base_url,
        }
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one query and return the backend's ranked list.
    ///
    /// Exactly one POST per call. Resolves only for a 2xx status with a JSON
    /// array body; anything else — connection failure, other status codes, a
    /// body that is not a list of `{entidad, score}` — is a [`RequestError`].
    pub async fn recommend(&self, producto: &str) -> Result<Vec<Recommendation>, RequestError> {
        let body = serde_json::to_vec(&RecommendRequest {
            producto: producto.to_string(),
        })?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/recomendar", self.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))?;

        debug!(producto, base_url = %self.base_url, "submitting recommendation request");

        let response = self.http.request(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }

        let bytes = response.into_body().collect().await?.to_bytes();
        let recommendations: Vec<Recommendation> = serde_json::from_slice(&bytes)?;

        debug!(count = recommendations.len(), "recommendation response decoded");
        Ok(recommendations)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RecommendClient::new("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn every_error_variant_shows_the_same_user_message() {
        let errors = [
            RequestError::Status(StatusCode::INTERNAL_SERVER_ERROR),
            RequestError::Status(StatusCode::NOT_FOUND),
            RequestError::Decode(serde_json::from_str::<Vec<i32>>("not json").unwrap_err()),
        ];
        for err in &errors {
            assert_eq!(err.user_message(), USER_ERROR_MESSAGE);
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_request_error() {
        // Port 1 is never listening; the request must fail as Transport, not panic.
        let client = RecommendClient::new("http://127.0.0.1:1/api");
        let err = client.recommend("computadora").await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
        assert_eq!(err.user_message(), USER_ERROR_MESSAGE);
    }
}
