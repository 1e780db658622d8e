//! HTTP service interface
//!
//! The transport lives in the host application. The player core only
//! consumes this trait; every call returns immediately with a token that the
//! caller polls on its tick.

use crate::error::{CoreError, Result};
use crate::token::AsyncToken;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A completed HTTP exchange
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response carrying a JSON body
    pub fn json_ok<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::new(200, serde_json::to_vec(value)?))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turn a non-2xx response into an error
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CoreError::Http {
                status: self.status,
                message: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// Standard Trellis response envelope
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TrellisResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub body: Option<T>,
}

/// HTTP client used by the player core
///
/// URLs are absolute. Implementations must not complete tokens
/// synchronously on the caller's stack in a way that re-enters the caller;
/// the caller only observes completions when it polls.
pub trait HttpService: Send + Sync {
    fn get(&self, url: &str) -> AsyncToken<HttpResponse>;

    fn post(&self, url: &str, json: serde_json::Value) -> AsyncToken<HttpResponse>;

    fn put(&self, url: &str, json: serde_json::Value) -> AsyncToken<HttpResponse>;

    fn delete(&self, url: &str) -> AsyncToken<HttpResponse>;

    /// Multipart upload of a single file
    fn post_file(&self, url: &str, file_name: &str, bytes: Vec<u8>) -> AsyncToken<HttpResponse>;

    /// Raw download of a resource
    fn download(&self, url: &str) -> AsyncToken<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    struct Body {
        version: u32,
    }

    #[test]
    fn test_status_checks() {
        assert!(HttpResponse::new(204, Vec::new()).is_success());
        assert!(!HttpResponse::new(404, "missing").is_success());

        let err = HttpResponse::new(500, "boom").error_for_status().unwrap_err();
        match err {
            CoreError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_envelope_decode() {
        let response = HttpResponse::new(
            200,
            r#"{"success":true,"body":{"version":4}}"#,
        );
        let envelope: TrellisResponse<Body> = response.json().unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.error, None);
        assert_eq!(envelope.body, Some(Body { version: 4 }));

        let failed: TrellisResponse<Body> =
            HttpResponse::new(200, r#"{"success":false,"error":"Locked."}"#)
                .json()
                .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Locked."));
    }

    #[test]
    fn test_bad_json_is_error() {
        let result: Result<Body> = HttpResponse::new(200, "not json").json();
        assert!(matches!(result, Err(CoreError::Json(_))));
    }
}
