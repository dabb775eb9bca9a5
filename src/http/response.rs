use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-success status into [`HttpError::Status`].
    pub fn into_result(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Message {
        message: String,
    }

    #[test]
    fn non_success_becomes_status_error() {
        let response = ApiResponse::new(StatusCode::UNAUTHORIZED, "expired");
        assert_eq!(
            response.into_result().unwrap_err(),
            HttpError::Status {
                status: 401,
                body: "expired".to_string()
            }
        );
    }

    #[test]
    fn json_decode_failure_is_tagged() {
        let response = ApiResponse::new(StatusCode::OK, "not json");
        let err = response.json::<Message>().err().unwrap();
        assert!(matches!(err, HttpError::Decode(_)));

        let ok = ApiResponse::new(StatusCode::OK, r#"{"message":"hi"}"#);
        assert_eq!(ok.json::<Message>().unwrap().message, "hi");
    }
}
