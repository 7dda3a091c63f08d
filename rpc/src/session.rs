//! Session authority backed by the dashboard's session route.
//!
//! The caller's `Cookie` and `Authorization` headers are replayed against the
//! configured endpoint. The route answers `{}` when there is no session and
//! `{"user": {...}, "expires": "<rfc3339>"}` when there is one.

use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::Client;

use proshow_verification::{Session, SessionAuthority, SessionCredentials, SessionError};

use crate::{RpcError, SessionConfig};

#[derive(Clone)]
pub struct HttpSessionAuthority {
    client: Client,
    endpoint: String,
}

impl HttpSessionAuthority {
    pub fn new(config: &SessionConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RpcError::Config(format!("session client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// `None` for an empty object, a missing `user`, or `"user": null`.
fn parse_session(body: serde_json::Value) -> Result<Option<Session>, SessionError> {
    match body.get("user") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(_) => serde_json::from_value(body)
            .map(Some)
            .map_err(|e| SessionError::Malformed(e.to_string())),
    }
}

impl SessionAuthority for HttpSessionAuthority {
    async fn resolve(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<Option<Session>, SessionError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(cookie) = &credentials.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(authorization) = &credentials.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Unavailable(format!(
                "session endpoint answered {status}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        parse_session(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_no_session() {
        assert!(parse_session(json!({})).unwrap().is_none());
        assert!(parse_session(json!({ "user": null })).unwrap().is_none());
    }

    #[test]
    fn user_with_expiry_is_a_session() {
        let session = parse_session(json!({
            "user": { "email": "organizer@advitya.in", "name": "Org" },
            "expires": "2030-01-01T00:00:00.000Z"
        }))
        .unwrap()
        .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("organizer@advitya.in"));
        assert!(session.expires.is_some());
    }

    #[test]
    fn garbage_expiry_is_malformed() {
        let err = parse_session(json!({ "user": {}, "expires": "soon" })).unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
    }
}
