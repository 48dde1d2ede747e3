//! Authenticated request gateway.
//!
//! Every backend call goes through [`Gateway::send`]. The gateway attaches the
//! bearer token when the session has one, and turns transport failures, non-2xx
//! statuses and `success: false` bodies into a [`RequestError`]. It never shows
//! anything to the user; callers route failures to a notifier.

mod transport;

pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};

use serde_json::Value;
use std::sync::Arc;

use crate::error::{AuthTokenError, RequestError};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub target: String,
    pub method: Method,
}

impl RequestDescriptor {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::Put, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }
}

#[derive(Clone)]
pub struct Gateway {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(session: Arc<Session>, transport: Arc<dyn Transport>) -> Self {
        Self { session, transport }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Acting user id, read from the token claims
    pub fn current_user_id(&self) -> Result<String, AuthTokenError> {
        self.session.user_id()
    }

    pub async fn send(
        &self,
        descriptor: &RequestDescriptor,
        body: Option<Value>,
    ) -> Result<Value, RequestError> {
        let token = self.session.token();
        let authenticated = token.is_some();

        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        if authenticated || body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        tracing::debug!(
            method = %descriptor.method,
            target = %descriptor.target,
            authenticated,
            "sending request"
        );

        let request = HttpRequest {
            target: descriptor.target.clone(),
            method: descriptor.method,
            headers,
            body,
        };

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(RequestError::transport)?;

        let parsed = parse_body(&response)?;

        if !(200..300).contains(&response.status) {
            let err = RequestError::http(response.status, server_message(&parsed));
            tracing::warn!(
                method = %descriptor.method,
                target = %descriptor.target,
                status = response.status,
                "request failed: {}",
                err
            );
            return Err(err);
        }

        if parsed.get("success").and_then(Value::as_bool) == Some(false) {
            let message = server_message(&parsed)
                .unwrap_or_else(|| "Request was not successful".to_string());
            tracing::warn!(target = %descriptor.target, "server rejected request: {}", message);
            return Err(RequestError {
                status: Some(response.status),
                message,
            });
        }

        Ok(parsed)
    }
}

fn parse_body(response: &HttpResponse) -> Result<Value, RequestError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(value),
        // Error pages are often HTML; the status still decides the outcome
        Err(_) if !(200..300).contains(&response.status) => Ok(Value::Null),
        Err(e) => Err(RequestError::malformed(Some(response.status), e)),
    }
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
