// Portal client error types
use std::collections::BTreeMap;
use thiserror::Error;

/// Identity could not be derived from the session token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthTokenError {
    #[error("No authentication token found")]
    Missing,

    #[error("Invalid authentication token")]
    Malformed(String),
}

/// Transport failure or non-2xx response from the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    /// Server-supplied message when present, otherwise a generic description
    pub message: String,
}

impl RequestError {
    pub fn http(status: u16, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        Self { status: Some(status), message }
    }

    pub fn transport(detail: impl std::fmt::Display) -> Self {
        tracing::warn!("transport failure: {}", detail);
        Self {
            status: None,
            message: "Unable to reach the server".to_string(),
        }
    }

    pub fn malformed(status: Option<u16>, detail: impl std::fmt::Display) -> Self {
        tracing::warn!("malformed response body: {}", detail);
        Self {
            status,
            message: "Received a malformed response from the server".to_string(),
        }
    }
}

/// Local form validation failure; never reaches the network
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Please fill all required fields correctly")]
pub struct ValidationError {
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// `Ok(())` when no field failed
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error(transparent)]
    AuthToken(#[from] AuthTokenError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend exposes no endpoint for this operation; nothing was sent
    #[error("{0} is not available")]
    Unsupported(String),
}

impl PortalError {
    /// Text shown to the user in a notice
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortalError::Request(e) => e.status,
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PortalError::AuthToken(AuthTokenError::Missing) => "AUTH_TOKEN_MISSING",
            PortalError::AuthToken(AuthTokenError::Malformed(_)) => "AUTH_TOKEN_MALFORMED",
            PortalError::Request(e) if e.status.is_none() => "TRANSPORT_ERROR",
            PortalError::Request(_) => "REQUEST_ERROR",
            PortalError::Validation(_) => "VALIDATION_ERROR",
            PortalError::Unsupported(_) => "UNSUPPORTED_OPERATION",
        }
    }
}
