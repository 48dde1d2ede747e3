//! Mobile number + OTP sign-in.
//!
//! `verify_otp` and `refresh_session` are the only places a token enters the
//! [`Session`]; `logout` is the only place one leaves it.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::Endpoints;
use crate::error::{PortalError, RequestError, ValidationError};
use crate::gateway::{Gateway, RequestDescriptor};
use crate::session::Session;
use crate::validation;

#[derive(Clone)]
pub struct Accounts {
    gateway: Gateway,
    endpoints: Arc<Endpoints>,
}

impl Accounts {
    pub fn new(gateway: Gateway, endpoints: Arc<Endpoints>) -> Self {
        Self { gateway, endpoints }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.gateway.session()
    }

    /// Asks the backend to send an OTP to `mobile_number`
    pub async fn login(&self, mobile_number: &str) -> Result<Value, PortalError> {
        check_mobile(mobile_number)?;
        let value = self
            .gateway
            .send(
                &RequestDescriptor::post(self.endpoints.login()),
                Some(json!({ "mobile_number": mobile_number })),
            )
            .await?;
        Ok(value)
    }

    pub async fn resend_otp(&self, mobile_number: &str) -> Result<Value, PortalError> {
        check_mobile(mobile_number)?;
        let value = self
            .gateway
            .send(
                &RequestDescriptor::post(self.endpoints.resend_otp()),
                Some(json!({ "mobile_number": mobile_number })),
            )
            .await?;
        Ok(value)
    }

    /// Verifies the OTP and stores the returned token; returns the user id
    pub async fn verify_otp(&self, mobile_number: &str, otp: &str) -> Result<String, PortalError> {
        let mut errors = ValidationError::new();
        validation::mobile_number(&mut errors, "mobile_number", mobile_number);
        validation::otp(&mut errors, "otp", otp);
        errors.into_result()?;

        let value = self
            .gateway
            .send(
                &RequestDescriptor::post(self.endpoints.verify_mobile()),
                Some(json!({ "mobile_number": mobile_number, "otp": otp })),
            )
            .await?;

        let user_id = self.store_token(&value)?;
        tracing::info!(user_id = %user_id, "signed in");
        Ok(user_id)
    }

    /// Trades the current token for a fresh one; nothing is sent when signed out
    pub async fn refresh_session(&self) -> Result<String, PortalError> {
        self.gateway.current_user_id()?;
        let value = self
            .gateway
            .send(&RequestDescriptor::post(self.endpoints.refresh_token()), None)
            .await?;

        let user_id = self.store_token(&value)?;
        tracing::info!(user_id = %user_id, "session refreshed");
        Ok(user_id)
    }

    fn store_token(&self, value: &Value) -> Result<String, PortalError> {
        let token = extract_token(value)
            .ok_or_else(|| RequestError::malformed(None, "auth response carried no token"))?;

        // Reject tokens we could not act on before persisting them
        let user_id = crate::auth::decode_user_id(&token)?;
        self.session().set_token(token).map_err(|e| RequestError {
            status: None,
            message: format!("Unable to save the session: {}", e),
        })?;
        Ok(user_id)
    }

    /// Calls the logout endpoint when signed in; the session is cleared either way
    pub async fn logout(&self) -> Result<(), PortalError> {
        if self.session().is_authenticated() {
            if let Err(e) = self
                .gateway
                .send(&RequestDescriptor::post(self.endpoints.logout()), None)
                .await
            {
                tracing::warn!("logout request failed: {}", e);
            }
        }

        // memory is cleared even when the store is not
        if let Err(e) = self.session().clear() {
            tracing::warn!("failed to remove persisted session: {}", e);
        }
        tracing::info!("signed out");
        Ok(())
    }
}

fn check_mobile(mobile_number: &str) -> Result<(), ValidationError> {
    let mut errors = ValidationError::new();
    validation::mobile_number(&mut errors, "mobile_number", mobile_number);
    errors.into_result()
}

/// Token sits at `data.token` or at the top level
fn extract_token(value: &Value) -> Option<String> {
    value
        .get("data")
        .and_then(|d| d.get("token"))
        .or_else(|| value.get("token"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
