use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthTokenError;

/// Claims the portal reads out of the session token.
///
/// These are decoded without verifying the signature. They shape requests and
/// display only; the backend re-validates every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| at <= Utc::now())
    }
}

fn read_only_validation() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

pub fn decode_claims(token: &str) -> Result<Claims, AuthTokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthTokenError::Missing);
    }

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &read_only_validation())
        .map(|data| data.claims)
        .map_err(|e| AuthTokenError::Malformed(e.to_string()))
}

pub fn decode_user_id(token: &str) -> Result<String, AuthTokenError> {
    let claims = decode_claims(token)?;
    if claims.user_id.is_empty() {
        return Err(AuthTokenError::Malformed("empty userId claim".to_string()));
    }
    Ok(claims.user_id)
}
