//! Read-only dashboard calls for the signed-in user
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::{normalize_page, normalize_record, Endpoints, Page};
use crate::error::PortalError;
use crate::gateway::{Gateway, RequestDescriptor};
use crate::types::{null_as_default, MemberLink};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, rename = "isRead", deserialize_with = "null_as_default")]
    pub is_read: bool,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "giverId")]
    pub giver_id: Option<MemberLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected: bool,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Dashboard {
    gateway: Gateway,
    endpoints: Arc<Endpoints>,
}

impl Dashboard {
    pub fn new(gateway: Gateway, endpoints: Arc<Endpoints>) -> Self {
        Self { gateway, endpoints }
    }

    async fn fetch(&self, target: String) -> Result<Value, PortalError> {
        Ok(self.gateway.send(&RequestDescriptor::get(target), None).await?)
    }

    /// Referral, TYFCB and meeting totals; shape varies by backend version
    pub async fn counts(&self) -> Result<Value, PortalError> {
        let user_id = self.gateway.current_user_id()?;
        let value = self.fetch(self.endpoints.user_data_counts(&user_id)).await?;
        Ok(normalize_record(value)?)
    }

    pub async fn next_event(&self) -> Result<Option<Value>, PortalError> {
        let value = self.fetch(self.endpoints.next_nearest_event()).await?;
        let empty = matches!(value.get("data"), None | Some(Value::Null)) && value.get("_id").is_none();
        if empty {
            return Ok(None);
        }
        Ok(Some(normalize_record(value)?))
    }

    pub async fn notifications(&self, page: u32, limit: u32) -> Result<Page<Notification>, PortalError> {
        let (page, limit) = (page.max(1), limit.max(1));
        let user_id = self.gateway.current_user_id()?;
        let value = self
            .fetch(self.endpoints.notifications(&user_id, page, limit))
            .await?;
        Ok(normalize_page(value, page, limit)?)
    }

    pub async fn profile_completion(&self) -> Result<Value, PortalError> {
        let user_id = self.gateway.current_user_id()?;
        let value = self.fetch(self.endpoints.profile_completion(&user_id)).await?;
        Ok(normalize_record(value)?)
    }

    pub async fn testimonials(&self, page: u32, limit: u32) -> Result<Page<Testimonial>, PortalError> {
        let (page, limit) = (page.max(1), limit.max(1));
        let user_id = self.gateway.current_user_id()?;
        let value = self
            .fetch(self.endpoints.testimonials(&user_id, page, limit))
            .await?;
        Ok(normalize_page(value, page, limit)?)
    }
}
