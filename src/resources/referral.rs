use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{normalize_record, Endpoints};
use crate::error::{PortalError, ValidationError};
use crate::gateway::RequestDescriptor;
use crate::resource::{with_field, Draft, Resource, ResourceClient};
use crate::types::{links_to, null_as_default, Directed, Direction, MemberLink};
use crate::validation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralType {
    #[default]
    Inside,
    Outside,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub told_them_you_would_will: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub given_card: bool,
}

/// Blank optional fields arrive as `null`; refs to deleted members too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub giver_id: Option<MemberLink>,
    #[serde(default)]
    pub receiver_id: Option<MemberLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub referral_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub referral_status: ReferralStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub referral: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mobile_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: u8,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Directed for Referral {
    fn direction_for(&self, user_id: &str) -> Option<Direction> {
        if links_to(self.giver_id.as_ref(), user_id) {
            Some(Direction::Given)
        } else if links_to(self.receiver_id.as_ref(), user_id) {
            Some(Direction::Received)
        } else {
            None
        }
    }
}

/// Connection slip form; `giver_id` is filled from the session on create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralDraft {
    pub receiver_id: String,
    pub referral_type: ReferralType,
    pub referral_status: ReferralStatus,
    pub referral: String,
    pub mobile_number: String,
    pub address: String,
    pub comments: String,
    pub business_name: String,
    pub rating: u8,
}

impl Default for ReferralDraft {
    fn default() -> Self {
        Self {
            receiver_id: String::new(),
            referral_type: ReferralType::Inside,
            referral_status: ReferralStatus::default(),
            referral: String::new(),
            mobile_number: String::new(),
            address: String::new(),
            comments: String::new(),
            business_name: String::new(),
            rating: 1,
        }
    }
}

impl Draft for ReferralDraft {
    const FIELDS: &'static [&'static str] = &[
        "receiver_id",
        "referral_type",
        "referral_status",
        "referral",
        "mobile_number",
        "address",
        "comments",
        "business_name",
        "rating",
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validation::required(&mut errors, "receiver_id", &self.receiver_id);
        validation::mobile_number(&mut errors, "mobile_number", &self.mobile_number);
        validation::range(&mut errors, "rating", self.rating, 1, 5);
        errors.into_result()
    }
}

pub struct Referrals;

impl Resource for Referrals {
    type Record = Referral;
    type Draft = ReferralDraft;

    const NOUN: &'static str = "Referral";
    const PLURAL: &'static str = "referrals";

    fn list_request(
        endpoints: &Endpoints,
        user_id: &str,
        direction: Direction,
        page: u32,
        page_size: u32,
    ) -> RequestDescriptor {
        let segment = match direction {
            Direction::Given => "get-given-referral",
            Direction::Received => "get-received-referral",
        };
        RequestDescriptor::get(endpoints.paged(&[segment, user_id], page, page_size))
    }

    fn create_request(endpoints: &Endpoints) -> RequestDescriptor {
        RequestDescriptor::post(endpoints.url(&["create-referral"], &[]))
    }

    fn update_request(endpoints: &Endpoints, id: &str) -> Option<RequestDescriptor> {
        Some(RequestDescriptor::put(endpoints.url(&["update-referral", id], &[])))
    }

    fn delete_request(endpoints: &Endpoints, id: &str) -> Option<RequestDescriptor> {
        Some(RequestDescriptor::delete(endpoints.url(&["delete-referral", id], &[])))
    }

    fn create_body(draft: &ReferralDraft, user_id: &str) -> Value {
        with_field(draft.to_body(), "giver_id", user_id)
    }
}

impl ResourceClient<Referrals> {
    /// Given/received counters for the current user
    pub async fn stats(&self) -> Result<Value, PortalError> {
        let user_id = self.gateway().current_user_id()?;
        let target = self.endpoints().url(&["referral-stats", &user_id], &[]);
        let value = self.gateway().send(&RequestDescriptor::get(target), None).await?;
        Ok(normalize_record(value)?)
    }
}
