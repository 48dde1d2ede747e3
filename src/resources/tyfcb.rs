use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::Endpoints;
use crate::error::ValidationError;
use crate::gateway::RequestDescriptor;
use crate::resource::{with_field, Draft, Resource};
use crate::types::{links_to, null_as_default, Directed, Direction, MemberLink};
use crate::validation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TyfcbReferralType {
    #[default]
    Inside,
    Outside,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessType {
    #[default]
    New,
    Repeat,
}

/// Thank-you-for-closed-business slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyfcbSlip {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "giverId")]
    pub giver_id: Option<MemberLink>,
    #[serde(default, rename = "receiverId")]
    pub receiver_id: Option<MemberLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub referral_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TyfcbSlip {
    pub fn receiver_name(&self) -> &str {
        self.receiver_id
            .as_ref()
            .and_then(MemberLink::name)
            .unwrap_or("Unknown")
    }
}

impl Directed for TyfcbSlip {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyfcbDraft {
    #[serde(rename = "receiverId")]
    pub receiver_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub referral_type: TyfcbReferralType,
    pub business_type: BusinessType,
    pub comments: String,
}

impl Default for TyfcbDraft {
    fn default() -> Self {
        Self {
            receiver_id: String::new(),
            amount: Decimal::ZERO,
            currency: "INR".to_string(),
            referral_type: TyfcbReferralType::Inside,
            business_type: BusinessType::New,
            comments: String::new(),
        }
    }
}

impl Draft for TyfcbDraft {
    const FIELDS: &'static [&'static str] = &[
        "receiverId",
        "amount",
        "currency",
        "referral_type",
        "business_type",
        "comments",
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validation::required(&mut errors, "receiverId", &self.receiver_id);
        validation::at_least(&mut errors, "amount", self.amount, Decimal::ZERO);
        validation::required(&mut errors, "currency", &self.currency);
        errors.into_result()
    }
}

pub struct TyfcbSlips;

impl Resource for TyfcbSlips {
    type Record = TyfcbSlip;
    type Draft = TyfcbDraft;

    const NOUN: &'static str = "TYFCB slip";
    const PLURAL: &'static str = "TYFCB slips";

    fn list_request(
        endpoints: &Endpoints,
        user_id: &str,
        direction: Direction,
        page: u32,
        page_size: u32,
    ) -> RequestDescriptor {
        let segment = match direction {
            Direction::Given => "getTyfcbsByGiverId",
            Direction::Received => "getTyfcbsByReceiverId",
        };
        RequestDescriptor::get(endpoints.paged(&[segment, user_id], page, page_size))
    }

    fn get_request(endpoints: &Endpoints, id: &str) -> Option<(RequestDescriptor, Option<Value>)> {
        Some((RequestDescriptor::get(endpoints.url(&["getTyfcbById", id], &[])), None))
    }

    fn create_request(endpoints: &Endpoints) -> RequestDescriptor {
        RequestDescriptor::post(endpoints.url(&["createTyfcb"], &[]))
    }

    fn create_body(draft: &TyfcbDraft, user_id: &str) -> Value {
        with_field(draft.to_body(), "giverId", user_id)
    }
}
