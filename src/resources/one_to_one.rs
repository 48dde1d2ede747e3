use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Endpoints;
use crate::error::ValidationError;
use crate::gateway::RequestDescriptor;
use crate::resource::{with_field, Draft, Resource};
use crate::types::{links_to, null_as_default, Directed, Direction, MemberLink};
use crate::validation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneToOneMeeting {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "memberId1")]
    pub member_id1: Option<MemberLink>,
    #[serde(default, rename = "memberId2")]
    pub member_id2: Option<MemberLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meet_place: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photo: String,
    #[serde(default, rename = "initiatedBy")]
    pub initiated_by: Option<MemberLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl OneToOneMeeting {
    /// The member on the other side of the meeting from `user_id`
    pub fn counterpart(&self, user_id: &str) -> Option<&MemberLink> {
        if links_to(self.member_id1.as_ref(), user_id) {
            self.member_id2.as_ref()
        } else {
            self.member_id1.as_ref()
        }
    }
}

impl Directed for OneToOneMeeting {
    /// Given when the user initiated it, received when they only attended
    fn direction_for(&self, user_id: &str) -> Option<Direction> {
        if links_to(self.initiated_by.as_ref(), user_id) {
            Some(Direction::Given)
        } else if links_to(self.member_id1.as_ref(), user_id) || links_to(self.member_id2.as_ref(), user_id) {
            Some(Direction::Received)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneToOneDraft {
    /// Left empty to mean the current user
    #[serde(rename = "memberId1", skip_serializing_if = "String::is_empty")]
    pub member_id1: String,
    #[serde(rename = "memberId2")]
    pub member_id2: String,
    pub meet_place: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub photo: String,
    pub date: String,
    pub topics: String,
}

impl Draft for OneToOneDraft {
    const FIELDS: &'static [&'static str] =
        &["memberId1", "memberId2", "meet_place", "photo", "date", "topics"];

    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        validation::required(&mut errors, "memberId2", &self.member_id2);
        validation::required(&mut errors, "meet_place", &self.meet_place);
        validation::required(&mut errors, "date", &self.date);
        if !self.member_id1.is_empty() && self.member_id1 == self.member_id2 {
            errors.add("memberId2", "Pick a different member");
        }
        errors.into_result()
    }
}

pub struct OneToOnes;

impl Resource for OneToOnes {
    type Record = OneToOneMeeting;
    type Draft = OneToOneDraft;

    const NOUN: &'static str = "One-to-one meeting";
    const PLURAL: &'static str = "one-to-one meetings";

    /// Given lists meetings the user initiated, received lists the rest
    fn list_request(
        endpoints: &Endpoints,
        user_id: &str,
        direction: Direction,
        page: u32,
        page_size: u32,
    ) -> RequestDescriptor {
        let segment = match direction {
            Direction::Given => "getInitiatedOneToOne",
            Direction::Received => "getNotInitiatedOneToOne",
        };
        RequestDescriptor::get(endpoints.paged(&[segment, user_id], page, page_size))
    }

    fn get_request(endpoints: &Endpoints, id: &str) -> Option<(RequestDescriptor, Option<Value>)> {
        Some((
            RequestDescriptor::post(endpoints.url(&["getOneToOneById"], &[])),
            Some(json!({ "oneToOneId": id })),
        ))
    }

    fn create_request(endpoints: &Endpoints) -> RequestDescriptor {
        RequestDescriptor::post(endpoints.url(&["createOneToOne"], &[]))
    }

    fn create_body(draft: &OneToOneDraft, user_id: &str) -> Value {
        let body = with_field(draft.to_body(), "initiatedBy", user_id);
        if draft.member_id1.is_empty() {
            with_field(body, "memberId1", user_id)
        } else {
            body
        }
    }
}
