use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{normalize_page, Endpoints, Page};
use crate::controller::PagedSource;
use crate::error::PortalError;
use crate::gateway::{Gateway, RequestDescriptor};
use crate::types::null_as_default;

/// Directory member, used to pick a receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mobile_number: String,
    #[serde(default, rename = "profilePic", deserialize_with = "null_as_default")]
    pub profile_pic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapter_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
}

/// Same chapter or cross-chapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberScope {
    #[default]
    Inside,
    Outside,
}

impl std::fmt::Display for MemberScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MemberScope::Inside => "inside",
            MemberScope::Outside => "outside",
        })
    }
}

#[derive(Debug, Clone)]
pub struct MemberLists {
    pub inside: Page<Member>,
    pub outside: Page<Member>,
}

#[derive(Clone)]
pub struct MemberDirectory {
    gateway: Gateway,
    endpoints: Arc<Endpoints>,
}

impl MemberDirectory {
    pub fn new(gateway: Gateway, endpoints: Arc<Endpoints>) -> Self {
        Self { gateway, endpoints }
    }

    pub async fn list(
        &self,
        scope: MemberScope,
        page: u32,
        limit: u32,
    ) -> Result<Page<Member>, PortalError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let target = match scope {
            MemberScope::Inside => self.endpoints.inside_users(page, limit),
            MemberScope::Outside => self.endpoints.outside_users(page, limit),
        };

        let value = self.gateway.send(&RequestDescriptor::get(target), None).await?;
        Ok(normalize_page(value, page, limit)?)
    }

    /// Both directories fetched concurrently
    pub async fn all(&self, page: u32, limit: u32) -> Result<MemberLists, PortalError> {
        let (inside, outside) = futures::try_join!(
            self.list(MemberScope::Inside, page, limit),
            self.list(MemberScope::Outside, page, limit)
        )?;
        Ok(MemberLists { inside, outside })
    }
}

#[async_trait]
impl PagedSource for MemberDirectory {
    type Item = Member;
    type Scope = MemberScope;

    fn label(&self) -> &str {
        "users"
    }

    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        scope: MemberScope,
    ) -> Result<Page<Member>, PortalError> {
        self.list(scope, page, page_size).await
    }
}
