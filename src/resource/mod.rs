//! Generic resource client.
//!
//! Each domain (referrals, TYFCB slips, one-to-one meetings) implements
//! [`Resource`] to describe its endpoint shapes. [`ResourceClient`] turns those
//! shapes into gateway calls and normalizes the responses.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::api::{normalize_page, normalize_record, saved_record, Endpoints, Page};
use crate::controller::PagedSource;
use crate::error::{PortalError, ValidationError};
use crate::gateway::{Gateway, RequestDescriptor};
use crate::types::Direction;

/// Unsaved form state for a resource
pub trait Draft: Serialize + Clone + Default + Debug + Send + Sync + 'static {
    /// Every field name, used to mark the whole form touched
    const FIELDS: &'static [&'static str];

    fn validate(&self) -> Result<(), ValidationError>;

    fn to_body(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    type Draft: Draft;

    /// Singular noun for notices, e.g. "Referral"
    const NOUN: &'static str;
    /// Plural noun for notices, e.g. "referrals"
    const PLURAL: &'static str;

    fn list_request(
        endpoints: &Endpoints,
        user_id: &str,
        direction: Direction,
        page: u32,
        page_size: u32,
    ) -> RequestDescriptor;

    /// Descriptor plus optional body; some lookups are POSTs.
    /// `None` when the backend has no lookup endpoint.
    fn get_request(_endpoints: &Endpoints, _id: &str) -> Option<(RequestDescriptor, Option<Value>)> {
        None
    }

    fn create_request(endpoints: &Endpoints) -> RequestDescriptor;

    fn update_request(_endpoints: &Endpoints, _id: &str) -> Option<RequestDescriptor> {
        None
    }

    fn delete_request(_endpoints: &Endpoints, _id: &str) -> Option<RequestDescriptor> {
        None
    }

    /// Create payload; `user_id` fills the giver/initiator field
    fn create_body(draft: &Self::Draft, user_id: &str) -> Value;
}

fn unsupported<R: Resource>(operation: &str) -> PortalError {
    PortalError::Unsupported(format!("{} {}", R::NOUN, operation))
}

/// Inserts `key: value` into an object body, leaving non-objects untouched
pub(crate) fn with_field(mut body: Value, key: &str, value: &str) -> Value {
    if let Some(map) = body.as_object_mut() {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    body
}

pub struct ResourceClient<R: Resource> {
    gateway: Gateway,
    endpoints: Arc<Endpoints>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            endpoints: self.endpoints.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(gateway: Gateway, endpoints: Arc<Endpoints>) -> Self {
        Self {
            gateway,
            endpoints,
            _resource: PhantomData,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// One page of the current user's records in `direction`
    pub async fn list(
        &self,
        page: u32,
        page_size: u32,
        direction: Direction,
    ) -> Result<Page<R::Record>, PortalError> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let user_id = self.gateway.current_user_id()?;

        let descriptor = R::list_request(&self.endpoints, &user_id, direction, page, page_size);
        let value = self.gateway.send(&descriptor, None).await?;
        Ok(normalize_page(value, page, page_size)?)
    }

    pub async fn get(&self, id: &str) -> Result<R::Record, PortalError> {
        let (descriptor, body) =
            R::get_request(&self.endpoints, id).ok_or_else(|| unsupported::<R>("lookup"))?;
        let value = self.gateway.send(&descriptor, body).await?;
        Ok(normalize_record(value)?)
    }

    /// Repeating a create makes a second record server-side.
    ///
    /// `Ok(None)` means the server accepted the write without echoing the record.
    pub async fn create(&self, draft: &R::Draft) -> Result<Option<R::Record>, PortalError> {
        let user_id = self.gateway.current_user_id()?;
        let body = R::create_body(draft, &user_id);
        let value = self
            .gateway
            .send(&R::create_request(&self.endpoints), Some(body))
            .await?;
        Ok(saved_record(value))
    }

    pub async fn update<P>(&self, id: &str, patch: &P) -> Result<Option<R::Record>, PortalError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let descriptor =
            R::update_request(&self.endpoints, id).ok_or_else(|| unsupported::<R>("update"))?;
        let body = serde_json::to_value(patch).unwrap_or_default();
        let value = self.gateway.send(&descriptor, Some(body)).await?;
        Ok(saved_record(value))
    }

    pub async fn delete(&self, id: &str) -> Result<(), PortalError> {
        let descriptor =
            R::delete_request(&self.endpoints, id).ok_or_else(|| unsupported::<R>("deletion"))?;
        self.gateway.send(&descriptor, None).await?;
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> PagedSource for ResourceClient<R> {
    type Item = R::Record;
    type Scope = Direction;

    fn label(&self) -> &str {
        R::PLURAL
    }

    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        scope: Direction,
    ) -> Result<Page<R::Record>, PortalError> {
        self.list(page, page_size, scope).await
    }
}
