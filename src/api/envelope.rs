//! Response envelope normalization.
//!
//! Listing endpoints answer in one of two shapes:
//!
//! ```text
//! { success, message, data: [...], totalDocs?, totalPages?, page?, hasPrevPage?, hasNextPage? }
//! { success, message, docs: [...], totalDocs, totalPages, page, pagingCounter, hasPrevPage, hasNextPage }
//! ```
//!
//! and some wrap the second shape inside `data`. [`normalize_page`] accepts all
//! of them and always yields a [`Page`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequestError;

/// One fetched page of a server-side collection.
///
/// `current_page` is always within `1..=total_pages` and `total_pages >= 1`,
/// even for an empty result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 1,
            current_page: 1,
            has_prev: false,
            has_next: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Counters {
    total_docs: Option<u64>,
    total_pages: Option<u32>,
    page: Option<u32>,
    has_prev_page: Option<bool>,
    has_next_page: Option<bool>,
}

impl Counters {
    fn or(self, outer: Counters) -> Counters {
        Counters {
            total_docs: self.total_docs.or(outer.total_docs),
            total_pages: self.total_pages.or(outer.total_pages),
            page: self.page.or(outer.page),
            has_prev_page: self.has_prev_page.or(outer.has_prev_page),
            has_next_page: self.has_next_page.or(outer.has_next_page),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEnvelope {
    data: Option<Value>,
    docs: Option<Value>,
    #[serde(flatten)]
    counters: Counters,
}

fn is_envelope(value: &Value) -> bool {
    ["data", "docs"].iter().any(|key| {
        value
            .get(*key)
            .is_some_and(|inner| inner.is_array() || inner.is_object())
    })
}

fn unwrap_envelope(value: Value) -> Result<(Vec<Value>, Counters), RequestError> {
    match value {
        Value::Null => Ok((Vec::new(), Counters::default())),
        Value::Array(items) => Ok((items, Counters::default())),
        Value::Object(_) => {
            let raw: RawEnvelope =
                serde_json::from_value(value).map_err(|e| RequestError::malformed(None, e))?;

            // `data` wins when both are present
            match raw.data.or(raw.docs) {
                None => Ok((Vec::new(), raw.counters)),
                Some(Value::Array(items)) => Ok((items, raw.counters)),
                Some(inner) if is_envelope(&inner) => {
                    let (items, counters) = unwrap_envelope(inner)?;
                    Ok((items, counters.or(raw.counters)))
                }
                Some(other) => Err(RequestError::malformed(
                    None,
                    format!("expected a list of records, got {}", other),
                )),
            }
        }
        other => Err(RequestError::malformed(
            None,
            format!("expected an envelope, got {}", other),
        )),
    }
}

fn pages_for(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Normalizes any listing envelope into a [`Page`].
///
/// `requested_page` and `page_size` fill in counters the server left out.
pub fn normalize_page<T: DeserializeOwned>(
    value: Value,
    requested_page: u32,
    page_size: u32,
) -> Result<Page<T>, RequestError> {
    let (raw_items, counters) = unwrap_envelope(value)?;

    let items = raw_items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| RequestError::malformed(None, e))?;

    let requested_page = requested_page.max(1);
    let total_items = counters.total_docs.unwrap_or_else(|| {
        let before = u64::from(requested_page - 1) * u64::from(page_size);
        if items.is_empty() {
            before
        } else {
            before + items.len() as u64
        }
    });
    let total_pages = counters
        .total_pages
        .unwrap_or_else(|| pages_for(total_items, page_size))
        .max(1);
    let current_page = counters.page.unwrap_or(requested_page).clamp(1, total_pages);

    Ok(Page {
        items,
        total_items,
        total_pages,
        current_page,
        has_prev: counters.has_prev_page.unwrap_or(current_page > 1),
        has_next: counters.has_next_page.unwrap_or(current_page < total_pages),
    })
}

fn extract_record(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items.into_iter().next().unwrap_or(Value::Null),
            Some(Value::Null) | None => Value::Object(map),
            Some(inner) => inner,
        },
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}

/// Extracts a single record from `{ data: record }`, `{ data: [record] }` or a bare record
pub fn normalize_record<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    serde_json::from_value(extract_record(value)).map_err(|e| RequestError::malformed(None, e))
}

/// Record echoed back by a successful mutation.
///
/// The write already happened once the reply is 2xx, so a missing or
/// unparsable record is `None` rather than an error.
pub fn saved_record<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(extract_record(value)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!("mutation reply carried no usable record: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        #[serde(rename = "_id")]
        id: String,
    }

    fn ids(page: &Page<Item>) -> Vec<&str> {
        page.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_data_and_docs_envelopes_normalize_identically() {
        let data = json!({
            "success": true,
            "message": "ok",
            "data": [{ "_id": "a" }, { "_id": "b" }],
            "totalDocs": 12,
            "totalPages": 2,
            "page": 1,
            "hasPrevPage": false,
            "hasNextPage": true
        });
        let docs = json!({
            "success": true,
            "message": "ok",
            "docs": [{ "_id": "a" }, { "_id": "b" }],
            "totalDocs": 12,
            "totalPages": 2,
            "page": 1,
            "pagingCounter": 1,
            "hasPrevPage": false,
            "hasNextPage": true
        });

        let from_data: Page<Item> = normalize_page(data, 1, 10).unwrap();
        let from_docs: Page<Item> = normalize_page(docs, 1, 10).unwrap();

        assert_eq!(ids(&from_data), vec!["a", "b"]);
        assert_eq!(from_data, from_docs);
        assert_eq!(from_docs.total_items, 12);
        assert!(from_docs.has_next);
    }

    #[test]
    fn test_docs_nested_inside_data() {
        let value = json!({
            "success": true,
            "data": {
                "docs": [{ "_id": "x" }],
                "totalDocs": 21,
                "totalPages": 3,
                "page": 3,
                "hasPrevPage": true,
                "hasNextPage": false
            }
        });

        let page: Page<Item> = normalize_page(value, 3, 10).unwrap();
        assert_eq!(ids(&page), vec!["x"]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert!(page.has_prev);
    }

    #[test]
    fn test_data_wins_over_docs() {
        let value = json!({ "data": [{ "_id": "d" }], "docs": [{ "_id": "o" }] });
        let page: Page<Item> = normalize_page(value, 1, 10).unwrap();
        assert_eq!(ids(&page), vec!["d"]);
    }

    #[test]
    fn test_empty_result_still_has_one_page() {
        let value = json!({ "success": true, "docs": [], "totalDocs": 0, "totalPages": 0, "page": 1 });
        let page: Page<Item> = normalize_page(value, 1, 10).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(!page.has_prev && !page.has_next);
    }

    #[test]
    fn test_missing_counters_are_derived() {
        let value = json!({ "success": true, "data": [{ "_id": "a" }, { "_id": "b" }, { "_id": "c" }], "totalDocs": 23 });
        let page: Page<Item> = normalize_page(value, 2, 10).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert!(page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn test_server_page_is_clamped_into_range() {
        let value = json!({ "docs": [], "totalDocs": 0, "totalPages": 2, "page": 9 });
        let page: Page<Item> = normalize_page(value, 9, 10).unwrap();
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_bare_array_and_null_data() {
        let bare: Page<Item> = normalize_page(json!([{ "_id": "a" }]), 1, 10).unwrap();
        assert_eq!(bare.total_items, 1);
        let null: Page<Item> = normalize_page(json!({ "success": true, "data": null }), 1, 10).unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn test_scalar_data_is_malformed() {
        let err = normalize_page::<Item>(json!({ "data": "nope" }), 1, 10).unwrap_err();
        assert_eq!(err.message, "Received a malformed response from the server");
    }

    #[test]
    fn test_normalize_record_shapes() {
        let wrapped: Item = normalize_record(json!({ "success": true, "data": { "_id": "a" } })).unwrap();
        let listed: Item = normalize_record(json!({ "data": [{ "_id": "b" }] })).unwrap();
        let bare: Item = normalize_record(json!({ "_id": "c" })).unwrap();
        assert_eq!((wrapped.id.as_str(), listed.id.as_str(), bare.id.as_str()), ("a", "b", "c"));
    }

    #[test]
    fn test_saved_record_without_data_is_none() {
        let echoed: Option<Item> = saved_record(json!({ "success": true, "data": { "_id": "a" } }));
        assert_eq!(echoed.map(|i| i.id), Some("a".to_string()));

        let message_only: Option<Item> =
            saved_record(json!({ "success": true, "message": "Referral created successfully" }));
        assert_eq!(message_only, None);
        assert_eq!(saved_record::<Item>(Value::Null), None);
    }

    #[test]
    fn test_null_fields_do_not_fail_the_page() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[serde(rename = "_id")]
            id: String,
            #[serde(default, deserialize_with = "crate::types::null_as_default")]
            name: String,
        }

        let value = json!({ "data": [{ "_id": "a", "name": "Asha" }, { "_id": "b", "name": null }] });
        let page: Page<Named> = normalize_page(value, 1, 10).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.items[1].id, "b");
        assert_eq!(page.items[1].name, "");
    }
}
