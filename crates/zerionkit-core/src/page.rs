//! JSON:API response envelope and cursor-based pagination traversal.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;

/// Largest page size the API accepts; traversals pin this to minimize
/// round-trips.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A JSON:API response document: payload plus pagination links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Pagination links; `next` is a fully-qualified URL carrying the opaque
/// `page[after]` cursor for the following page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
}

impl Links {
    /// Extracts the `page[after]` cursor from the `next` link, if any.
    pub fn next_cursor(&self) -> Option<String> {
        let next = self.next.as_deref()?;
        let url = Url::parse(next).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page[after]")
            .map(|(_, value)| value.into_owned())
    }
}

/// Walks a paginated collection to exhaustion, aggregating every page's items
/// in API order.
///
/// `fetch` is invoked with `None` first, then with each extracted cursor,
/// until a page carries no `next` link. All-or-nothing: a failed page fetch
/// propagates immediately and no partial result is returned.
pub async fn collect_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Document<Vec<T>>, ApiError>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.take()).await?;
        cursor = page.links.next_cursor();
        tracing::debug!(
            items = page.data.len(),
            has_next = cursor.is_some(),
            "fetched page"
        );
        items.extend(page.data);
        if cursor.is_none() {
            return Ok(items);
        }
    }
}
