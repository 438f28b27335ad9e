//! Response envelopes for list and item endpoints

use serde::{Deserialize, Serialize};

/// Page of rows with pagination metadata
///
/// ```json
/// { "data": [...], "meta": { "total": 145, "limit": 20, "offset": 40, "has_more": true, "next_offset": 60 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    /// The rows of this page
    pub data: Vec<T>,

    /// Pagination metadata
    pub meta: ListMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total number of rows matching the filter (or a lower bound, when
    /// counting was skipped)
    pub total: u64,

    /// Page size used for this page
    pub limit: u64,

    /// Offset of the first row of this page
    pub offset: u64,

    /// Whether rows exist past this page
    pub has_more: bool,

    /// Offset to request for the next page, present when `has_more`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}

impl ListMeta {
    /// Metadata for a page of `returned` rows out of an exact `total`
    pub fn new(total: u64, limit: u64, offset: u64, returned: usize) -> Self {
        let has_more = offset.saturating_add(returned as u64) < total;
        Self::with_has_more(total, limit, offset, returned, has_more)
    }

    /// Metadata with an externally decided `has_more`
    pub fn with_has_more(
        total: u64,
        limit: u64,
        offset: u64,
        returned: usize,
        has_more: bool,
    ) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more,
            next_offset: has_more.then(|| offset.saturating_add(returned as u64)),
        }
    }
}

/// Single item wrapped as `{ "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEnvelope<T> {
    pub data: T,
}

pub fn build_list_envelope<T>(data: Vec<T>, total: u64, limit: u64, offset: u64) -> ListEnvelope<T> {
    let meta = ListMeta::new(total, limit, offset, data.len());
    ListEnvelope { data, meta }
}

pub fn build_item_envelope<T>(data: T) -> ItemEnvelope<T> {
    ItemEnvelope { data }
}
