//! Pagination shapes.

use serde::{Deserialize, Serialize};

use super::task::Task;

/// List response envelope from the remote store.
///
/// `next == None` signals there are no further pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope {
    pub data: Vec<Task>,
    pub first: Option<u32>,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub last: Option<u32>,
    pub pages: u32,
    pub items: usize,
}

impl PageEnvelope {
    /// Build the envelope for 1-based `page` of `total` items.
    pub fn slice(data: Vec<Task>, page: u32, per_page: u32, total: usize) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(per_page as usize) as u32;
        let last = pages.max(1);
        Self {
            data,
            first: Some(1),
            prev: (page > 1).then(|| page - 1),
            next: (page < pages).then(|| page + 1),
            last: Some(last),
            pages,
            items: total,
        }
    }
}

/// One fetched batch held by the column cache. Immutable once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub number: u32,
    pub tasks: Vec<Task>,
    pub next: Option<u32>,
}

impl Page {
    pub fn from_envelope(number: u32, envelope: PageEnvelope) -> Self {
        Self {
            number,
            tasks: envelope.data,
            next: envelope.next,
        }
    }
}
