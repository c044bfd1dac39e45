//! Observability - request counters exposed by transports.

use serde::{Deserialize, Serialize};

/// Requests seen by a transport, per operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub list: usize,
    pub count: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl RequestCounts {
    pub fn mutations(&self) -> usize {
        self.create + self.update + self.delete
    }
}
