//! Diagnostic value types

use serde::Serialize;

/// Row count of one resource table
///
/// Serialized as a `[table_name, row_count]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRowCount(pub String, pub i64);

impl TableRowCount {
    pub fn new(table_name: impl Into<String>, row_count: i64) -> Self {
        Self(table_name.into(), row_count)
    }

    pub fn table_name(&self) -> &str {
        &self.0
    }

    pub fn row_count(&self) -> i64 {
        self.1
    }
}
