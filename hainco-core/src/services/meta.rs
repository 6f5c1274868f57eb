//! Meta service - database diagnostics

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::TableRowCount;
use crate::ports::RecordStore;

pub struct MetaService {
    store: Arc<dyn RecordStore>,
}

impl MetaService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Row counts for product, staff, customer, admin and transaction tables
    pub async fn row_counts(&self) -> Result<Vec<TableRowCount>> {
        self.store.count_rows().await
    }
}
