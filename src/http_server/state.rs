use std::sync::Arc;

use crate::database::Database;

pub struct AppState {
    pub db: Arc<Database>,
    /// Default page size of the order list
    pub order_page_size: u64,
    pub max_page_size: u64,
}
