pub mod common;
pub mod goods_categories;
pub mod purchase_requests;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub procurement: Arc<crate::services::procurement::ProcurementService>,
    pub catalog: Arc<crate::services::catalog::CatalogService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let procurement = Arc::new(crate::services::procurement::ProcurementService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let catalog = Arc::new(crate::services::catalog::CatalogService::new(
            db_pool,
            event_sender,
        ));

        Self {
            procurement,
            catalog,
        }
    }
}
