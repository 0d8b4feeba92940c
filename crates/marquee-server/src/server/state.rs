//! Shared application state.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::ledger::FallbackLedger;
use crate::queue::InsertQueue;
use crate::storage::CatalogDatabase;

/// Everything the request handlers need. `db` and `queue` are `None` when
/// the corresponding backend never came up; handlers re-check on every use
/// and degrade to the next tier.
#[derive(Clone)]
pub struct AppState {
    pub db: Option<CatalogDatabase>,
    pub queue: Option<InsertQueue>,
    pub ledger: Arc<FallbackLedger>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Fully-online state: store available, queue running.
    pub fn new(db: CatalogDatabase, queue: InsertQueue, tokens: TokenIssuer) -> Self {
        Self {
            db: Some(db),
            queue: Some(queue),
            ledger: Arc::new(FallbackLedger::seeded()),
            tokens: Arc::new(tokens),
        }
    }

    /// Store available but no queue; creates write synchronously.
    pub fn store_only(db: CatalogDatabase, tokens: TokenIssuer) -> Self {
        Self {
            db: Some(db),
            queue: None,
            ledger: Arc::new(FallbackLedger::seeded()),
            tokens: Arc::new(tokens),
        }
    }

    /// Offline state: no store, no queue; the fallback ledger serves
    /// everything.
    pub fn offline(tokens: TokenIssuer) -> Self {
        Self {
            db: None,
            queue: None,
            ledger: Arc::new(FallbackLedger::seeded()),
            tokens: Arc::new(tokens),
        }
    }
}
