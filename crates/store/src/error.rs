use thiserror::Error;

use partsdesk_core::DomainError;
use partsdesk_sales::StockShortfall;

/// Error surfaced by store-level operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Confirmation rejected: one or more line items cannot be covered by
    /// on-hand stock (or reference a deleted product).
    #[error("{detail}")]
    InsufficientStock {
        detail: String,
        items: Vec<StockShortfall>,
    },
}

impl ServiceError {
    pub fn insufficient(items: Vec<StockShortfall>) -> Self {
        Self::InsufficientStock {
            detail: StockShortfall::summary(&items),
            items,
        }
    }
}
