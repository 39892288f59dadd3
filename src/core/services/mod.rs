pub mod summary_service;
pub mod transaction_service;
pub mod view_service;

pub use summary_service::{RegisterStats, SummaryService};
pub use transaction_service::{TransactionRequest, TransactionService};
pub use view_service::{ShareholderView, TransactionView, ViewService};

use crate::errors::RegisterError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error("{0}")]
    Invalid(String),
}
