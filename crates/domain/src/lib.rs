//! Domain layer for the rental ledger.
//!
//! This crate provides the services that sit between the transport and the
//! record store:
//! - `PropertyService` for rental properties
//! - `CategoryService` for income/expense categories, unique per classification
//! - `TransactionService` for transactions, checked against their category
//! - `AppError`, the classified error every service returns

use chrono::{DateTime, SubsecRound, Utc};

pub mod category;
pub mod error;
pub mod property;
pub mod transaction;
pub mod validation;

pub use category::{
    CategoryDeletePolicy, CategoryResponse, CategoryService, CreateCategory, ParsePolicyError,
    UpdateCategory,
};
pub use error::{AppError, ErrorKind, FieldErrors, INTERNAL_MESSAGE};
pub use property::{CreateProperty, PropertyResponse, PropertyService, UpdateProperty};
pub use transaction::{CreateTransaction, TransactionResponse, TransactionService, UpdateTransaction};

/// Current time, truncated to the microsecond precision the stores keep.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
