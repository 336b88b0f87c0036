//! Shared building blocks for the rental ledger crates.

pub mod pagination;
pub mod patch;
pub mod types;

pub use pagination::{PageRequest, Paginated, PaginationInfo};
pub use patch::Patch;
pub use types::EntityId;
