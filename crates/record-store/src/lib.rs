pub mod entity;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod timeout;

pub use entity::{
    Classification, ParseLabelError, Property, Record, Transaction, TransactionCategory,
    TransactionType,
};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{CategoryFilter, Listing, TransactionFilter};
pub use store::{CategoryStore, LedgerStore, PropertyStore, TransactionStore};
pub use timeout::DEFAULT_TIMEOUT;
