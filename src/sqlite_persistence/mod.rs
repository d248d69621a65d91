mod sqlite_store;
mod versioned_schema;

pub use sqlite_store::SqliteStore;
pub use versioned_schema::*;
