pub mod in_memory;
pub mod sqlite_store;

pub use in_memory::InMemorySessionStore;
pub use sqlite_store::SqliteSessionStore;
