pub mod db;
pub mod models;

pub use db::{DrawStore, StorageError};
pub use models::{DrawRecord, ValidationError};

pub use rusqlite;
