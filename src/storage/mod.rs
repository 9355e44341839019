pub mod backup;
mod file_storage;
pub mod ids;
pub mod migration;
mod models;

pub use file_storage::{load_document, Result, StorageError};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use migration::{migrate, migrate_document, run_migration, run_migration_with};
pub use models::*;
