//! Record Store Gateway.
//!
//! Single-record reads and writes plus secondary-index queries and filtered
//! scans over the two collections (`empresas`, `sedes`). No operation spans
//! more than one record atomically.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{
    Collection, Cursor, Document, FieldChanges, Filter, Index, Page, PageRequest, RecordStore,
    StoreError,
};
