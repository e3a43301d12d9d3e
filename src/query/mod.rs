// src/query/mod.rs
// Query executors for document collections and the storage bucket

pub mod blob;
pub mod collection;

pub use blob::{BlobFilter, FileRecord, RECOGNIZED_FILE_FILTERS};
pub use collection::{Collection, Record};
