//! Entry store layer.

pub mod row;
pub mod store;

pub use row::{EntryRow, InsertRow, RowError};
pub use store::EntryStore;

/// Default table name.
pub const ENTRIES_TABLE: &str = "entries";
