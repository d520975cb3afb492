//! Core contracts shared by the pgmatch crates.
//!
//! This crate defines the catalog descriptors both schemas are reduced to,
//! the diff records the comparers emit, and the immutable run configuration.
//! It performs no I/O.

pub mod census;
pub mod config;
pub mod constraints;
pub mod diff;
pub mod error;
pub mod handle;
pub mod ident;
pub mod schema;

pub use census::{CapabilityProbe, CommentCensus, ObjectCensus, ObjectKind, RoutineMode};
pub use config::{RunConfig, ScanMode};
pub use constraints::{ConstraintDescriptor, ConstraintKind, FkAction, FkMatchType, IndexDescriptor};
pub use diff::{Category, Counter, DiffRecord, Severity};
pub use error::{Error, Result};
pub use handle::{SchemaHandle, Side};
pub use ident::{display_ident, needs_quoting, quote_ident, validate_identifier};
pub use schema::{ColumnDescriptor, RowCountPair, TableDescriptor, ViewDescriptor};

/// Application name reported to the server on every connection.
pub const APPLICATION_NAME: &str = "pgmatch";
