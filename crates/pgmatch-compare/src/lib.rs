//! Comparison engine for two Postgres schemas.
//!
//! Each comparer is a pure function of two descriptor snapshots returning
//! diff records; [`ComparisonEngine`] fetches the snapshots through a
//! [`pgmatch_catalog::CatalogReader`] per side and feeds the results into a
//! [`DiffReport`].

pub mod align;
pub mod census;
pub mod columns;
pub mod constraints;
mod display;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod normalize;
pub mod relations;
pub mod report;
pub mod rowcounts;

pub use align::{Alignment, align};
pub use engine::ComparisonEngine;
pub use errors::CompareError;
pub use gate::{MIN_SERVER_VERSION_NUM, check_compatibility};
pub use report::{DIFF_TARGET, DiffReport};
