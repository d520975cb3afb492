//! Catalog readers: the only code in pgmatch that talks to a server.

pub mod postgres;
pub mod reader;

pub use postgres::PostgresCatalog;
pub use reader::CatalogReader;
