//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ConnectOptions, ConnectOptionsBuilder, ConnectionSpec};
pub use crate::connection::Connection;
pub use crate::cursor::Cursor;
pub use crate::error::DbApiError;
pub use crate::keywords::{KeyMap, Keywords, parse_dsn, translate_keywords};
pub use crate::reflect::ColumnDescriptor;
pub use crate::results::Row;
pub use crate::types::{BackendKind, RowValues};
pub use crate::connect;
