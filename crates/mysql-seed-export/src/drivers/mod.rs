//! Database driver implementations.
//!
//! Each driver implements the catalog and row traits from
//! [`crate::core::traits`]. Only MySQL/MariaDB is supported.

pub mod mysql;

pub use mysql::{MysqlDialect, MysqlReader, TableAffixes};
