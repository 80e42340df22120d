//! MySQL/MariaDB database driver.
//!
//! - [`MysqlDialect`]: identifier quoting, table affixes and query building
//! - [`MysqlReader`]: catalog and row access
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod dialect;
mod reader;

pub use dialect::{MysqlDialect, TableAffixes};
pub use reader::MysqlReader;
