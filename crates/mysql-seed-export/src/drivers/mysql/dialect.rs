//! MySQL/MariaDB SQL dialect.
//!
//! Identifier quoting, table prefix/suffix templating and query building.

use crate::core::schema::{Table, ValueKind};

/// Table name prefix and suffix.
///
/// SQL text may carry `%s` placeholders: the first is replaced by the prefix,
/// the second by the suffix, and `%%` becomes `%`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAffixes {
    pub prefix: String,
    pub suffix: String,
}

impl TableAffixes {
    pub fn new(prefix: Option<&str>, suffix: Option<&str>) -> Self {
        Self {
            prefix: prefix.unwrap_or_default().to_string(),
            suffix: suffix.unwrap_or_default().to_string(),
        }
    }

    /// Substitute the placeholders in `statement`.
    ///
    /// Placeholders beyond the second are left as they are.
    pub fn apply(&self, statement: &str) -> String {
        let mut out = String::with_capacity(statement.len() + self.prefix.len() + self.suffix.len());
        let mut args = [self.prefix.as_str(), self.suffix.as_str()].into_iter();
        let mut chars = statement.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some('s') => {
                    chars.next();
                    match args.next() {
                        Some(arg) => out.push_str(arg),
                        None => out.push_str("%s"),
                    }
                }
                _ => out.push('%'),
            }
        }

        out
    }

    /// Name of the table as stored in the database.
    pub fn physical_name(&self, table: &str) -> String {
        self.apply(&format!("%s{}%s", table.replace('%', "%%")))
    }

    /// Logical name of a physical table, if it carries both affixes.
    pub fn logical_name<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// MySQL/MariaDB dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect {
    affixes: TableAffixes,
}

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new(affixes: TableAffixes) -> Self {
        Self { affixes }
    }

    pub fn affixes(&self) -> &TableAffixes {
        &self.affixes
    }

    /// Quote an identifier with backticks, doubling embedded backticks.
    pub fn quote_ident(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Select every column of a table.
    ///
    /// Date, time and decimal columns are cast to `CHAR` so that zero dates
    /// come back as their literal text.
    pub fn build_select_all(&self, table: &Table) -> String {
        let cols = if table.columns.is_empty() {
            "*".to_string()
        } else {
            table
                .columns
                .iter()
                .map(|c| {
                    let ident = self.quote_ident(&c.name);
                    if c.value_kind() == ValueKind::CastText {
                        format!("CAST({ident} AS CHAR) AS {ident}")
                    } else {
                        ident
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "SELECT {} FROM {}",
            cols,
            self.quote_ident(&self.affixes.physical_name(&table.name))
        )
    }
}
