//! Laravel seeder file generation.
//!
//! Wraps a table's array literal in a seeder class and writes it to
//! `{output_dir}/{Table}TableSeeder.php`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::INDENT_UNIT;
use crate::error::{ExportError, Result};

/// Seeder class name for a table: `users` becomes `UsersTableSeeder`.
pub fn class_name(table: &str) -> String {
    let mut chars = table.chars();
    let mut name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    name.push_str("TableSeeder");
    name
}

/// Render the seeder source for `table` around its rendered `literal`.
///
/// The literal is expected to be rendered with [`INDENT_UNIT`] as its
/// indent; its opening bracket is placed on its own line at that indent.
pub fn render(table: &str, literal: &str) -> String {
    let class = class_name(table);
    let table = table.replace('\\', "\\\\").replace('\'', "\\'");

    format!(
        "<?php\n\n\
         use Illuminate\\Database\\Seeder;\n\n\
         class {class} extends Seeder {{\n\
         \x20   public function run() {{\n\
         \x20       $entries = \n\
         {INDENT_UNIT}{literal};\n\n\n\
         \x20       foreach($entries as $entry){{\n\
         \x20           DB::table('{table}')->insert($entry);\n\
         \x20       }}\n\
         \x20   }}\n\
         }}"
    )
}

/// Writes rendered seeders into an output directory.
#[derive(Debug, Clone)]
pub struct SeederEmitter {
    output_dir: PathBuf,
}

impl SeederEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the seeder file for `table`.
    ///
    /// Table names that would escape the output directory are rejected.
    pub fn path_for(&self, table: &str) -> Result<PathBuf> {
        if table.contains(['/', '\\', '\0']) {
            return Err(ExportError::Output(format!(
                "table name '{}' cannot be used as a seeder file name",
                table.escape_debug()
            )));
        }
        Ok(self.output_dir.join(format!("{}.php", class_name(table))))
    }

    /// Write `contents` as the seeder for `table`, creating the directory.
    pub fn write(&self, table: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path_for(table)?;
        fs::create_dir_all(&self.output_dir)?;
        fs::write(&path, contents)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("users"), "UsersTableSeeder");
        assert_eq!(class_name("Orders"), "OrdersTableSeeder");
        assert_eq!(class_name("user_roles"), "User_rolesTableSeeder");
        assert_eq!(class_name(""), "TableSeeder");
    }

    #[test]
    fn test_render_template() {
        let out = render("users", "[\n\n        ]");
        let expected = "<?php\n\n\
use Illuminate\\Database\\Seeder;\n\n\
class UsersTableSeeder extends Seeder {\n    \
public function run() {\n        \
$entries = \n        \
[\n\n        ];\n\n\n        \
foreach($entries as $entry){\n            \
DB::table('users')->insert($entry);\n        \
}\n    \
}\n\
}";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_escapes_table_name() {
        let out = render("o'dd", "[]");
        assert!(out.contains("DB::table('o\\'dd')"));
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = SeederEmitter::new(dir.path().join("database/seeds"));

        let path = emitter.write("users", "<?php").unwrap();
        assert_eq!(path, dir.path().join("database/seeds/UsersTableSeeder.php"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<?php");
    }

    #[test]
    fn test_path_rejects_separators() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = SeederEmitter::new(dir.path().join("seeds"));

        for table in ["../etc", "a/b", "a\\b", "nul\0"] {
            let err = emitter.write(table, "<?php").unwrap_err();
            assert!(matches!(err, ExportError::Output(_)), "{}", table);
        }
        assert!(!dir.path().join("seeds").exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

        // Dots alone stay inside the directory.
        let path = emitter.path_for("..").unwrap();
        assert_eq!(path, dir.path().join("seeds/..TableSeeder.php"));
    }
}
