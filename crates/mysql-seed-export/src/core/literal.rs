//! PHP array literal rendering.
//!
//! Renders a [`SqlValue`] tree in short array syntax:
//!
//! ```text
//! [
//!         "id" => 5,
//!         "name" => "Al"
//! ]
//! ```
//!
//! Lists (and maps whose keys are exactly `0..n` in order) render without
//! keys. Each nesting level adds [`INDENT_UNIT`] to the prefix.

use crate::error::{ExportError, Result};

use super::value::{LiteralKey, SqlValue};

/// One nesting level.
pub const INDENT_UNIT: &str = "        ";

/// Render `value` with `indent` as the current nesting prefix.
pub fn to_literal(value: &SqlValue, indent: &str) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value, indent)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &SqlValue, indent: &str) -> Result<()> {
    match value {
        SqlValue::Null => out.push_str("null"),
        SqlValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        SqlValue::Int(i) => out.push_str(&i.to_string()),
        SqlValue::Float(f) => out.push_str(&format_float(*f)),
        SqlValue::Text(s) => write_string(out, s),
        SqlValue::Bytes(_) => {
            return Err(ExportError::unsupported(
                "binary data cannot be rendered as a string literal",
            ))
        }
        SqlValue::List(items) => {
            let entries = items.iter().map(|v| (None, v));
            write_array(out, entries, indent)?;
        }
        SqlValue::Map(map) => {
            let sequential = is_sequential(map.keys());
            let entries = map
                .iter()
                .map(|(k, v)| (if sequential { None } else { Some(k) }, v));
            write_array(out, entries, indent)?;
        }
    }
    Ok(())
}

fn write_array<'a, I>(out: &mut String, entries: I, indent: &str) -> Result<()>
where
    I: Iterator<Item = (Option<&'a LiteralKey>, &'a SqlValue)>,
{
    let inner = format!("{}{}", indent, INDENT_UNIT);

    out.push_str("[\n");
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        out.push_str(&inner);
        if let Some(key) = key {
            write_key(out, key);
            out.push_str(" => ");
        }
        write_value(out, value, &inner)?;
    }
    out.push('\n');
    out.push_str(indent);
    out.push(']');
    Ok(())
}

fn write_key(out: &mut String, key: &LiteralKey) {
    match key {
        LiteralKey::Int(i) => out.push_str(&i.to_string()),
        LiteralKey::Str(s) => write_string(out, s),
    }
}

/// Keys are exactly `0, 1, .., n-1` in order.
fn is_sequential<'a>(keys: impl Iterator<Item = &'a LiteralKey>) -> bool {
    keys.enumerate()
        .all(|(i, k)| matches!(k, LiteralKey::Int(n) if usize::try_from(*n).ok() == Some(i)))
}

/// Double-quoted string with `\`, `$`, `"` and control characters escaped.
fn write_string(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\v"),
            '\x0C' => out.push_str("\\f"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Shortest round-trip form, always readable back as a float.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        let inf = if f > 0.0 { "INF" } else { "-INF" };
        inf.to_string()
    } else {
        // Debug keeps the trailing ".0" on integral values.
        format!("{:?}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn map(entries: Vec<(LiteralKey, SqlValue)>) -> SqlValue {
        SqlValue::Map(entries.into_iter().collect::<IndexMap<_, _>>())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(to_literal(&SqlValue::Null, "").unwrap(), "null");
        assert_eq!(to_literal(&SqlValue::Bool(true), "").unwrap(), "true");
        assert_eq!(to_literal(&SqlValue::Bool(false), "").unwrap(), "false");
        assert_eq!(to_literal(&SqlValue::Int(-12), "").unwrap(), "-12");
        assert_eq!(to_literal(&SqlValue::Float(2.5), "").unwrap(), "2.5");
        assert_eq!(to_literal(&SqlValue::Float(1.0), "").unwrap(), "1.0");
        assert_eq!(to_literal(&SqlValue::Float(f64::NAN), "").unwrap(), "NAN");
        assert_eq!(to_literal(&SqlValue::Float(f64::NEG_INFINITY), "").unwrap(), "-INF");
    }

    #[test]
    fn test_string_escaping() {
        let v = SqlValue::from("He said \"hi\"");
        assert_eq!(to_literal(&v, "").unwrap(), r#""He said \"hi\"""#);

        let v = SqlValue::from("a\\b $x\r\n\t\x0B\x0C");
        assert_eq!(to_literal(&v, "").unwrap(), r#""a\\b \$x\r\n\t\v\f""#);

        // Already-escaped single quotes gain a second backslash.
        let v = SqlValue::from("O\\'Brien");
        assert_eq!(to_literal(&v, "").unwrap(), r#""O\\'Brien""#);
    }

    #[test]
    fn test_list_rendering() {
        let v = SqlValue::List(vec![SqlValue::Int(1), SqlValue::from("a")]);
        assert_eq!(
            to_literal(&v, "").unwrap(),
            "[\n        1,\n        \"a\"\n]"
        );
    }

    #[test]
    fn test_map_rendering_with_indent() {
        let v = map(vec![
            ("id".into(), SqlValue::Int(1)),
            ("name".into(), SqlValue::from("Bo")),
        ]);
        assert_eq!(
            to_literal(&v, "    ").unwrap(),
            "[\n            \"id\" => 1,\n            \"name\" => \"Bo\"\n    ]"
        );
    }

    #[test]
    fn test_sequential_int_keys_render_as_list() {
        let v = map(vec![
            (LiteralKey::Int(0), SqlValue::from("a")),
            (LiteralKey::Int(1), SqlValue::from("b")),
        ]);
        assert_eq!(to_literal(&v, "").unwrap(), "[\n        \"a\",\n        \"b\"\n]");
    }

    #[test]
    fn test_sparse_int_keys_render_with_keys() {
        let v = map(vec![
            (LiteralKey::Int(1), SqlValue::from("a")),
            (LiteralKey::Int(0), SqlValue::from("b")),
        ]);
        assert_eq!(
            to_literal(&v, "").unwrap(),
            "[\n        1 => \"a\",\n        0 => \"b\"\n]"
        );
    }

    #[test]
    fn test_nested_rendering() {
        let v = SqlValue::List(vec![map(vec![("id".into(), SqlValue::Int(5))])]);
        assert_eq!(
            to_literal(&v, "").unwrap(),
            "[\n        [\n                \"id\" => 5\n        ]\n]"
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(to_literal(&SqlValue::List(vec![]), "  ").unwrap(), "[\n\n  ]");
    }

    #[test]
    fn test_bytes_rejected() {
        let err = to_literal(&SqlValue::Bytes(vec![0xff]), "").unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedValueType(_)));

        let nested = SqlValue::List(vec![SqlValue::Bytes(vec![0xfe])]);
        assert!(to_literal(&nested, "").is_err());
    }

    /// Reads a rendered literal back into a value tree.
    struct LiteralReader<'a> {
        chars: std::iter::Peekable<std::str::Chars<'a>>,
    }

    impl<'a> LiteralReader<'a> {
        fn read(text: &'a str) -> SqlValue {
            let mut reader = Self {
                chars: text.chars().peekable(),
            };
            let value = reader.value();
            reader.skip_ws();
            assert!(reader.chars.next().is_none(), "trailing input");
            value
        }

        fn skip_ws(&mut self) {
            while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
                self.chars.next();
            }
        }

        fn value(&mut self) -> SqlValue {
            self.skip_ws();
            match self.chars.peek() {
                Some('[') => self.array(),
                Some('"') => SqlValue::Text(self.string()),
                _ => self.scalar(),
            }
        }

        fn scalar(&mut self) -> SqlValue {
            let mut word = String::new();
            while let Some(&c) = self.chars.peek() {
                if c == ',' || c == ']' || c.is_whitespace() {
                    break;
                }
                word.push(c);
                self.chars.next();
            }
            match word.as_str() {
                "null" => SqlValue::Null,
                "true" => SqlValue::Bool(true),
                "false" => SqlValue::Bool(false),
                "NAN" => SqlValue::Float(f64::NAN),
                "INF" => SqlValue::Float(f64::INFINITY),
                "-INF" => SqlValue::Float(f64::NEG_INFINITY),
                w if w.contains(['.', 'e']) => SqlValue::Float(w.parse().unwrap()),
                w => SqlValue::Int(w.parse().unwrap()),
            }
        }

        fn string(&mut self) -> String {
            assert_eq!(self.chars.next(), Some('"'));
            let mut out = String::new();
            loop {
                match self.chars.next().unwrap() {
                    '"' => return out,
                    '\\' => match self.chars.next().unwrap() {
                        'r' => out.push('\r'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'v' => out.push('\x0B'),
                        'f' => out.push('\x0C'),
                        c @ ('\\' | '$' | '"') => out.push(c),
                        c => {
                            out.push('\\');
                            out.push(c);
                        }
                    },
                    c => out.push(c),
                }
            }
        }

        fn array(&mut self) -> SqlValue {
            assert_eq!(self.chars.next(), Some('['));
            let mut entries = Vec::new();
            loop {
                self.skip_ws();
                if self.chars.peek() == Some(&']') {
                    self.chars.next();
                    break;
                }
                let first = self.value();
                self.skip_ws();
                if self.chars.peek() == Some(&'=') {
                    assert_eq!(self.chars.next(), Some('='));
                    assert_eq!(self.chars.next(), Some('>'));
                    let key = match first {
                        SqlValue::Int(i) => LiteralKey::Int(i),
                        SqlValue::Text(s) => LiteralKey::Str(s),
                        other => panic!("invalid key {:?}", other),
                    };
                    entries.push((Some(key), self.value()));
                } else {
                    entries.push((None, first));
                }
                self.skip_ws();
                if self.chars.peek() == Some(&',') {
                    self.chars.next();
                }
            }

            if entries.iter().all(|(k, _)| k.is_none()) {
                SqlValue::List(entries.into_iter().map(|(_, v)| v).collect())
            } else {
                map(entries.into_iter().map(|(k, v)| (k.unwrap(), v)).collect())
            }
        }
    }

    #[test]
    fn test_reread_literal_renders_identically() {
        let v = SqlValue::List(vec![
            map(vec![
                ("id".into(), SqlValue::Int(-7)),
                ("name".into(), SqlValue::from("O\\'Brien")),
                ("quote".into(), SqlValue::from("He said \"hi\" for $5\r\n\t\x0B\x0C")),
                ("unicode".into(), SqlValue::from("Zoë ☕")),
                ("ratio".into(), SqlValue::Float(0.1)),
                ("whole".into(), SqlValue::Float(1.0)),
                ("tiny".into(), SqlValue::Float(-2.5e-8)),
                ("huge".into(), SqlValue::Float(1e300)),
                ("nan".into(), SqlValue::Float(f64::NAN)),
                ("active".into(), SqlValue::Bool(true)),
                ("deleted_at".into(), SqlValue::Null),
                ("tags".into(), SqlValue::List(vec![SqlValue::from("a"), SqlValue::Int(2)])),
                ("none".into(), SqlValue::List(vec![])),
                (
                    "sparse".into(),
                    map(vec![
                        (LiteralKey::Int(3), SqlValue::from("three")),
                        (LiteralKey::Int(1), SqlValue::Bool(false)),
                    ]),
                ),
            ]),
            map(vec![
                (LiteralKey::Int(0), SqlValue::from("zero")),
                (LiteralKey::Int(1), SqlValue::Float(f64::NEG_INFINITY)),
            ]),
        ]);

        let rendered = to_literal(&v, INDENT_UNIT).unwrap();
        let reread = LiteralReader::read(&rendered);
        assert_eq!(to_literal(&reread, INDENT_UNIT).unwrap(), rendered);
    }

    #[test]
    fn test_deterministic() {
        let v = map(vec![
            ("b".into(), SqlValue::Float(0.1)),
            ("a".into(), SqlValue::List(vec![SqlValue::Null])),
        ]);
        assert_eq!(to_literal(&v, "").unwrap(), to_literal(&v, "").unwrap());
    }
}
