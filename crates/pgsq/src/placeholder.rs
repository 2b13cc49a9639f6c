//! Placeholder rewriting.
//!
//! Statements are assembled with unqualified `?` markers. Right before execution the
//! fully reduced text is rewritten once into the driver's positional syntax
//! (`$1, $2, ...` for Postgres). A doubled marker `??` is an escape for a literal `?`
//! (e.g. the jsonb `?|` operator) and does not consume a parameter slot.
//!
//! ```ignore
//! use pgsq::PlaceholderFormat;
//!
//! let sql = PlaceholderFormat::Dollar.replace("data -> 'tags' ??| ? AND id = ?")?;
//! assert_eq!(sql, "data -> 'tags' ?| $1 AND id = $2");
//! ```

use crate::error::{SqError, SqResult};

/// Positional parameter syntax of the target driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderFormat {
    /// Leave `?` markers (and `??` escapes) untouched.
    Question,
    /// `$1, $2, ...` (PostgreSQL, CockroachDB).
    #[default]
    Dollar,
    /// `:1, :2, ...` (Oracle).
    Colon,
    /// `@p1, @p2, ...` (SQL Server).
    AtP,
}

impl PlaceholderFormat {
    /// Rewrite every live `?` marker into this format.
    pub fn replace(self, sql: &str) -> SqResult<String> {
        self.replace_counted(sql).map(|(sql, _)| sql)
    }

    /// Rewrite and also return the number of live markers that were found.
    pub fn replace_counted(self, sql: &str) -> SqResult<(String, usize)> {
        let mut count = 0;
        let prefix = match self {
            PlaceholderFormat::Question => {
                let out = scan(sql, "??", |buf, i| {
                    count = i;
                    buf.push('?');
                    Ok(())
                })?;
                return Ok((out, count));
            }
            PlaceholderFormat::Dollar => "$",
            PlaceholderFormat::Colon => ":",
            PlaceholderFormat::AtP => "@p",
        };
        let out = scan(sql, "?", |buf, i| {
            count = i;
            buf.push_str(prefix);
            buf.push_str(&i.to_string());
            Ok(())
        })?;
        Ok((out, count))
    }
}

/// Returns `count` markers joined with commas: `?,?,?`.
pub fn placeholders(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(count * 2 - 1);
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}

/// Single left-to-right scan over `sql`.
///
/// `??` is written out as `escape`. Every other `?` is handed to `replace` together with
/// its 1-based position among live markers.
pub(crate) fn scan<F>(sql: &str, escape: &str, mut replace: F) -> SqResult<String>
where
    F: FnMut(&mut String, usize) -> SqResult<()>,
{
    let mut out = String::with_capacity(sql.len() + 8);
    let mut rest = sql;
    let mut idx = 0;

    while let Some(pos) = rest.find('?') {
        out.push_str(&rest[..pos]);
        if rest[pos..].starts_with("??") {
            out.push_str(escape);
            rest = &rest[pos + 2..];
        } else {
            idx += 1;
            replace(&mut out, idx)?;
            rest = &rest[pos + 1..];
        }
    }
    out.push_str(rest);
    Ok(out)
}

pub(crate) fn marker_overflow(idx: usize, available: usize) -> SqError {
    SqError::Placeholder(format!(
        "marker {} has no argument ({} supplied)",
        idx, available
    ))
}
