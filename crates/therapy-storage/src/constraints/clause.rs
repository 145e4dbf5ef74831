//! Text surgery on stored `CREATE TABLE` statements.
//!
//! Only the outer column/constraint list is touched. Parentheses are tracked
//! so that nested lists (`FOREIGN KEY (a)`, `CHECK (x > 0)`) are skipped.

const KEYWORD: &[u8] = b"constraint";

/// Byte range of the `CONSTRAINT <name> ...` clause, if present.
/// String literals and quoted identifiers are skipped.
pub fn find_constraint(create_sql: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = create_sql.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'[' => quote = Some(b']'),
            _ if is_keyword_at(bytes, i) => {
                let after_keyword = i + KEYWORD.len();
                if let Some((ident, _)) = read_identifier(create_sql, after_keyword) {
                    if ident.eq_ignore_ascii_case(name) {
                        return Some((i, clause_end(create_sql, after_keyword)));
                    }
                }
                i = after_keyword;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn is_keyword_at(bytes: &[u8], i: usize) -> bool {
    let boundary_before = i == 0 || !is_ident_byte(bytes[i - 1]);
    let word = bytes
        .get(i..i + KEYWORD.len())
        .is_some_and(|w| w.eq_ignore_ascii_case(KEYWORD));
    let boundary_after = bytes
        .get(i + KEYWORD.len())
        .is_some_and(|b| b.is_ascii_whitespace());
    boundary_before && word && boundary_after
}

/// Append `clause` as the last entry of the table's definition list.
pub fn with_constraint(create_sql: &str, clause: &str) -> String {
    let close = body_close(create_sql);
    let head = create_sql[..close].trim_end();
    format!("{head},\n    {clause}\n{}", &create_sql[close..])
}

/// Remove the named constraint clause along with its separating comma.
/// None if the clause is not present.
pub fn without_constraint(create_sql: &str, name: &str) -> Option<String> {
    let (start, end) = find_constraint(create_sql, name)?;
    let before = &create_sql[..start];
    let after = &create_sql[end..];

    let trimmed_before = before.trim_end();
    if let Some(stripped) = trimmed_before.strip_suffix(',') {
        // Clause was not first: drop the comma before it.
        Some(format!("{}{}", stripped.trim_end(), leading_break(after)))
    } else {
        // Clause was first in the list: drop the comma after it.
        let rest = after.trim_start();
        let rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        Some(format!("{}{}", before, rest))
    }
}

/// Replace the table name in a `CREATE TABLE name (...)` statement.
pub fn rename_table(create_sql: &str, new_name: &str) -> String {
    let open = create_sql.find('(').unwrap_or(create_sql.len());
    format!(
        "CREATE TABLE {} {}",
        super::catalog::quote_ident(new_name),
        &create_sql[open..]
    )
}

fn leading_break(after: &str) -> String {
    if after.trim_start().starts_with(')') {
        format!("\n{}", after.trim_start())
    } else {
        after.to_string()
    }
}

/// Index of the `)` closing the definition list.
fn body_close(create_sql: &str) -> usize {
    create_sql.rfind(')').unwrap_or(create_sql.len())
}

/// End of a clause: the next top-level `,` or the `)` closing the list.
fn clause_end(sql: &str, from: usize) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in sql.as_bytes().iter().enumerate().skip(from) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'[' => quote = Some(b']'),
            b'(' => depth += 1,
            b')' if depth == 0 => return i,
            b')' => depth -= 1,
            b',' if depth == 0 => return i,
            _ => {}
        }
    }
    sql.len()
}

/// Read a possibly-quoted identifier starting at or after `from`.
fn read_identifier(sql: &str, from: usize) -> Option<(String, usize)> {
    let bytes = sql.as_bytes();
    let mut i = from;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let first = *bytes.get(i)?;
    let close = match first {
        b'"' => Some(b'"'),
        b'`' => Some(b'`'),
        b'[' => Some(b']'),
        _ => None,
    };
    if let Some(close) = close {
        let start = i + 1;
        let len = sql[start..].find(close as char)?;
        return Some((sql[start..start + len].to_string(), start + len + 1));
    }
    let start = i;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    (i > start).then(|| (sql[start..i].to_string(), i))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "CREATE TABLE therapy_aliases (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    alias TEXT NOT NULL,\n    concept_id TEXT NOT NULL\n) STRICT";
    const CLAUSE: &str = "CONSTRAINT therapy_aliases_concept_id_fkey FOREIGN KEY (concept_id) REFERENCES therapy_concepts (concept_id)";

    #[test]
    fn add_then_find() {
        let sql = with_constraint(TABLE, CLAUSE);
        assert!(sql.ends_with(") STRICT"));
        let (start, end) = find_constraint(&sql, "therapy_aliases_concept_id_fkey").unwrap();
        assert_eq!(&sql[start..end].trim_end(), &CLAUSE);
    }

    #[test]
    fn add_then_remove_restores_columns() {
        let sql = with_constraint(TABLE, CLAUSE);
        let back = without_constraint(&sql, "therapy_aliases_concept_id_fkey").unwrap();
        assert!(find_constraint(&back, "therapy_aliases_concept_id_fkey").is_none());
        assert!(back.contains("concept_id TEXT NOT NULL"));
        assert!(back.trim_end().ends_with(") STRICT"));
        assert!(!back.contains(",\n)"));
    }

    #[test]
    fn name_match_is_exact() {
        let sql = with_constraint(TABLE, CLAUSE);
        assert!(find_constraint(&sql, "therapy_aliases_concept_id").is_none());
        assert!(find_constraint(TABLE, "therapy_aliases_concept_id_fkey").is_none());
    }

    #[test]
    fn quoted_names_are_found() {
        let sql = "CREATE TABLE t (a TEXT, CONSTRAINT \"t_a_fkey\" FOREIGN KEY (a) REFERENCES p (a))";
        let (start, end) = find_constraint(sql, "t_a_fkey").unwrap();
        assert_eq!(&sql[end..], ")");
        assert!(sql[start..].starts_with("CONSTRAINT"));
    }

    #[test]
    fn keyword_inside_literal_does_not_hide_later_clause() {
        let sql = "CREATE TABLE t (a TEXT CHECK (a <> 'constraint ('), \
                   CONSTRAINT t_a_fkey FOREIGN KEY (a) REFERENCES p (a))";
        let (start, end) = find_constraint(sql, "t_a_fkey").unwrap();
        assert_eq!(
            &sql[start..end],
            "CONSTRAINT t_a_fkey FOREIGN KEY (a) REFERENCES p (a)"
        );
    }

    #[test]
    fn keyword_without_name_is_passed_over() {
        let sql = "CREATE TABLE t (a TEXT CONSTRAINT (x), CONSTRAINT c1 CHECK (a <> ''))";
        let (start, _) = find_constraint(sql, "c1").unwrap();
        assert!(sql[start..].starts_with("CONSTRAINT c1"));
        assert!(find_constraint("CREATE TABLE t (note TEXT DEFAULT 'constraint c1')", "c1").is_none());
    }

    #[test]
    fn first_clause_removal_drops_following_comma() {
        let sql = "CREATE TABLE t (CONSTRAINT c1 CHECK (a > 0), a INTEGER)";
        let back = without_constraint(sql, "c1").unwrap();
        assert_eq!(back, "CREATE TABLE t (a INTEGER)");
    }

    #[test]
    fn rename_replaces_header() {
        let renamed = rename_table("CREATE TABLE \"therapy_xrefs\" (id INTEGER)", "tmp");
        assert_eq!(renamed, "CREATE TABLE \"tmp\" (id INTEGER)");
    }
}
