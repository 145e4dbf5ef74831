//! Case-insensitive term lookup across the concept tables.

use std::collections::HashSet;

use rusqlite::{params, Connection};
use therapy_core::errors::StorageError;

use super::ChildTable;

/// How a term matched a concept. Earlier variants are stronger matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchType {
    ConceptId,
    Label,
    TradeName,
    Alias,
    Xref,
    Association,
    RxBrand,
}

impl MatchType {
    fn child_table(&self) -> Option<ChildTable> {
        match self {
            MatchType::ConceptId => None,
            MatchType::Label => Some(ChildTable::Labels),
            MatchType::TradeName => Some(ChildTable::TradeNames),
            MatchType::Alias => Some(ChildTable::Aliases),
            MatchType::Xref => Some(ChildTable::Xrefs),
            MatchType::Association => Some(ChildTable::Associations),
            MatchType::RxBrand => Some(ChildTable::RxBrandIds),
        }
    }
}

const PRECEDENCE: [MatchType; 7] = [
    MatchType::ConceptId,
    MatchType::Label,
    MatchType::TradeName,
    MatchType::Alias,
    MatchType::Xref,
    MatchType::Association,
    MatchType::RxBrand,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    pub concept_id: String,
    pub match_type: MatchType,
}

/// All concepts matching `term`, strongest match first. A concept appears
/// once, under its strongest match.
pub fn find_by_term(conn: &Connection, term: &str) -> Result<Vec<TermMatch>, StorageError> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for match_type in PRECEDENCE {
        for concept_id in concepts_matching(conn, match_type, term)? {
            if seen.insert(concept_id.clone()) {
                matches.push(TermMatch {
                    concept_id,
                    match_type,
                });
            }
        }
    }
    tracing::debug!(term, hits = matches.len(), "term lookup");
    Ok(matches)
}

fn concepts_matching(
    conn: &Connection,
    match_type: MatchType,
    term: &str,
) -> Result<Vec<String>, StorageError> {
    let sql = match match_type.child_table() {
        None => "SELECT concept_id FROM therapy_concepts
                 WHERE lower(concept_id) = lower(?1) ORDER BY concept_id"
            .to_string(),
        Some(table) => format!(
            "SELECT DISTINCT concept_id FROM {} WHERE lower({}) = lower(?1) ORDER BY concept_id",
            table.table(),
            table.value_column()
        ),
    };
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![term], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}
