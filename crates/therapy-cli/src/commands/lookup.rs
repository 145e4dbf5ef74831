//! `therapy lookup <term>`

use serde_json::json;
use therapy_core::config::TherapyConfig;
use therapy_core::errors::StorageError;
use therapy_storage::queries::concepts::get_concept;
use therapy_storage::queries::lookup::{find_by_term, MatchType};

use super::open_db;

fn match_name(m: MatchType) -> &'static str {
    match m {
        MatchType::ConceptId => "concept_id",
        MatchType::Label => "label",
        MatchType::TradeName => "trade_name",
        MatchType::Alias => "alias",
        MatchType::Xref => "xref",
        MatchType::Association => "associated_with",
        MatchType::RxBrand => "rx_brand",
    }
}

pub fn run(config: &TherapyConfig, term: &str, as_json: bool) -> anyhow::Result<()> {
    let db = open_db(config)?;
    let results = db.with_reader(|conn| {
        let mut results = Vec::new();
        for hit in find_by_term(conn, term)? {
            if let Some(record) = get_concept(conn, &hit.concept_id)? {
                results.push((hit.match_type, record));
            }
        }
        Ok::<_, StorageError>(results)
    })?;

    if as_json {
        let rows: Vec<_> = results
            .iter()
            .map(|(m, record)| json!({ "match_type": match_name(*m), "record": record }))
            .collect();
        println!("{}", serde_json::Value::Array(rows));
        return Ok(());
    }

    if results.is_empty() {
        println!("no concepts match {term:?}");
    }
    for (m, record) in &results {
        println!(
            "{:<24} {:<12} {}",
            record.concept_id,
            match_name(*m),
            record.label.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
