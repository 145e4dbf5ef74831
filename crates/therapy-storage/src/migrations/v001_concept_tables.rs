//! V001: therapy_concepts, its six child tables and therapy_sources.
//! Child tables are created without foreign keys; V002 attaches them.

use rusqlite::Connection;
use therapy_core::errors::StorageError;

pub const MIGRATION_SQL: &str = r#"
-- Canonical therapeutic concepts. concept_id is a CURIE such as rxcui:2555.
CREATE TABLE IF NOT EXISTS therapy_concepts (
    concept_id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    label TEXT,
    approval_status TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_concepts_source
    ON therapy_concepts(source);
CREATE INDEX IF NOT EXISTS idx_therapy_concepts_label
    ON therapy_concepts(lower(label)) WHERE label IS NOT NULL;

CREATE TABLE IF NOT EXISTS therapy_aliases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    alias TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_aliases_concept ON therapy_aliases(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_aliases_alias ON therapy_aliases(lower(alias));

-- Identifiers outside the normalizer sources (ATC, MeSH, PubChem, ...).
CREATE TABLE IF NOT EXISTS therapy_associations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    associated_with TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_associations_concept
    ON therapy_associations(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_associations_value
    ON therapy_associations(lower(associated_with));

CREATE TABLE IF NOT EXISTS therapy_labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_labels_concept ON therapy_labels(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_labels_label ON therapy_labels(lower(label));

CREATE TABLE IF NOT EXISTS therapy_trade_names (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trade_name TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_trade_names_concept
    ON therapy_trade_names(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_trade_names_value
    ON therapy_trade_names(lower(trade_name));

-- Concept ids in other normalizer sources.
CREATE TABLE IF NOT EXISTS therapy_xrefs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    xref TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_xrefs_concept ON therapy_xrefs(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_xrefs_xref ON therapy_xrefs(lower(xref));

-- RxNorm brand-name concepts (BN) whose trade name maps to this concept.
CREATE TABLE IF NOT EXISTS therapy_rx_brand_ids (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rxcui TEXT NOT NULL,
    concept_id TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_therapy_rx_brand_ids_concept
    ON therapy_rx_brand_ids(concept_id);
CREATE INDEX IF NOT EXISTS idx_therapy_rx_brand_ids_rxcui
    ON therapy_rx_brand_ids(lower(rxcui));

CREATE TABLE IF NOT EXISTS therapy_sources (
    name TEXT PRIMARY KEY,
    data_license TEXT NOT NULL,
    data_license_url TEXT NOT NULL,
    version TEXT NOT NULL,
    data_url TEXT,
    rdp_url TEXT,
    non_commercial INTEGER NOT NULL DEFAULT 0,
    share_alike INTEGER NOT NULL DEFAULT 0,
    attribution INTEGER NOT NULL DEFAULT 0
) STRICT;
"#;

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(MIGRATION_SQL).map_err(StorageError::from)
}
