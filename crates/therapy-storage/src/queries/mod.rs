//! Typed queries over the concept tables.

pub mod children;
pub mod concepts;
pub mod load;
pub mod lookup;
pub mod sources;

use std::fmt;

/// The six tables whose rows hang off a `therapy_concepts` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildTable {
    Aliases,
    Associations,
    Labels,
    TradeNames,
    Xrefs,
    RxBrandIds,
}

impl ChildTable {
    pub const ALL: [ChildTable; 6] = [
        ChildTable::Aliases,
        ChildTable::Associations,
        ChildTable::Labels,
        ChildTable::TradeNames,
        ChildTable::Xrefs,
        ChildTable::RxBrandIds,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ChildTable::Aliases => "therapy_aliases",
            ChildTable::Associations => "therapy_associations",
            ChildTable::Labels => "therapy_labels",
            ChildTable::TradeNames => "therapy_trade_names",
            ChildTable::Xrefs => "therapy_xrefs",
            ChildTable::RxBrandIds => "therapy_rx_brand_ids",
        }
    }

    /// The column holding the row's value.
    pub fn value_column(&self) -> &'static str {
        match self {
            ChildTable::Aliases => "alias",
            ChildTable::Associations => "associated_with",
            ChildTable::Labels => "label",
            ChildTable::TradeNames => "trade_name",
            ChildTable::Xrefs => "xref",
            ChildTable::RxBrandIds => "rxcui",
        }
    }
}

impl fmt::Display for ChildTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
