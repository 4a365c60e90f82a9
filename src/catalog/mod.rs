//! Catalog record model and the hand-authored Windo catalogs.
//!
//! Each catalog is a fixed literal list of records compiled into the
//! binary; the store is brought into agreement with it, never the other
//! way around.

mod agents;
mod gifts;
mod packages;
mod wheel_prizes;

use crate::sync::DependentSpec;
use serde_json::Value;

/// A single catalog entity: a stable identifier plus an ordered list of
/// attribute columns. Ids are chosen by the catalog author, never
/// generated by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    id: String,
    attributes: Vec<(String, Value)>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &[(String, Value)] {
        &self.attributes
    }
}

/// An ordered sequence of records destined for one store table. Order
/// defines seed/display order only, not semantics.
#[derive(Debug, Clone)]
pub struct Catalog {
    table: &'static str,
    records: Vec<CatalogRecord>,
}

impl Catalog {
    pub fn new(table: &'static str, records: Vec<CatalogRecord>) -> Self {
        Self { table, records }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// First id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .find(|record| !seen.insert(record.id()))
            .map(|record| record.id())
    }
}

/// A catalog together with the dependent tables that must be purged, in
/// order, before its rows can be deleted during a replace sync.
pub struct SeedCatalog {
    pub catalog: Catalog,
    pub dependents: &'static [DependentSpec],
}

/// Tables referencing `gifts.id`; purged first during a gifts replace.
pub const GIFT_DEPENDENTS: &[DependentSpec] = &[DependentSpec {
    table: "gift_messages",
    parent_column: "gift_id",
}];

/// Every Windo catalog, in seed order. The catalogs are mutually
/// independent and may be synchronized in any relative order.
pub fn all_catalogs() -> Vec<SeedCatalog> {
    vec![
        SeedCatalog {
            catalog: gifts::catalog(),
            dependents: GIFT_DEPENDENTS,
        },
        SeedCatalog {
            catalog: wheel_prizes::catalog(),
            dependents: &[],
        },
        SeedCatalog {
            catalog: agents::catalog(),
            dependents: &[],
        },
        SeedCatalog {
            catalog: packages::catalog(),
            dependents: &[],
        },
    ]
}
