//! Taxonomy enrichment of predicted species names.
//!
//! Lookups are best-effort: an unreachable or unhelpful backend yields `None`
//! and never fails a prediction.

mod gbif;

pub use gbif::GbifClient;

use async_trait::async_trait;
use serde::Serialize;

/// Taxonomic facts about a species name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxonRecord {
    /// Accepted scientific name.
    pub scientific_name: Option<String>,
    /// Taxonomic rank (`SPECIES`, `GENUS`, ...).
    pub rank: Option<String>,
    /// Common name in the configured language.
    pub vernacular_name: Option<String>,
}

/// Resolves a predicted label to taxonomic information.
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    /// Look up `name`; `None` when nothing is known or the backend failed.
    async fn lookup(&self, name: &str) -> Option<TaxonRecord>;
}

/// Lookup used when enrichment is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTaxonomy;

#[async_trait]
impl TaxonomyLookup for NoTaxonomy {
    async fn lookup(&self, _name: &str) -> Option<TaxonRecord> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_taxonomy_is_always_absent() {
        assert!(NoTaxonomy.lookup("Apis mellifera").await.is_none());
    }
}
