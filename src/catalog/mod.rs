//! Asset index built from the remote catalog
//!
//! The index holds every catalog entry that survives [`should_omit_asset`],
//! keyed by asset identifier, together with the sorted list of identifiers
//! used as the default processing order.

use crate::AssetCatalogEntry;
use std::collections::HashMap;
use tracing::debug;

pub mod selection;

pub use selection::{daily_metric_ids, should_omit_asset};

/// Retained catalog entries, keyed by asset identifier.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    entries: HashMap<String, AssetCatalogEntry>,
    asset_ids: Vec<String>,
}

impl AssetIndex {
    /// Build the index from the raw catalog.
    ///
    /// Omitted assets are dropped with a verbose trace. If the catalog lists
    /// an asset twice, the later entry wins.
    pub fn build(catalog: Vec<AssetCatalogEntry>) -> Self {
        let mut entries = HashMap::with_capacity(catalog.len());
        let mut asset_ids = Vec::with_capacity(catalog.len());

        for entry in catalog {
            if should_omit_asset(&entry) {
                debug!("Omitting {}", entry.asset);
                continue;
            }
            let asset = entry.asset.clone();
            if entries.insert(asset.clone(), entry).is_none() {
                asset_ids.push(asset);
            }
        }
        asset_ids.sort();

        Self { entries, asset_ids }
    }

    /// Look up a retained asset.
    pub fn get(&self, asset: &str) -> Option<&AssetCatalogEntry> {
        self.entries.get(asset)
    }

    /// Retained asset identifiers in sorted order.
    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    /// Number of retained assets.
    pub fn len(&self) -> usize {
        self.asset_ids.len()
    }

    /// Whether no asset was retained.
    pub fn is_empty(&self) -> bool {
        self.asset_ids.is_empty()
    }

    /// Order in which assets are processed.
    ///
    /// An explicit restriction list is used verbatim, in the caller's order;
    /// otherwise all retained assets are processed in sorted order.
    pub fn processing_order(&self, restriction: Option<&[String]>) -> Vec<String> {
        match restriction {
            Some(list) => list.to_vec(),
            None => self.asset_ids.clone(),
        }
    }
}
