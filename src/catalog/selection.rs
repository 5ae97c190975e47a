//! Per-asset selection rules: which assets are exported and which of their
//! metrics are requested.

use crate::{AssetCatalogEntry, DAILY_FREQUENCY, REFERENCE_RATE_PREFIX};

/// Decide whether an asset is left out of the export entirely.
///
/// An asset is omitted when its catalog entry lists no metrics, or when every
/// listed metric is a `ReferenceRate*` price reference.
pub fn should_omit_asset(entry: &AssetCatalogEntry) -> bool {
    entry
        .metrics()
        .iter()
        .all(|m| m.metric.starts_with(REFERENCE_RATE_PREFIX))
}

/// Metric identifiers of an asset that are published at daily frequency,
/// in catalog order.
///
/// The result may be empty: such an asset stays in the index but is skipped
/// when its turn comes.
pub fn daily_metric_ids(entry: &AssetCatalogEntry) -> Vec<String> {
    entry
        .metrics()
        .iter()
        .filter(|m| m.supports(DAILY_FREQUENCY))
        .map(|m| m.metric.clone())
        .collect()
}
