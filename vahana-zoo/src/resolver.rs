//! Criteria resolution against a catalog
//!
//! Resolution is a pure lookup: deterministic for an unchanged catalog,
//! no side effects. Zero matches and multiple matches are both hard
//! errors; the resolver never silently picks one of several candidates.

use crate::catalog::{Catalog, ModelReference};
use crate::criteria::Criteria;
use tracing::debug;
use vahana_core::error::{Result, ZooError};

/// Resolve `criteria` to exactly one model in `catalog`.
///
/// Unrecognized attribute names are rejected so caller typos surface as
/// themselves instead of as a generic no-match.
pub fn resolve(catalog: &dyn Catalog, criteria: &Criteria) -> Result<ModelReference> {
    let known = catalog.attribute_names();
    for key in criteria.keys() {
        if !known.contains(key) {
            return Err(ZooError::UnknownAttribute {
                attribute: key.to_string(),
                known: known
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }

    let matches = catalog.lookup(criteria);
    debug!(
        "resolved {} candidate(s) for {} criteria {}",
        matches.len(),
        catalog.engine(),
        criteria
    );

    match matches.len() {
        0 => Err(ZooError::ModelNotFound {
            engine: catalog.engine().to_string(),
            criteria: criteria.to_string(),
        }),
        1 => Ok(matches[0].clone()),
        count => Err(ZooError::AmbiguousCriteria {
            engine: catalog.engine().to_string(),
            criteria: criteria.to_string(),
            count,
            candidates: matches
                .iter()
                .map(|m| format!("{} {}", m.name, m.attributes))
                .collect::<Vec<_>>()
                .join("; "),
        }),
    }
}
