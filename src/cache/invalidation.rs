//! Related-namespace table used by prefix invalidation.

use std::collections::HashMap;

use super::keys::namespaces;

/// Immutable map from a namespace to the namespaces cleared alongside it.
///
/// Lookups are one level deep: the related namespaces of a related namespace
/// are not followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationMap {
    related: HashMap<String, Vec<String>>,
}

impl InvalidationMap {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            related: entries
                .into_iter()
                .map(|(namespace, related)| {
                    (
                        namespace.into(),
                        related.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            related: HashMap::new(),
        }
    }

    /// Namespaces related to `namespace`; empty when it has no entry.
    pub fn related(&self, namespace: &str) -> &[String] {
        self.related
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for InvalidationMap {
    /// Every domain module invalidates the dashboard.
    fn default() -> Self {
        Self::new(
            [
                namespaces::PRODUCERS,
                namespaces::FARMS,
                namespaces::CROPS,
                namespaces::HARVESTS,
                namespaces::FARM_CROPS,
            ]
            .map(|namespace| (namespace, vec![namespaces::DASHBOARD])),
        )
    }
}
