use std::collections::BTreeMap;

/// Opaque per-resource counters returned alongside a list page
/// (`count_available`, `count_hidden`, ...), keyed by their wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourceCounts(pub BTreeMap<String, u64>);

impl ResourceCounts {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u64) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One batch of items from a list fetch plus its pagination metadata.
///
/// `offset` is the position that was requested, `limit` the page size that
/// was asked for. The server may return fewer than `limit` items.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u64,
    pub total: u64,
    pub limit: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counts: ResourceCounts,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, offset: u64, total: u64, limit: u64) -> Self {
        Self {
            items,
            offset,
            total,
            limit,
            counts: ResourceCounts::default(),
        }
    }

    pub fn with_counts(mut self, counts: ResourceCounts) -> Self {
        self.counts = counts;
        self
    }
}
