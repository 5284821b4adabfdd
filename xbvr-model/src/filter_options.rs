use crate::files::Volume;

/// Facet vocabularies used to populate filter pickers.
///
/// Each resource fills the subset it supports; the rest stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterOptions {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub cast: Vec<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub sites: Vec<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub tags: Vec<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub attributes: Vec<String>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub volumes: Vec<Volume>,
    #[cfg_attr(feature = "serde", serde(rename = "release_month"))]
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_util::null_default"))]
    pub release_months: Vec<String>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.cast.is_empty()
            && self.sites.is_empty()
            && self.tags.is_empty()
            && self.attributes.is_empty()
            && self.volumes.is_empty()
            && self.release_months.is_empty()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn empty_facets_sent_as_null_decode() {
        let options: FilterOptions = serde_json::from_value(serde_json::json!({
            "cast": ["A"],
            "sites": null,
            "tags": null,
            "release_month": ["2024-01"]
        }))
        .expect("options with null facets");

        assert_eq!(options.cast, vec!["A".to_string()]);
        assert!(options.sites.is_empty());
        assert!(options.tags.is_empty());
        assert!(!options.is_empty());
    }
}
