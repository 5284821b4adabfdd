//! Closed filter schemas, one per resource.
//!
//! Every filter a collection view understands is listed here together with
//! its type and default. Anything not listed is not a filter.

use super::value::FilterValue;

/// Shape of a filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Range,
    Flag,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::List => "a list of strings",
            FieldKind::Range => "a [min, max] pair of integers",
            FieldKind::Flag => "a boolean",
        }
    }
}

/// Compile-time default of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    List(&'static [&'static str]),
    Range(i64, i64),
    Flag(bool),
}

impl DefaultValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            DefaultValue::Text(_) => FieldKind::Text,
            DefaultValue::List(_) => FieldKind::List,
            DefaultValue::Range(..) => FieldKind::Range,
            DefaultValue::Flag(_) => FieldKind::Flag,
        }
    }

    pub fn to_value(&self) -> FilterValue {
        match *self {
            DefaultValue::Text(s) => FilterValue::Text(s.to_string()),
            DefaultValue::List(items) => {
                FilterValue::List(items.iter().map(|s| s.to_string()).collect())
            }
            DefaultValue::Range(min, max) => FilterValue::Range(min, max),
            DefaultValue::Flag(b) => FilterValue::Flag(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key used in filter tokens and by callers
    pub key: &'static str,
    /// Name used when the filter travels as an individual request field
    pub wire: &'static str,
    pub default: DefaultValue,
    /// Display preference; never serialized or sent to the server
    pub presentation: bool,
}

impl FieldSpec {
    pub const fn new(
        key: &'static str,
        wire: &'static str,
        default: DefaultValue,
    ) -> Self {
        Self {
            key,
            wire,
            default,
            presentation: false,
        }
    }

    pub const fn presentation(key: &'static str, default: DefaultValue) -> Self {
        Self {
            key,
            wire: key,
            default,
            presentation: true,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.default.kind()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FilterSchema {
    pub resource: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FilterSchema {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }
}

/// Key of the card size preference shared by every schema
pub const CARD_SIZE: &str = "cardSize";

pub static SCENE_FILTERS: FilterSchema = FilterSchema {
    resource: "scenes",
    fields: &[
        FieldSpec::new("dlState", "dl_state", DefaultValue::Text("available")),
        FieldSpec::new("isAvailable", "is_available", DefaultValue::Flag(true)),
        FieldSpec::new("isAccessible", "is_accessible", DefaultValue::Flag(true)),
        // "", "1" or "0": any, watched, unwatched
        FieldSpec::new("isWatched", "is_watched", DefaultValue::Text("")),
        FieldSpec::new("releaseMonth", "released", DefaultValue::Text("")),
        FieldSpec::new("cast", "cast", DefaultValue::List(&[])),
        FieldSpec::new("sites", "sites", DefaultValue::List(&[])),
        FieldSpec::new("tags", "tags", DefaultValue::List(&[])),
        FieldSpec::new("cuepoint", "cuepoint", DefaultValue::List(&[])),
        FieldSpec::new("lists", "lists", DefaultValue::List(&[])),
        FieldSpec::new("volume", "volume", DefaultValue::Text("")),
        // Minutes; an upper bound of 0 leaves the range open
        FieldSpec::new("duration", "duration", DefaultValue::Range(0, 0)),
        FieldSpec::new("sort", "sort", DefaultValue::Text("release_desc")),
        FieldSpec::presentation(CARD_SIZE, DefaultValue::Text("1")),
    ],
};

pub static ACTOR_FILTERS: FilterSchema = FilterSchema {
    resource: "actors",
    fields: &[
        FieldSpec::new("sort", "sort", DefaultValue::Text("name_asc")),
        FieldSpec::new("cast", "cast", DefaultValue::List(&[])),
        FieldSpec::new("sites", "sites", DefaultValue::List(&[])),
        FieldSpec::new("attributes", "attributes", DefaultValue::List(&[])),
        FieldSpec::new("lists", "lists", DefaultValue::List(&[])),
        FieldSpec::new("age", "age", DefaultValue::Range(18, 100)),
        FieldSpec::presentation(CARD_SIZE, DefaultValue::Text("1")),
    ],
};

pub static FILE_FILTERS: FilterSchema = FilterSchema {
    resource: "files",
    fields: &[
        FieldSpec::new("state", "state", DefaultValue::Text("unmatched")),
        FieldSpec::new("sort", "sort", DefaultValue::Text("created_time_desc")),
        FieldSpec::new("volume", "volume", DefaultValue::Text("")),
        FieldSpec::presentation(CARD_SIZE, DefaultValue::Text("1")),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_within_each_schema() {
        for schema in [&SCENE_FILTERS, &ACTOR_FILTERS, &FILE_FILTERS] {
            for (i, field) in schema.fields.iter().enumerate() {
                assert_eq!(
                    schema.position(field.key),
                    Some(i),
                    "duplicate key {} in {}",
                    field.key,
                    schema.resource
                );
            }
        }
    }

    #[test]
    fn every_schema_has_exactly_one_presentation_key() {
        for schema in [&SCENE_FILTERS, &ACTOR_FILTERS, &FILE_FILTERS] {
            let presentation: Vec<_> = schema
                .fields
                .iter()
                .filter(|f| f.presentation)
                .map(|f| f.key)
                .collect();
            assert_eq!(presentation, vec![CARD_SIZE]);
        }
    }
}
