//! Filter sets, their per-resource schemas, and the shareable token codec.

pub mod codec;
pub mod schema;
pub mod value;

pub use codec::{decode, decode_patch, encode, merge_fields, to_json_object};
pub use schema::{
    ACTOR_FILTERS, CARD_SIZE, DefaultValue, FILE_FILTERS, FieldKind, FieldSpec,
    FilterSchema, SCENE_FILTERS,
};
pub use value::{FilterPatch, FilterSet, FilterValue, MergeReport};
