//! Filter tokens: a URL-safe encoding of a filter set for shareable links.
//!
//! A token is the base64url (no padding) encoding of a JSON object mapping
//! filter keys to values. Presentation-only keys are left out.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use log::{debug, warn};
use serde_json::{Map, Value};

use super::schema::FilterSchema;
use super::value::{FilterPatch, FilterSet, FilterValue, MergeReport};
use crate::error::DecodeError;

/// Encode the query part of `filters` as a token.
pub fn encode(filters: &FilterSet) -> String {
    let object = to_json_object(filters);
    // Serializing a map of plain JSON values cannot fail
    let json = Value::Object(object).to_string();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// The canonical JSON object behind a token, also used as a request body
/// for field transport.
pub fn to_json_object(filters: &FilterSet) -> Map<String, Value> {
    filters
        .query_fields()
        .map(|(spec, value)| (spec.key.to_string(), value.to_json()))
        .collect()
}

/// Decode a token into a complete filter set (missing keys get defaults).
pub fn decode(
    schema: &'static FilterSchema,
    token: &str,
) -> Result<FilterSet, DecodeError> {
    let patch = decode_patch(schema, token)?;
    let mut filters = FilterSet::new(schema);
    filters.apply(patch);
    Ok(filters)
}

/// Decode a token into just the entries it carries.
///
/// Unknown keys and presentation keys are skipped. A known key holding the
/// wrong type rejects the whole token.
pub fn decode_patch(
    schema: &'static FilterSchema,
    token: &str,
) -> Result<FilterPatch, DecodeError> {
    let bytes = decode_base64(token.trim())?;
    let value: Value = serde_json::from_slice(&bytes)?;
    let Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let mut patch = FilterPatch::default();
    for (key, raw) in &object {
        let Some(spec) = schema.field(key) else {
            debug!(
                "[FilterCodec] Ignoring unknown {} filter `{}`",
                schema.resource, key
            );
            continue;
        };
        if spec.presentation {
            continue;
        }
        patch.entries.push((spec.key, FilterValue::from_json(spec, raw)?));
    }
    Ok(patch)
}

// Links minted by older clients used the padded and/or standard alphabet.
fn decode_base64(token: &str) -> Result<Vec<u8>, DecodeError> {
    match URL_SAFE_NO_PAD.decode(token) {
        Ok(bytes) => Ok(bytes),
        Err(first) => URL_SAFE
            .decode(token)
            .or_else(|_| STANDARD.decode(token))
            .map_err(|_| DecodeError::Base64(first)),
    }
}

/// Merge individually supplied fields into `filters`, one key at a time.
///
/// Fields that fail to coerce keep their previous value and are reported
/// as rejected; the remaining fields still apply.
pub fn merge_fields(filters: &mut FilterSet, fields: &Map<String, Value>) -> MergeReport {
    let schema = filters.schema();
    let mut report = MergeReport::default();

    for (key, raw) in fields {
        let Some(spec) = schema.field(key) else {
            debug!(
                "[FilterCodec] Ignoring unknown {} filter field `{}`",
                schema.resource, key
            );
            report.ignored.push(key.clone());
            continue;
        };

        match FilterValue::coerce(spec, raw).and_then(|v| filters.set(spec.key, v)) {
            Ok(()) => report.applied.push(spec.key),
            Err(err) => {
                warn!("[FilterCodec] Keeping previous `{}`: {}", key, err);
                report.rejected.push(key.clone());
            }
        }
    }
    report
}
