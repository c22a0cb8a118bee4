//! Form input normalization.
//!
//! Everything here is a pure function of its input: the same form state
//! always yields the same request and the same serialized payload.

use crate::types::{RecommendationRequest, DEFAULT_PLATFORM, DEFAULT_REGION, TOP_K};
use crate::CoreError;
use serde_json::{Map, Value};

/// Raw values of the named form inputs, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub platform: String,
    pub niche: String,
    pub impressions: String,
    pub reach: String,
    pub likes: String,
    pub shares: String,
    pub saves: String,
    pub comments: String,
    pub followers: String,
    pub specialties: String,
}

/// Parses a numeric form value. Blank and non-finite input yields `None`.
pub fn to_number_or_null(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Splits a comma separated list, trimming entries and dropping blanks and
/// repeats. First occurrence wins.
pub fn parse_specialties(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|seen| seen == entry) {
            out.push(entry.to_string());
        }
    }
    out
}

/// Drops `null` values and empty arrays.
pub fn clean_payload(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
        .collect()
}

pub fn form_to_request(fields: &FormFields) -> RecommendationRequest {
    let platform = fields.platform.trim();

    RecommendationRequest {
        platform: if platform.is_empty() {
            DEFAULT_PLATFORM.to_string()
        } else {
            platform.to_string()
        },
        niche: fields.niche.clone(),
        impressions: to_number_or_null(&fields.impressions),
        reach: to_number_or_null(&fields.reach),
        likes: to_number_or_null(&fields.likes),
        shares: to_number_or_null(&fields.shares),
        saves: to_number_or_null(&fields.saves),
        comments: to_number_or_null(&fields.comments),
        followers: to_number_or_null(&fields.followers),
        specialties: parse_specialties(&fields.specialties),
        use_graph: true,
        top_k: TOP_K,
        region: DEFAULT_REGION.to_string(),
    }
}

impl RecommendationRequest {
    /// The flat JSON object sent to the service, without empty values.
    pub fn payload(&self) -> Result<Value, CoreError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(Value::Object(clean_payload(map))),
            other => Err(CoreError::Internal {
                message: format!("request serialized to a non-object value: {}", other),
            }),
        }
    }
}
