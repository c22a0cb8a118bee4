use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Platform assumed when the form leaves it blank.
pub const DEFAULT_PLATFORM: &str = "tiktok";
/// Region sent with every request and feedback record.
pub const DEFAULT_REGION: &str = "GL";
/// Number of graph examples requested from the service.
pub const TOP_K: u32 = 8;

/// Service settings read from `/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "API_URL", default, deserialize_with = "null_as_default")]
    pub api_url: String,
    #[serde(rename = "API_KEY", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key,
        }
    }

    /// The key, unless it is absent or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub platform: String,
    pub niche: String,
    #[serde(serialize_with = "serialize_metric")]
    pub impressions: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub reach: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub likes: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub shares: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub saves: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub comments: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub followers: Option<f64>,
    pub specialties: Vec<String>,
    pub use_graph: bool,
    pub top_k: u32,
    pub region: String,
}

// Whole counts go out as JSON integers so the service sees `1200`, not `1200.0`.
fn serialize_metric<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER => {
            serializer.serialize_i64(*v as i64)
        }
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

/// A recommendation as rendered.
///
/// Deserialization never fails on a JSON body: every field with a usable
/// shape is kept and mistyped ones come out empty. Scalars where text is
/// expected are taken as their JSON text (`2024` becomes `"2024"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RecommendationResponse {
    pub recommendation: String,
    pub reason: String,
    pub ideas: Vec<String>,
    pub hashtags_for_ideas: Vec<Vec<String>>,
    pub examples: Vec<Example>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list_of(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

// `null` and non-scalar entries are dropped.
fn texts_of(value: Option<Value>) -> Vec<String> {
    list_of(value).into_iter().filter_map(text_of).collect()
}

impl From<Value> for RecommendationResponse {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            recommendation: fields
                .remove("recommendation")
                .and_then(text_of)
                .unwrap_or_default(),
            reason: fields.remove("reason").and_then(text_of).unwrap_or_default(),
            ideas: texts_of(fields.remove("ideas")),
            hashtags_for_ideas: list_of(fields.remove("hashtags_for_ideas"))
                .into_iter()
                .map(|tags| texts_of(Some(tags)))
                .collect(),
            examples: list_of(fields.remove("examples"))
                .into_iter()
                .filter(Value::is_object)
                .map(Example::from)
                .collect(),
            diagnostics: fields.remove("diagnostics").filter(|d| !d.is_null()),
        }
    }
}

impl RecommendationResponse {
    /// Degenerate response for a successful reply whose body is not JSON.
    pub fn from_raw_text(text: impl Into<String>) -> Self {
        Self {
            recommendation: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Example {
    pub title: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub hashtags_for_examples: Vec<String>,
}

impl From<Value> for Example {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            title: fields.remove("title").and_then(text_of),
            video_id: fields.remove("videoId").and_then(text_of),
            url: fields.remove("url").and_then(text_of),
            published_at: fields.remove("publishedAt").and_then(text_of),
            hashtags_for_examples: texts_of(fields.remove("hashtags_for_examples")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeFeedback {
    pub niche: String,
    pub idea: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl LikeFeedback {
    pub fn new(niche: impl Into<String>, idea: impl Into<String>, specialties: Vec<String>) -> Self {
        Self {
            niche: niche.into(),
            idea: idea.into(),
            specialties,
            region: default_region(),
        }
    }
}
