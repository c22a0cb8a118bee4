//! Turns a recommendation response into the content of the result panel.
//!
//! Nothing in here touches widgets. The view rebuilds every region from a
//! [`RenderedOutput`] on each frame, so rendering the same response twice
//! gives the same screen.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use scriptify_core::{Example, RecommendationResponse};
use std::fmt::Display;
use url::form_urlencoded;

pub const EMPTY_TEXT: &str = "—";
pub const NO_HASHTAGS: &str = "Sin hashtags sugeridos";
pub const EXAMPLE_TITLE: &str = "Ejemplo";

const YOUTUBE_WATCH: &str = "https://www.youtube.com/watch";
const PUBLISHED_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";
const NAIVE_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub recommendation: String,
    pub reason: String,
    pub ideas: Vec<String>,
    pub hashtags: HashtagList,
    pub examples: Vec<ExampleCard>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HashtagList {
    Tags(Vec<String>),
    Placeholder(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleCard {
    pub title: String,
    /// Video link; `None` renders the title as plain text.
    pub link: Option<String>,
    pub meta: String,
    pub hashtags: Vec<String>,
}

/// Renders with timestamps in the local time zone.
pub fn render_output(response: &RecommendationResponse) -> RenderedOutput {
    render_output_in(response, &Local)
}

pub fn render_output_in<Tz>(response: &RecommendationResponse, tz: &Tz) -> RenderedOutput
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tags = flatten_hashtags(&response.hashtags_for_ideas);

    RenderedOutput {
        recommendation: or_placeholder(&response.recommendation),
        reason: or_placeholder(&response.reason),
        ideas: response.ideas.clone(),
        hashtags: if tags.is_empty() {
            HashtagList::Placeholder(NO_HASHTAGS)
        } else {
            HashtagList::Tags(tags)
        },
        examples: response
            .examples
            .iter()
            .map(|example| example_card(example, tz))
            .collect(),
    }
}

fn or_placeholder(text: &str) -> String {
    if text.is_empty() {
        EMPTY_TEXT.to_string()
    } else {
        text.to_string()
    }
}

/// All idea hashtags in one list, blanks and repeats removed, first-seen
/// order kept.
pub fn flatten_hashtags(lists: &[Vec<String>]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in lists.iter().flatten().filter(|t| !t.is_empty()) {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

pub fn youtube_url(video_id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("v", video_id)
        .finish();
    format!("{YOUTUBE_WATCH}?{query}")
}

/// `—` when the timestamp is missing or unreadable.
///
/// Accepts RFC 3339, a date-time without offset, or a bare `YYYY-MM-DD`.
/// The last two are taken as times in `tz`, a bare date at midnight.
pub fn format_published<Tz>(iso: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    iso.map(str::trim)
        .and_then(|raw| parse_published(raw, tz))
        .map(|dt| dt.format(PUBLISHED_FORMAT).to_string())
        .unwrap_or_else(|| EMPTY_TEXT.to_string())
}

fn parse_published<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }

    let naive = NaiveDateTime::parse_from_str(raw, NAIVE_DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive).earliest()
}

fn example_card<Tz>(example: &Example, tz: &Tz) -> ExampleCard
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let title = match example.title.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => EXAMPLE_TITLE.to_string(),
    };

    let mut meta = format!(
        "Publicado: {}",
        format_published(example.published_at.as_deref(), tz)
    );
    if let Some(url) = example.url.as_deref().filter(|u| !u.is_empty()) {
        meta.push_str(" · ");
        meta.push_str(url);
    }

    ExampleCard {
        title,
        link: example
            .video_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(youtube_url),
        meta,
        hashtags: example.hashtags_for_examples.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scriptify_core::demo_response;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flatten_hashtags() {
        let lists = vec![tags(&["#a", "#b"]), tags(&["#a"]), Vec::new()];
        assert_eq!(flatten_hashtags(&lists), tags(&["#a", "#b"]));
    }

    #[test]
    fn test_flatten_hashtags_drops_blanks() {
        let lists = vec![tags(&["", "#x"]), tags(&["#y", "", "#x"])];
        assert_eq!(flatten_hashtags(&lists), tags(&["#x", "#y"]));
    }

    #[test]
    fn test_youtube_url() {
        assert_eq!(
            youtube_url("S_shhw4VV68"),
            "https://www.youtube.com/watch?v=S_shhw4VV68"
        );
    }

    #[test]
    fn test_youtube_url_encodes_id() {
        assert_eq!(
            youtube_url("a&b=c"),
            "https://www.youtube.com/watch?v=a%26b%3Dc"
        );
    }

    #[test]
    fn test_format_published() {
        assert_eq!(
            format_published(Some("2025-10-10T15:00:54+00:00"), &Utc),
            "10/10/2025, 15:00:54"
        );
        assert_eq!(
            format_published(Some("2025-10-08T20:43:13-03:00"), &Utc),
            "08/10/2025, 23:43:13"
        );
        assert_eq!(
            format_published(Some("2025-10-10T15:00:54Z"), &Utc),
            "10/10/2025, 15:00:54"
        );
        assert_eq!(
            format_published(Some("2025-10-10T15:00:54"), &Utc),
            "10/10/2025, 15:00:54"
        );
        assert_eq!(
            format_published(Some("2025-10-10T15:00:54.250"), &Utc),
            "10/10/2025, 15:00:54"
        );
        assert_eq!(
            format_published(Some("2025-10-10"), &Utc),
            "10/10/2025, 00:00:00"
        );
        assert_eq!(format_published(Some("2025-13-40"), &Utc), "—");
        assert_eq!(format_published(Some("yesterday"), &Utc), "—");
        assert_eq!(format_published(None, &Utc), "—");
    }

    #[test]
    fn test_render_demo_response() {
        let output = render_output_in(&demo_response(), &Utc);

        assert!(output.recommendation.starts_with("Explora la realidad virtual"));
        assert_eq!(output.ideas.len(), 4);
        assert_eq!(
            output.hashtags,
            HashtagList::Tags(tags(&[
                "#xr",
                "#comparativa",
                "#checklist",
                "#inicio",
                "#ganchos",
                "#retencion"
            ]))
        );

        let first = &output.examples[0];
        assert_eq!(first.title, "Demo XR");
        assert_eq!(
            first.link.as_deref(),
            Some("https://www.youtube.com/watch?v=S_shhw4VV68")
        );
        assert_eq!(
            first.meta,
            "Publicado: 10/10/2025, 15:00:54 · https://youtu.be/S_shhw4VV68"
        );
        assert_eq!(first.hashtags, tags(&["#xr", "#demo"]));
    }

    #[test]
    fn test_render_sparse_response() {
        let response = RecommendationResponse {
            examples: vec![Example::default()],
            ..Default::default()
        };
        let output = render_output_in(&response, &Utc);

        assert_eq!(output.recommendation, "—");
        assert_eq!(output.reason, "—");
        assert!(output.ideas.is_empty());
        assert_eq!(output.hashtags, HashtagList::Placeholder(NO_HASHTAGS));

        let card = &output.examples[0];
        assert_eq!(card.title, "Ejemplo");
        assert_eq!(card.link, None);
        assert_eq!(card.meta, "Publicado: —");
        assert!(card.hashtags.is_empty());
    }

    #[test]
    fn test_render_is_idempotent() {
        let response = demo_response();
        assert_eq!(
            render_output_in(&response, &Utc),
            render_output_in(&response, &Utc)
        );
    }
}
