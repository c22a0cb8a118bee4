use crate::types::RecommendationRequest;
use crate::{ConfigError, CoreError};
use url::Url;

const DEFAULT_CAMPAIGN: &str = "servicio";

/// Builds a tracked link to a service landing page, carrying the submitted
/// metrics so the landing form can be prefilled.
pub fn funnel_url(
    base: &str,
    service: Option<&str>,
    request: &RecommendationRequest,
) -> Result<Url, CoreError> {
    let mut url = Url::parse(base).map_err(|e| {
        CoreError::Config(ConfigError::InvalidValue {
            field: "funnel base".to_string(),
            value: format!("{base} ({e})"),
        })
    })?;

    let campaign = service.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_CAMPAIGN);
    let metric = |value: Option<f64>| value.map(format_metric).unwrap_or_default();

    url.query_pairs_mut()
        .append_pair("utm_source", "recomendador")
        .append_pair("utm_medium", "funnel")
        .append_pair("utm_campaign", campaign)
        .append_pair("platform", &request.platform)
        .append_pair("niche", &request.niche)
        .append_pair("impressions", &metric(request.impressions))
        .append_pair("reach", &metric(request.reach))
        .append_pair("likes", &metric(request.likes))
        .append_pair("shares", &metric(request.shares))
        .append_pair("saves", &metric(request.saves))
        .append_pair("comments", &metric(request.comments))
        .append_pair("followers", &metric(request.followers));

    Ok(url)
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{form_to_request, FormFields};

    #[test]
    fn test_funnel_url_carries_metrics() {
        let request = form_to_request(&FormFields {
            niche: "gaming".to_string(),
            likes: "350".to_string(),
            ..Default::default()
        });

        let url = funnel_url("https://scriptify.ai/servicios", Some("guiones"), &request).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("utm_campaign".to_string(), "guiones".to_string())));
        assert!(pairs.contains(&("platform".to_string(), "tiktok".to_string())));
        assert!(pairs.contains(&("niche".to_string(), "gaming".to_string())));
        assert!(pairs.contains(&("likes".to_string(), "350".to_string())));
        assert!(pairs.contains(&("impressions".to_string(), String::new())));
    }

    #[test]
    fn test_funnel_url_default_campaign() {
        let request = form_to_request(&FormFields::default());
        let url = funnel_url("https://scriptify.ai/x", None, &request).unwrap();
        assert!(url.as_str().contains("utm_campaign=servicio"));
    }

    #[test]
    fn test_funnel_url_rejects_relative_base() {
        let request = form_to_request(&FormFields::default());
        assert!(funnel_url("/relative", None, &request).is_err());
    }
}
