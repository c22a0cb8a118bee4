use crate::types::{Example, RecommendationResponse};

/// Static response shown when the live service cannot be reached, and by the
/// demo button.
pub fn demo_response() -> RecommendationResponse {
    RecommendationResponse {
        recommendation:
            "Explora la realidad virtual y mixta para nuevas experiencias inmersivas.".to_string(),
        reason: "Buen engagement pero alcance por debajo del potencial. Trabaja piezas de autoridad con ganchos claros.".to_string(),
        ideas: strings(&[
            "Comparativa: Realidad Mixta vs. WebXR",
            "Checklist de inicio en XR para marcas",
            "3 ganchos para captar en 3 segundos",
            "Antes y después: experiencia inmersiva",
        ]),
        hashtags_for_ideas: vec![
            strings(&["#xr", "#comparativa"]),
            strings(&["#checklist", "#inicio"]),
            strings(&["#ganchos", "#retencion"]),
            Vec::new(),
        ],
        examples: vec![
            Example {
                title: Some("Demo XR".to_string()),
                video_id: Some("S_shhw4VV68".to_string()),
                url: Some("https://youtu.be/S_shhw4VV68".to_string()),
                published_at: Some("2025-10-10T15:00:54+00:00".to_string()),
                hashtags_for_examples: strings(&["#xr", "#demo"]),
            },
            Example {
                title: Some("Tendencias XR".to_string()),
                video_id: Some("bGH-DvBlUhM".to_string()),
                url: Some("https://youtu.be/bGH-DvBlUhM".to_string()),
                published_at: Some("2025-10-08T20:43:13+00:00".to_string()),
                hashtags_for_examples: strings(&["#tendencias", "#realidadmixta"]),
            },
        ],
        diagnostics: None,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
