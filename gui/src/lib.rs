pub mod quips;
pub mod render;
mod view;

use iced::widget::{column, container, scrollable, text};
use iced::{Command, Element, Length, Subscription, Theme};
use quips::{QuipTicker, QUIP_INTERVAL};
use recommend_client::{
    ApiClient, ClientSettings, FunnelLink, RetryController, RetryObserver, RetryPolicy, RetryState,
};
use render::{render_output, RenderedOutput};
use scriptify_core::{
    form_to_request, funnel_url, CoreError, ErrorExt, ErrorRecovery, ErrorReporter, FormFields,
    LikeFeedback,
    RecommendationRequest, RecommendationResponse, RecoveryResult, DEFAULT_PLATFORM,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(250);
const PLATFORMS: [&str; 3] = [DEFAULT_PLATFORM, "youtube", "instagram"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Platform,
    Niche,
    Impressions,
    Reach,
    Likes,
    Shares,
    Saves,
    Comments,
    Followers,
    Specialties,
}

impl Field {
    pub const METRICS: [Field; 7] = [
        Field::Impressions,
        Field::Reach,
        Field::Likes,
        Field::Shares,
        Field::Saves,
        Field::Comments,
        Field::Followers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Platform => "Plataforma",
            Field::Niche => "Nicho",
            Field::Impressions => "Impresiones",
            Field::Reach => "Alcance",
            Field::Likes => "Likes",
            Field::Shares => "Compartidos",
            Field::Saves => "Guardados",
            Field::Comments => "Comentarios",
            Field::Followers => "Seguidores",
            Field::Specialties => "Especialidades",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Niche => "ej. gaming, cocina, fitness",
            Field::Specialties => "separadas por comas",
            Field::Platform => DEFAULT_PLATFORM,
            _ => "0",
        }
    }

    fn slot(self, form: &mut FormFields) -> &mut String {
        match self {
            Field::Platform => &mut form.platform,
            Field::Niche => &mut form.niche,
            Field::Impressions => &mut form.impressions,
            Field::Reach => &mut form.reach,
            Field::Likes => &mut form.likes,
            Field::Shares => &mut form.shares,
            Field::Saves => &mut form.saves,
            Field::Comments => &mut form.comments,
            Field::Followers => &mut form.followers,
            Field::Specialties => &mut form.specialties,
        }
    }

    pub fn value(self, form: &FormFields) -> &str {
        match self {
            Field::Platform => &form.platform,
            Field::Niche => &form.niche,
            Field::Impressions => &form.impressions,
            Field::Reach => &form.reach,
            Field::Likes => &form.likes,
            Field::Shares => &form.shares,
            Field::Saves => &form.saves,
            Field::Comments => &form.comments,
            Field::Followers => &form.followers,
            Field::Specialties => &form.specialties,
        }
    }
}

/// Where the rendered response came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSource {
    Live,
    /// The live call failed; the demo response stands in for it.
    Fallback { reason: String },
    /// The user asked for the demo.
    Demo,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub response: RecommendationResponse,
    pub source: ResponseSource,
}

impl From<RecoveryResult<RecommendationResponse>> for Submission {
    fn from(result: RecoveryResult<RecommendationResponse>) -> Self {
        let source = match result.cause() {
            Some(cause) => ResponseSource::Fallback {
                reason: cause.user_friendly_message(),
            },
            None => ResponseSource::Live,
        };
        Self {
            response: result.into_value(),
            source,
        }
    }
}

/// One form submission: retried call, then the explicit demo fallback.
pub async fn submit(
    client: ApiClient,
    retry: RetryController,
    recovery: Arc<ErrorRecovery>,
    request: RecommendationRequest,
) -> Submission {
    let result = retry.recommend(&client, &request).await;
    let outcome = recovery.recover_with_demo(result).await;
    if outcome.is_degraded() {
        debug!("Submission for niche '{}' degraded to demo", request.niche);
    }
    outcome.into()
}

#[derive(Debug, Clone)]
pub enum Message {
    FieldChanged(Field, String),
    Submit,
    ShowDemo,
    Finished(Submission),
    QuipTick,
    StatusPoll,
    LikeIdea(usize),
    LikeSent(LikeOutcome),
    CopyLink(String),
    OpenFunnel(usize),
}

/// Result of a like, tagged with the result it was sent for.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub generation: u64,
    pub index: usize,
    pub result: Result<(), String>,
}

pub struct AppFlags {
    pub client: ApiClient,
    pub settings: ClientSettings,
}

pub struct App {
    client: ApiClient,
    retry: RetryController,
    recovery: Arc<ErrorRecovery>,
    funnel: Vec<FunnelLink>,
    platforms: Vec<String>,
    form: FormFields,
    pending: bool,
    submitted: Option<RecommendationRequest>,
    output: Option<(RenderedOutput, ResponseSource)>,
    /// Bumped whenever a new result replaces the shown one.
    generation: u64,
    liked: HashSet<usize>,
    notice: Option<String>,
    quips: QuipTicker,
    status_tx: Arc<watch::Sender<Option<String>>>,
    status_rx: watch::Receiver<Option<String>>,
}

impl App {
    pub fn new(flags: AppFlags) -> Self {
        let (status_tx, status_rx) = watch::channel(None);

        Self {
            client: flags.client,
            retry: RetryController::new(RetryPolicy::from(&flags.settings.retry)),
            recovery: Arc::new(ErrorRecovery::new(flags.settings.fallback_delay())),
            funnel: flags.settings.funnel,
            platforms: PLATFORMS.iter().map(|p| p.to_string()).collect(),
            form: FormFields {
                platform: DEFAULT_PLATFORM.to_string(),
                ..Default::default()
            },
            pending: false,
            submitted: None,
            output: None,
            generation: 0,
            liked: HashSet::new(),
            notice: None,
            quips: QuipTicker::new(),
            status_tx: Arc::new(status_tx),
            status_rx,
        }
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn output(&self) -> Option<&RenderedOutput> {
        self.output.as_ref().map(|(output, _)| output)
    }

    pub fn source(&self) -> Option<&ResponseSource> {
        self.output.as_ref().map(|(_, source)| source)
    }

    pub fn quip(&self) -> &str {
        self.quips.current()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn begin_loading(&mut self) {
        self.pending = true;
        self.output = None;
        self.generation += 1;
        self.notice = None;
        self.liked.clear();
        self.status_tx.send_replace(None);
        self.status_rx.borrow_and_update();
        self.quips.start();
    }

    fn observed_retry(&self) -> RetryController {
        let status_tx = self.status_tx.clone();
        let observer: RetryObserver = Arc::new(move |state: &RetryState| {
            if let Some(message) = state.status_message() {
                status_tx.send_replace(Some(message));
            }
        });
        self.retry.clone().with_observer(observer)
    }

    pub fn update(&mut self, message: Message) -> Result<Command<Message>, CoreError> {
        match message {
            Message::FieldChanged(field, value) => {
                *field.slot(&mut self.form) = value;
                Ok(Command::none())
            }
            Message::Submit | Message::ShowDemo if self.pending => {
                debug!("Ignoring submission while a request is pending");
                Ok(Command::none())
            }
            Message::Submit => {
                let request = form_to_request(&self.form);
                info!("Submitting form for niche '{}'", request.niche);
                self.begin_loading();
                self.submitted = Some(request.clone());

                Ok(Command::perform(
                    submit(
                        self.client.clone(),
                        self.observed_retry(),
                        self.recovery.clone(),
                        request,
                    ),
                    Message::Finished,
                ))
            }
            Message::ShowDemo => {
                info!("Showing demo response");
                self.begin_loading();
                self.submitted = None;
                let recovery = self.recovery.clone();

                Ok(Command::perform(
                    async move { recovery.demo().await },
                    |response| {
                        Message::Finished(Submission {
                            response,
                            source: ResponseSource::Demo,
                        })
                    },
                ))
            }
            Message::Finished(submission) => {
                self.pending = false;
                self.quips.stop();
                if let ResponseSource::Fallback { reason } = &submission.source {
                    warn!("Rendering demo response in place of live result: {}", reason);
                }
                self.output = Some((render_output(&submission.response), submission.source));
                Ok(Command::none())
            }
            Message::QuipTick => {
                self.quips.tick();
                Ok(Command::none())
            }
            Message::StatusPoll => {
                if self.status_rx.has_changed().unwrap_or(false) {
                    if let Some(status) = self.status_rx.borrow_and_update().clone() {
                        self.quips.set_status(status);
                    }
                }
                Ok(Command::none())
            }
            Message::LikeIdea(index) => self.like_idea(index),
            Message::LikeSent(outcome) => {
                if outcome.generation != self.generation {
                    debug!("Dropping like for idea {} of a replaced result", outcome.index);
                    return Ok(Command::none());
                }
                match outcome.result {
                    Ok(()) => {
                        self.liked.insert(outcome.index);
                        self.notice = Some("¡Gracias! Guardamos tu like.".to_string());
                    }
                    Err(message) => {
                        warn!("Like for idea {} failed: {}", outcome.index, message);
                        self.notice = Some(message);
                    }
                }
                Ok(Command::none())
            }
            Message::CopyLink(link) => {
                self.notice = Some(format!("Enlace copiado: {}", link));
                Ok(iced::clipboard::write(link))
            }
            Message::OpenFunnel(index) => {
                let link = self.funnel.get(index).ok_or_else(|| CoreError::InvalidInput {
                    message: format!("no funnel link at position {}", index),
                })?;
                let url = funnel_url(
                    &link.base,
                    link.service.as_deref(),
                    &form_to_request(&self.form),
                )?;
                self.notice = Some(format!("Enlace copiado: {}", url));
                Ok(iced::clipboard::write(url.to_string()))
            }
        }
    }

    fn like_idea(&mut self, index: usize) -> Result<Command<Message>, CoreError> {
        let idea = self
            .output()
            .and_then(|output| output.ideas.get(index))
            .cloned()
            .ok_or_else(|| CoreError::InvalidInput {
                message: format!("no idea at position {}", index),
            })?;

        if self.liked.contains(&index) {
            return Ok(Command::none());
        }

        let request = self
            .submitted
            .clone()
            .unwrap_or_else(|| form_to_request(&self.form));
        let feedback = LikeFeedback::new(request.niche, idea, request.specialties);
        let client = self.client.clone();
        let generation = self.generation;

        Ok(Command::perform(
            async move {
                client.like(&feedback).await.map(|_| ()).map_err(|e| {
                    ErrorReporter::new().report_warning(&e);
                    e.user_friendly_message()
                })
            },
            move |result| {
                Message::LikeSent(LikeOutcome {
                    generation,
                    index,
                    result,
                })
            },
        ))
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.quips.is_running() {
            Subscription::batch(vec![
                iced::time::every(QUIP_INTERVAL).map(|_| Message::QuipTick),
                iced::time::every(STATUS_POLL_INTERVAL).map(|_| Message::StatusPoll),
            ])
        } else {
            Subscription::none()
        }
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let title: Element<Message, Theme> = text("Recomendador Scriptify").size(28).into();

        let body: Element<Message, Theme> = if self.pending {
            view::loading_panel(self.quips.current())
        } else if let Some((output, source)) = &self.output {
            view::results_panel(output, source, &self.liked)
        } else {
            text("Completa el formulario para recibir una recomendación.")
                .size(14)
                .into()
        };

        let mut content = column![
            title,
            view::form_panel(&self.form, &self.platforms, self.pending),
            body
        ]
        .spacing(20);

        if !self.funnel.is_empty() {
            content = content.push(view::funnel_panel(&self.funnel));
        }
        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(13));
        }

        container(scrollable(container(content).padding(20)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recommend_client::{ConfigProvider, HttpReply, HttpTransport};
    use scriptify_core::{demo_response, Config};
    use serde_json::Value;

    struct OfflineTransport;

    #[async_trait]
    impl HttpTransport for OfflineTransport {
        async fn get(&self, _url: &str) -> Result<HttpReply, CoreError> {
            Ok(HttpReply::new(503, "offline"))
        }

        async fn post_json(
            &self,
            _url: &str,
            _headers: &[(&str, &str)],
            _body: &Value,
        ) -> Result<HttpReply, CoreError> {
            Ok(HttpReply::new(503, "offline"))
        }
    }

    fn app_with_funnel(funnel: Vec<FunnelLink>) -> App {
        let config = Arc::new(ConfigProvider::with_config(Config::new(
            "http://api.test/recommend",
            None,
        )));
        let client = ApiClient::new(
            Arc::new(OfflineTransport),
            config,
            "http://localhost:3000/api/feedback/like",
        );
        App::new(AppFlags {
            client,
            settings: ClientSettings {
                funnel,
                ..Default::default()
            },
        })
    }

    fn app() -> App {
        app_with_funnel(Vec::new())
    }

    fn type_into(app: &mut App, field: Field, value: &str) {
        app.update(Message::FieldChanged(field, value.to_string()))
            .unwrap();
    }

    fn demo_finished(source: ResponseSource) -> Message {
        Message::Finished(Submission {
            response: demo_response(),
            source,
        })
    }

    #[test]
    fn test_new_app_is_idle() {
        let app = app();
        assert!(!app.is_pending());
        assert!(app.output().is_none());
        assert_eq!(app.form().platform, "tiktok");
    }

    #[test]
    fn test_field_changes_update_form() {
        let mut app = app();
        type_into(&mut app, Field::Niche, "gaming");
        type_into(&mut app, Field::Likes, "120");
        type_into(&mut app, Field::Platform, "youtube");

        assert_eq!(app.form().niche, "gaming");
        assert_eq!(app.form().likes, "120");
        assert_eq!(Field::Likes.value(app.form()), "120");
        assert_eq!(app.form().platform, "youtube");
    }

    #[test]
    fn test_submit_enters_loading_state() {
        let mut app = app();
        app.update(demo_finished(ResponseSource::Live)).unwrap();
        assert!(app.output().is_some());

        app.update(Message::Submit).unwrap();

        assert!(app.is_pending());
        assert!(app.output().is_none(), "previous results are hidden");
        assert_eq!(app.quip(), quips::QUIPS[0]);
    }

    #[test]
    fn test_resubmission_ignored_while_pending() {
        let mut app = app();
        type_into(&mut app, Field::Niche, "gaming");
        app.update(Message::Submit).unwrap();

        type_into(&mut app, Field::Niche, "cocina");
        app.update(Message::QuipTick).unwrap();
        app.update(Message::Submit).unwrap();
        app.update(Message::ShowDemo).unwrap();

        assert!(app.is_pending());
        assert_eq!(app.submitted.as_ref().unwrap().niche, "gaming");
        assert_eq!(app.quip(), quips::QUIPS[1], "ticker was not restarted");
    }

    #[test]
    fn test_finished_renders_and_stops_quips() {
        let mut app = app();
        app.update(Message::Submit).unwrap();
        app.update(demo_finished(ResponseSource::Fallback {
            reason: "HTTP 500".to_string(),
        }))
        .unwrap();

        assert!(!app.is_pending());
        assert!(!app.quips.is_running());
        let output = app.output().unwrap();
        assert!(output.recommendation.starts_with("Explora la realidad virtual"));
        assert!(matches!(
            app.source(),
            Some(ResponseSource::Fallback { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_status_reaches_quip_line() {
        let mut app = app();
        app.update(Message::Submit).unwrap();

        let retry = app.observed_retry();
        let _ = retry
            .execute("recommend", || async {
                Err::<(), CoreError>(CoreError::http(504, "cold"))
            })
            .await;
        app.update(Message::StatusPoll).unwrap();

        assert_eq!(app.quip(), "Calentando el modelo… reintentamos en 5s ⏳");

        app.update(Message::QuipTick).unwrap();
        assert_eq!(app.quip(), quips::QUIPS[1]);
    }

    #[test]
    fn test_status_poll_without_news_keeps_quip() {
        let mut app = app();
        app.update(Message::Submit).unwrap();
        app.update(Message::StatusPoll).unwrap();
        assert_eq!(app.quip(), quips::QUIPS[0]);
    }

    #[test]
    fn test_like_requires_rendered_idea() {
        let mut app = app();
        assert!(app.update(Message::LikeIdea(0)).is_err());

        app.update(demo_finished(ResponseSource::Demo)).unwrap();
        assert!(app.update(Message::LikeIdea(0)).is_ok());
        assert!(app.update(Message::LikeIdea(99)).is_err());
    }

    fn like_sent(app: &App, index: usize, result: Result<(), String>) -> Message {
        Message::LikeSent(LikeOutcome {
            generation: app.generation,
            index,
            result,
        })
    }

    #[test]
    fn test_like_outcomes() {
        let mut app = app();
        app.update(demo_finished(ResponseSource::Demo)).unwrap();

        app.update(like_sent(&app, 1, Ok(()))).unwrap();
        assert!(app.liked.contains(&1));

        app.update(like_sent(&app, 2, Err("sin conexión".to_string())))
            .unwrap();
        assert!(!app.liked.contains(&2));
        assert_eq!(app.notice(), Some("sin conexión"));
    }

    #[test]
    fn test_like_for_replaced_result_is_dropped() {
        let mut app = app();
        app.update(Message::ShowDemo).unwrap();
        app.update(demo_finished(ResponseSource::Demo)).unwrap();
        let late = like_sent(&app, 2, Ok(()));

        app.update(Message::Submit).unwrap();
        app.update(demo_finished(ResponseSource::Live)).unwrap();
        app.update(late).unwrap();

        assert!(app.liked.is_empty());
        assert_eq!(app.notice(), None);

        app.update(like_sent(&app, 0, Ok(()))).unwrap();
        assert!(app.liked.contains(&0));
    }

    #[test]
    fn test_funnel_link_lookup() {
        let mut app = app_with_funnel(vec![FunnelLink {
            label: "Edición".to_string(),
            base: "https://example.com/servicios".to_string(),
            service: Some("edicion".to_string()),
        }]);
        type_into(&mut app, Field::Niche, "gaming");

        app.update(Message::OpenFunnel(0)).unwrap();
        let notice = app.notice().unwrap();
        assert!(notice.contains("utm_campaign=edicion"));
        assert!(notice.contains("niche=gaming"));

        assert!(matches!(
            app.update(Message::OpenFunnel(3)),
            Err(CoreError::InvalidInput { .. })
        ));
    }
}
