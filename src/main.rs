use gui::{App, AppFlags};
use iced::{Application, Settings};
use recommend_client::ClientSettings;
use scriptify_core::CoreError;
use tracing_subscriber::EnvFilter;

const SETTINGS_PATH: &str = "scriptify.toml";
const DEFAULT_LOG_FILTER: &str = "scriptify=debug,gui=debug,recommend_client=debug";

fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting Scriptify - content recommender");

    let settings = ClientSettings::load(SETTINGS_PATH)?;
    let client = recommend_client::connect(&settings)?;
    tracing::info!("Using service at {}", settings.origin);

    let window = iced::window::Settings {
        size: iced::Size::new(1000.0, 860.0),
        min_size: Some(iced::Size::new(720.0, 560.0)),
        ..Default::default()
    };

    ScriptifyApp::run(Settings {
        window,
        ..Settings::with_flags(AppFlags { client, settings })
    })
    .map_err(|e| {
        tracing::error!("Application error: {}", e);
        CoreError::Internal {
            message: format!("GUI error: {e}"),
        }
    })
}

struct ScriptifyApp {
    app: App,
}

impl Application for ScriptifyApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = AppFlags;

    fn new(flags: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (
            Self {
                app: App::new(flags),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        "Scriptify - Recomendador de contenido".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        match self.app.update(message) {
            Ok(command) => command,
            Err(e) => {
                tracing::error!("Update error: {}", e);
                iced::Command::none()
            }
        }
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }

    fn subscription(&self) -> iced::Subscription<Self::Message> {
        self.app.subscription()
    }
}
