use std::time::Duration;

pub const QUIP_INTERVAL: Duration = Duration::from_secs(6);

pub const QUIPS: &[&str] = &[
    "Leyendo tus métricas y preparando una estrategia.",
    "El agente está discutiendo consigo mismo (¡y va ganando!).",
    "Midiendo si hoy toca vender, retener o demostrar autoridad…",
    "Contando tus clics como si fueran likes de tu crush ❤️",
    "Comparando tu CTR con el clima: ¿hay tormenta o sol?",
    "Analizando retenciones con lupa de detective 🕵️",
    "Buscando títulos que no sean clickbait… pero que sí funcionen 😉",
    "Consultando al oráculo de los thumbnails 🔮",
    "Ajustando el gancho del video con precisión quirúrgica ✂️",
    "Revisando ejemplos reales para inspirarte (sin humo).",
    "Separando opinión de dato duro… como buenos científicos 🧪",
    "Viendo qué funcionó a canales similares al tuyo.",
    "Hablando con el grafo de conocimiento (es tímido).",
    "Chequeando si tu nicho está en tendencia 📈",
    "Detectando si conviene corto, mediano o largo… el video.",
    "Mapeando hashtags que no parezcan poema de 2007 #porfavor",
    "Evadiendo gurús y encontrando evidencia real.",
    "Puliendo una recomendación que puedas ejecutar hoy.",
    "Decidiendo si conviene autoridad o retención para crecer sostenido.",
    "Confirmando que tus métricas no son de otro universo 🪐",
    "Leyendo comentarios para encontrar señales escondidas.",
    "Cuenta regresiva para una idea accionable…",
    "Midiendo si tu audiencia se queda por valor o por carisma.",
    "¿Miniatura con cara sorpresa? Evaluando riesgos 😮",
    "Quitándole puntos a los títulos con 11 emojis.",
    "Probando variantes de gancho mental (sin dolor).",
    "Pensando como humano, calculando como máquina 🤝",
    "La IA está tomando notas para tu próximo video.",
    "Hablando con YouTube: ‘trátalo bien, es buena gente’.",
];

/// Rotating status line shown while a request is pending.
#[derive(Debug, Clone, Default)]
pub struct QuipTicker {
    index: usize,
    running: bool,
    status: Option<String>,
}

impl QuipTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.index = 0;
        self.status = None;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.status = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances to the next quip, wrapping around. A pending status message
    /// is dropped on the tick.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.index = (self.index + 1) % QUIPS.len();
        self.status = None;
    }

    /// Shows `message` instead of the current quip until the next tick.
    pub fn set_status(&mut self, message: String) {
        self.status = Some(message);
    }

    pub fn current(&self) -> &str {
        self.status.as_deref().unwrap_or(QUIPS[self.index])
    }
}
