use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) log_level: String,
    pub(crate) format: OutputFormat,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());
        let format = match std::env::var("ERRCODE_FORMAT") {
            Ok(raw) => parse_format(&raw)?,
            Err(_) => OutputFormat::default(),
        };

        Ok(Self { log_level, format })
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(anyhow!(
            "ERRCODE_FORMAT must be `text` or `json`, got `{other}`"
        )),
    }
}
