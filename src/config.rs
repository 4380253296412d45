use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub interview: InterviewConfig,
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub uploads_root: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewConfig {
    pub token: String,
    pub media_type: String,
    pub max_upload_bytes: u64,
    /// Overrides the built-in question script when set
    #[serde(default)]
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub api_url: String,
    /// Usually supplied via GREENROOM__TRANSCRIPTION__API_KEY rather than
    /// the config file; empty means transcription is disabled
    #[serde(default)]
    pub api_key: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GREENROOM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
