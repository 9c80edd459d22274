use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://fitme.db".into());
        let analysis = AnalysisConfig {
            api_key: std::env::var("CLAUDE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("CLAUDE_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1".into()),
            model: std::env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            max_tokens: std::env::var("CLAUDE_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(2000),
        };
        Ok(Self {
            database_url,
            analysis,
        })
    }
}
