use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8080,http://127.0.0.1:8080";

/// How the proxy authenticates against Google.
#[derive(Debug, Clone)]
pub enum GeminiAuth {
    /// Gemini API key (`GEMINI_API_KEY`)
    ApiKey(String),
    /// Vertex AI project, region and OAuth access token
    Vertex {
        project_id: String,
        location: String,
        access_token: String,
    },
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub service_name: String,
    pub model_name: String,
    pub gemini_auth: GeminiAuth,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "team-chat-proxy".to_string()),
            model_name: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            gemini_auth: gemini_auth_from_env()?,
            allowed_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
        })
    }
}

fn gemini_auth_from_env() -> Result<GeminiAuth> {
    if let Ok(api_key) = env::var("GEMINI_API_KEY") {
        return Ok(GeminiAuth::ApiKey(api_key));
    }

    let Ok(project_id) = env::var("GCP_PROJECT_ID") else {
        bail!("Either GEMINI_API_KEY or GCP_PROJECT_ID must be set");
    };

    Ok(GeminiAuth::Vertex {
        project_id,
        location: env::var("GCP_LOCATION").unwrap_or_else(|_| "us-central1".to_string()),
        access_token: env::var("GCP_ACCESS_TOKEN")
            .context("GCP_ACCESS_TOKEN must be set when using GCP_PROJECT_ID")?,
    })
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
