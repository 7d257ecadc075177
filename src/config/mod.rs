use crate::utils::error::{MailprobeError, Result};
use crate::utils::validation::{validate_url, Validate};
use clap::Parser;

/// Placeholder value shipped in the example .env; treated the same as an
/// unset key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Parser)]
#[command(name = "mailprobe")]
#[command(about = "Guess and verify the most likely email address for a person at a domain")]
pub struct AppConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "APILAYER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(
        long,
        env = "VERIFIER_URL",
        default_value = "https://api.apilayer.com/email_verification"
    )]
    pub verifier_url: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl AppConfig {
    pub fn credential(&self) -> ApiCredential {
        ApiCredential::new(self.api_key.clone())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        // A missing API key is deliberately not checked here: it surfaces
        // as a 500 on each request, not as a startup failure.
        validate_url("verifier_url", &self.verifier_url)?;
        Ok(())
    }
}

/// The provider API key as configured at process start. Absent, blank and
/// placeholder values all count as unconfigured.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    key: Option<String>,
}

impl ApiCredential {
    pub fn new(key: Option<String>) -> Self {
        let key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY);
        Self { key }
    }

    pub fn key(&self) -> Result<&str> {
        self.key
            .as_deref()
            .ok_or(MailprobeError::MisconfiguredCredential)
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }
}
