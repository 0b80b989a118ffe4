use anyhow::{Context, Result};
use std::env;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plaintext connection, no TLS at all.
    None,
    /// Plaintext connection upgraded with STARTTLS (typically port 587).
    StartTls,
    /// Implicit TLS from the first byte (typically port 465).
    Ssl,
}

impl SmtpSecurity {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "none" => Ok(SmtpSecurity::None),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "ssl" => Ok(SmtpSecurity::Ssl),
            other => anyhow::bail!(
                "Unsupported SMTP_SECURITY: {}. Supported: starttls, ssl, none",
                other
            ),
        }
    }

    fn default_port(self) -> u16 {
        match self {
            SmtpSecurity::Ssl => 465,
            _ => 587,
        }
    }
}

/// Which text-generation backend curates the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Local Ollama server, the only supported backend.
    Ollama,
}

impl LlmProvider {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            other => anyhow::bail!("Unsupported LLM_PROVIDER: {}. Supported: ollama", other),
        }
    }
}

/// All runtime settings, bound once at startup and passed by reference
/// into each pipeline component.
#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_key: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_security: SmtpSecurity,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_timeout_seconds: u64,
    pub from_email: String,
    pub to_emails: Vec<String>,

    pub dry_run: bool,
    pub debug: bool,
    pub verify_empty_results: bool,

    pub query: String,
    pub allow_domains: Vec<String>,
    pub max_articles: usize,
    pub lookback_days: i64,
    pub max_keywords: usize,

    pub llm_provider: LlmProvider,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f64,
    pub llm_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let news_api_key = require(
            "NEWS_API_KEY",
            "Get a newsapi.ai (EventRegistry) key from: https://newsapi.ai",
        )?;

        let smtp_user = require(
            "SMTP_USER",
            "Set SMTP_USER to your SMTP username (usually your email address).",
        )?;
        let smtp_pass = require(
            "SMTP_PASS",
            "Set SMTP_PASS to your SMTP password. For Gmail this must be an App Password:\n  \
             https://myaccount.google.com/apppasswords",
        )?;

        let smtp_security = SmtpSecurity::parse(&optional("SMTP_SECURITY").unwrap_or_else(|| "starttls".to_string()))?;
        let smtp_host = optional("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string());
        let smtp_port = match optional("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SMTP_PORT must be a port number, got: {}", raw))?,
            None => smtp_security.default_port(),
        };

        let from_email = optional("FROM_EMAIL").unwrap_or_else(|| smtp_user.clone());
        let to_emails = parse_email_list(&require(
            "TO_EMAILS",
            "Set TO_EMAILS to a comma-separated list of recipient addresses.",
        )?);
        if to_emails.is_empty() {
            anyhow::bail!("TO_EMAILS contains no usable addresses");
        }

        let query = optional("QUERY").unwrap_or_else(|| {
            r#""United States Treasury" OR "U.S. Treasury" OR "Treasury Department""#.to_string()
        });

        let allow_domains = optional("ALLOW_DOMAINS")
            .map(|raw| {
                raw.split(',')
                    .map(|d| d.trim().to_lowercase())
                    .filter(|d| !d.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            news_api_key,
            smtp_host,
            smtp_port,
            smtp_security,
            smtp_user,
            smtp_pass,
            smtp_timeout_seconds: parse_or("SMTP_TIMEOUT_SECONDS", 60)?,
            from_email,
            to_emails,
            dry_run: is_truthy(optional("DRY_RUN").as_deref()),
            debug: is_truthy(optional("DEBUG").as_deref()),
            verify_empty_results: is_truthy(optional("VERIFY_EMPTY_RESULTS").as_deref()),
            query,
            allow_domains,
            max_articles: parse_or("MAX_ARTICLES", 25)?,
            lookback_days: parse_or("NEWS_LOOKBACK_DAYS", 1)?,
            max_keywords: parse_or("NEWS_MAX_KEYWORDS", 6)?,
            llm_provider: LlmProvider::parse(
                &optional("LLM_PROVIDER").unwrap_or_else(|| "ollama".to_string()),
            )?,
            ollama_base_url: optional("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string())
                .trim_end_matches('/')
                .to_string(),
            ollama_model: optional("OLLAMA_MODEL").unwrap_or_else(|| "llama3.2:3b".to_string()),
            llm_max_tokens: parse_or("LLM_MAX_TOKENS", 1800)?,
            llm_temperature: parse_or("LLM_TEMPERATURE", 0.4)?,
            llm_timeout_seconds: parse_or("OLLAMA_TIMEOUT_SECONDS", 120)?,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/treasury-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("treasury-digest").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// Read an environment variable, treating blank values as unset.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(name: &str, hint: &str) -> Result<String> {
    optional(name)
        .ok_or_else(|| anyhow::anyhow!("Missing required environment variable: {}\n\n{}", name, hint))
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: {}", name, raw)),
        None => Ok(default),
    }
}

/// Accept comma/semicolon/newline separated addresses, trimmed and
/// de-duplicated preserving first-seen order.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in raw.replace(';', ",").replace('\n', ",").split(',') {
        let addr = token.trim();
        if !addr.is_empty() && !out.iter().any(|a| a == addr) {
            out.push(addr.to_string());
        }
    }
    out
}

pub fn is_truthy(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "y" | "on")
    )
}
