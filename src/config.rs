use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const DEFAULT_CHAT_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_READER_BASE: &str = "https://r.jina.ai/";

/// Snapshot of the secret values the proxies may use, keyed by variable name.
#[derive(Clone, Debug, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Reads every listed variable from the process environment.
    pub fn from_env<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .filter_map(|name| env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect()
    }

    /// Returns the first non-empty value among `names`, in order.
    pub fn resolve(&self, names: &[String]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.values.get(name))
            .map(|value| value.as_str())
            .find(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Secrets {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Ordered credential variable names per endpoint. Earlier names win.
#[derive(Clone, Debug)]
pub struct CredentialNames {
    pub chat: Vec<String>,
    pub summarize: Vec<String>,
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            chat: vec!["MISTRAL_API_KEY".into(), "VITE_MISTRAL_API_KEY".into()],
            summarize: vec![
                "MISTRAL_API_KEY".into(),
                "VITE_MISTRAL_API_KEY".into(),
                "MISTRAL_KEY".into(),
            ],
        }
    }
}

impl CredentialNames {
    fn all(&self) -> impl Iterator<Item = &str> {
        self.chat.iter().chain(self.summarize.iter()).map(String::as_str)
    }
}

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Chat-completions endpoint used by the chat and summarize proxies.
    pub chat_url: String,
    /// Extraction service prefix; the reader appends `http://<host/path>`.
    pub reader_base: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            reader_base: DEFAULT_READER_BASE.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub secrets: Secrets,
    pub credentials: CredentialNames,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let credentials = CredentialNames::default();
        let secrets = Secrets::from_env(credentials.all());

        let upstream = UpstreamConfig {
            chat_url: env::var("MISTRAL_API_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string()),
            reader_base: env::var("READER_BASE_URL").unwrap_or_else(|_| DEFAULT_READER_BASE.to_string()),
        };

        // Load server configuration with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let server_addr = parse_addr(&host, &port)?;

        Ok(Config {
            server_addr,
            secrets,
            credentials,
            upstream,
        })
    }
}

fn parse_addr(host: &str, port: &str) -> Result<SocketAddr> {
    let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
    let ip = IpAddr::from_str(host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;
    Ok(SocketAddr::new(ip, port))
}
