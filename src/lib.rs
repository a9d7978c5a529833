pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod proxy;
pub mod toast;

use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use config::Config;
use proxy::{ChatProxy, ReaderProxy, SummarizeProxy};

// One pooled client for every outbound call
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

/// The three proxy endpoints, built once from configuration.
pub struct Proxies {
    pub chat: ChatProxy,
    pub summarize: SummarizeProxy,
    pub reader: ReaderProxy,
}

impl Proxies {
    pub fn from_config(config: &Config) -> Self {
        Proxies {
            chat: ChatProxy {
                url: config.upstream.chat_url.clone(),
                credential_names: config.credentials.chat.clone(),
            },
            summarize: SummarizeProxy {
                url: config.upstream.chat_url.clone(),
                credential_names: config.credentials.summarize.clone(),
            },
            reader: ReaderProxy {
                base: config.upstream.reader_base.clone(),
            },
        }
    }
}

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub proxies: Arc<Proxies>,
    pub client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            proxies: Arc::new(Proxies::from_config(&config)),
            config: Arc::new(config),
            client: CLIENT.clone(),
        }
    }
}
