use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetcher: Option<FetcherConfig>,
}

impl Config {
    /// Look up a download default by key (`client`, `destination`, `jsonrpc`).
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "client" => Some(self.download.client.as_str()),
            "destination" => Some(self.download.destination.as_str()),
            "jsonrpc" => Some(self.download.jsonrpc.as_str()),
            _ => None,
        }
    }
}

/// Download defaults, overridable per call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Client used when none is given ("aria2" or "deluge")
    #[serde(default = "default_client")]
    pub client: String,
    /// Directory downloads are placed in
    #[serde(default = "default_destination")]
    pub destination: String,
    /// JSON-RPC endpoint of the download client
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Agent programs per client
    #[serde(default)]
    pub agents: AgentPrograms,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            destination: default_destination(),
            jsonrpc: default_jsonrpc(),
            agents: AgentPrograms::default(),
        }
    }
}

fn default_client() -> String {
    "aria2".to_string()
}

fn default_destination() -> String {
    ".".to_string()
}

fn default_jsonrpc() -> String {
    "http://localhost:6800/jsonrpc".to_string()
}

/// Programs launched to hand a thread over to a download client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentPrograms {
    #[serde(default = "default_aria2_program")]
    pub aria2: PathBuf,
    #[serde(default = "default_deluge_program")]
    pub deluge: PathBuf,
}

impl Default for AgentPrograms {
    fn default() -> Self {
        Self {
            aria2: default_aria2_program(),
            deluge: default_deluge_program(),
        }
    }
}

fn default_aria2_program() -> PathBuf {
    PathBuf::from("episub-aria2")
}

fn default_deluge_program() -> PathBuf {
    PathBuf::from("episub-deluge")
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("episub.json")
}

/// Feed fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// RSS search endpoint (e.g., "https://share.example.org/topics/rss/rss.xml")
    pub url: String,
    /// Query parameter carrying the search term (default: "keyword")
    #[serde(default = "default_query_param")]
    pub query_param: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_query_param() -> String {
    "keyword".to_string()
}

fn default_timeout() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.download.client, "aria2");
        assert_eq!(config.download.destination, ".");
        assert_eq!(config.download.jsonrpc, "http://localhost:6800/jsonrpc");
        assert_eq!(config.store.path.to_str().unwrap(), "episub.json");
        assert!(config.fetcher.is_none());
    }

    #[test]
    fn test_deserialize_download_section() {
        let toml = r#"
[download]
client = "deluge"
destination = "/data/anime"

[download.agents]
deluge = "/opt/episub/deluge-agent"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.download.client, "deluge");
        assert_eq!(config.download.destination, "/data/anime");
        assert_eq!(config.download.jsonrpc, "http://localhost:6800/jsonrpc");
        assert_eq!(
            config.download.agents.deluge.to_str().unwrap(),
            "/opt/episub/deluge-agent"
        );
        assert_eq!(config.download.agents.aria2.to_str().unwrap(), "episub-aria2");
    }

    #[test]
    fn test_deserialize_with_fetcher_config() {
        let toml = r#"
[fetcher]
url = "http://localhost:9117/rss.xml"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let fetcher = config.fetcher.as_ref().unwrap();
        assert_eq!(fetcher.url, "http://localhost:9117/rss.xml");
        assert_eq!(fetcher.query_param, "keyword");
        assert_eq!(fetcher.timeout_secs, 30); // default
    }

    #[test]
    fn test_deserialize_fetcher_without_url_fails() {
        let toml = r#"
[fetcher]
timeout_secs = 10
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_download_defaults() {
        let config = Config::default();
        assert_eq!(config.get("client"), Some("aria2"));
        assert_eq!(config.get("destination"), Some("."));
        assert_eq!(config.get("jsonrpc"), Some("http://localhost:6800/jsonrpc"));
        assert_eq!(config.get("password"), None);
    }
}
