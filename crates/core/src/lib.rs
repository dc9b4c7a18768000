pub mod config;
pub mod database;
pub mod download;
pub mod fetcher;
pub mod subscription;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, DownloadConfig, FetcherConfig, StoreConfig,
};
pub use database::{
    Database, DatabaseError, JsonFileStore, Store, StoreError, SubscriptionKey, UpdateReport,
    SCHEMA_VERSION,
};
pub use download::{
    is_supported_client, DispatchError, Dispatcher, DownloadAgent, DownloadClient,
    DownloadOptions,
};
pub use fetcher::{parse_episodes, FeedQuery, FetchError, Fetcher, RssFetcher};
pub use subscription::{EpisodeSelector, SelectorError, Subscription, Thread, ThreadId};
