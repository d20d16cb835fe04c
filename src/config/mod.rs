mod app_config;

pub use app_config::{
    AppConfig, DatabaseConfig, EmbedConfig, RemoteConfigSettings, ServerConfig, SessionConfig,
    StoreBackend, StoreConfig,
};
