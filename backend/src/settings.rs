//! Service configuration loaded via OrthoConfig.
//!
//! Every value may come from a CLI flag or a `SHOP_*` environment variable.
//! The listen port carries its default in the derive; the remaining fields
//! stay optional so that unset values fall back to defaults in the
//! accessors; accessors also clamp values that would make no sense (a zero
//! capacity, a retry cap below the initial delay).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::IndexSyncWorkerConfig;
use crate::domain::ports::{IndexName, IndexNameValidationError};

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ITEMS_INDEX: &str = "items";
const DEFAULT_ELASTIC_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OUTBOX_CAPACITY: usize = 1024;
const DEFAULT_SHUTDOWN_DRAIN_SECS: u64 = 5;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 2;

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_host` is not an IP address.
    #[error("invalid bind host {value:?}: expected an IP address")]
    InvalidBindHost { value: String },
    /// `elastic_url` does not parse as an absolute URL.
    #[error("invalid elastic url {value:?}: {message}")]
    InvalidElasticUrl { value: String, message: String },
    /// `elastic_items_index` is not a valid index name.
    #[error("invalid items index name {value:?}: {source}")]
    InvalidIndexName {
        value: String,
        #[source]
        source: IndexNameValidationError,
    },
}

/// Configuration for the items service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHOP")]
pub struct AppSettings {
    /// HTTP listen port.
    #[ortho_config(default = 3002)]
    pub server_port: u16,
    /// HTTP listen address.
    pub bind_host: Option<String>,
    /// PostgreSQL URL for the primary store; unset keeps items in memory.
    pub database_url: Option<String>,
    /// Connection pool size.
    pub db_max_connections: Option<u32>,
    /// Elasticsearch base URL; unset keeps the search index in memory.
    pub elastic_url: Option<String>,
    /// Name of the items index.
    pub elastic_items_index: Option<String>,
    /// Mapping type for clusters that still require one.
    pub elastic_items_type: Option<String>,
    /// Per-request timeout for search calls, in seconds.
    pub elastic_timeout_secs: Option<u64>,
    /// Pending index mutations held before new ones are dropped.
    pub index_outbox_capacity: Option<usize>,
    /// Attempts per index mutation, including the first.
    pub index_max_attempts: Option<u32>,
    /// First retry delay, in milliseconds.
    pub index_initial_backoff_ms: Option<u64>,
    /// Retry delay cap, in milliseconds.
    pub index_max_backoff_ms: Option<u64>,
    /// How long probes report draining before the listener stops, in seconds.
    pub shutdown_grace_secs: Option<u64>,
    /// How long shutdown waits for the index outbox to drain, in seconds.
    pub shutdown_drain_secs: Option<u64>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

fn positive_or<T: PartialEq + Default + Copy>(value: Option<T>, default: T) -> T {
    value.filter(|value| *value != T::default()).unwrap_or(default)
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindHost`] when the host is not an IP.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = non_blank(self.bind_host.as_ref()).unwrap_or(DEFAULT_BIND_HOST);
        let ip: IpAddr = host.parse().map_err(|_| SettingsError::InvalidBindHost {
            value: host.to_owned(),
        })?;
        Ok(SocketAddr::new(ip, self.server_port))
    }

    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    pub fn db_max_connections(&self) -> u32 {
        positive_or(self.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Parsed Elasticsearch base URL, if one is configured.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidElasticUrl`] when the value is set but
    /// does not parse.
    pub fn elastic_url(&self) -> Result<Option<Url>, SettingsError> {
        non_blank(self.elastic_url.as_ref())
            .map(|raw| {
                Url::parse(raw).map_err(|error| SettingsError::InvalidElasticUrl {
                    value: raw.to_owned(),
                    message: error.to_string(),
                })
            })
            .transpose()
    }

    /// Validated items index name.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidIndexName`] for names Elasticsearch
    /// would reject.
    pub fn items_index(&self) -> Result<IndexName, SettingsError> {
        let raw = non_blank(self.elastic_items_index.as_ref()).unwrap_or(DEFAULT_ITEMS_INDEX);
        IndexName::new(raw).map_err(|source| SettingsError::InvalidIndexName {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn items_document_type(&self) -> Option<String> {
        non_blank(self.elastic_items_type.as_ref()).map(str::to_owned)
    }

    pub fn elastic_timeout(&self) -> Duration {
        Duration::from_secs(positive_or(
            self.elastic_timeout_secs,
            DEFAULT_ELASTIC_TIMEOUT_SECS,
        ))
    }

    pub fn index_outbox_capacity(&self) -> usize {
        positive_or(self.index_outbox_capacity, DEFAULT_OUTBOX_CAPACITY)
    }

    /// Retry policy for the index sync worker.
    pub fn index_sync_worker(&self) -> IndexSyncWorkerConfig {
        let defaults = IndexSyncWorkerConfig::default();
        let initial_backoff = self
            .index_initial_backoff_ms
            .map_or(defaults.initial_backoff, Duration::from_millis);
        let max_backoff = self
            .index_max_backoff_ms
            .map_or(defaults.max_backoff, Duration::from_millis)
            .max(initial_backoff);
        IndexSyncWorkerConfig {
            max_attempts: positive_or(self.index_max_attempts, defaults.max_attempts),
            initial_backoff,
            max_backoff,
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(
            self.shutdown_grace_secs
                .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS),
        )
    }

    pub fn shutdown_drain(&self) -> Duration {
        Duration::from_secs(
            self.shutdown_drain_secs
                .unwrap_or(DEFAULT_SHUTDOWN_DRAIN_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARIABLES: [&str; 14] = [
        "SHOP_SERVER_PORT",
        "SHOP_BIND_HOST",
        "SHOP_DATABASE_URL",
        "SHOP_DB_MAX_CONNECTIONS",
        "SHOP_ELASTIC_URL",
        "SHOP_ELASTIC_ITEMS_INDEX",
        "SHOP_ELASTIC_ITEMS_TYPE",
        "SHOP_ELASTIC_TIMEOUT_SECS",
        "SHOP_INDEX_OUTBOX_CAPACITY",
        "SHOP_INDEX_MAX_ATTEMPTS",
        "SHOP_INDEX_INITIAL_BACKOFF_MS",
        "SHOP_INDEX_MAX_BACKOFF_MS",
        "SHOP_SHUTDOWN_GRACE_SECS",
        "SHOP_SHUTDOWN_DRAIN_SECS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("shop-items")]).expect("config should load")
    }

    fn environment(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARIABLES
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(environment(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default bind address"),
            "0.0.0.0:3002".parse::<SocketAddr>().expect("socket address")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.elastic_url().expect("no url"), None);
        assert_eq!(settings.items_index().expect("index").as_str(), "items");
        assert!(settings.items_document_type().is_none());
        assert_eq!(settings.elastic_timeout(), Duration::from_secs(10));
        assert_eq!(settings.index_outbox_capacity(), 1024);
        assert_eq!(settings.index_sync_worker(), IndexSyncWorkerConfig::default());
        assert_eq!(settings.shutdown_grace(), Duration::from_secs(2));
        assert_eq!(settings.shutdown_drain(), Duration::from_secs(5));
    }

    #[rstest]
    fn loads_without_any_configuration() {
        let _guard = lock_env(environment(&[]));

        let settings = AppSettings::load_from_iter([OsString::from("shop-items")])
            .expect("defaults alone must be a loadable configuration");
        assert_eq!(settings.server_port, 3002);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(environment(&[
            ("SHOP_SERVER_PORT", "8080"),
            ("SHOP_BIND_HOST", "127.0.0.1"),
            ("SHOP_DATABASE_URL", "postgres://shop@localhost/shop"),
            ("SHOP_ELASTIC_URL", "http://localhost:9200"),
            ("SHOP_ELASTIC_ITEMS_INDEX", "catalogue"),
            ("SHOP_ELASTIC_ITEMS_TYPE", "item"),
            ("SHOP_INDEX_MAX_ATTEMPTS", "3"),
            ("SHOP_INDEX_INITIAL_BACKOFF_MS", "50"),
            ("SHOP_INDEX_MAX_BACKOFF_MS", "400"),
            ("SHOP_SHUTDOWN_GRACE_SECS", "0"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind address"),
            "127.0.0.1:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://shop@localhost/shop")
        );
        assert_eq!(
            settings
                .elastic_url()
                .expect("valid url")
                .map(|url| url.to_string()),
            Some("http://localhost:9200/".to_owned())
        );
        assert_eq!(settings.items_index().expect("index").as_str(), "catalogue");
        assert_eq!(settings.items_document_type().as_deref(), Some("item"));
        assert_eq!(
            settings.index_sync_worker(),
            IndexSyncWorkerConfig {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(50),
                max_backoff: Duration::from_millis(400),
            }
        );
        assert_eq!(settings.shutdown_grace(), Duration::ZERO);
    }

    #[rstest]
    fn nonsensical_values_fall_back_or_clamp() {
        let settings = AppSettings {
            db_max_connections: Some(0),
            index_outbox_capacity: Some(0),
            index_max_attempts: Some(0),
            index_initial_backoff_ms: Some(1_000),
            index_max_backoff_ms: Some(10),
            database_url: Some("   ".to_owned()),
            ..AppSettings::default()
        };

        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.index_outbox_capacity(), 1024);
        assert!(settings.database_url().is_none());
        let worker = settings.index_sync_worker();
        assert_eq!(worker.max_attempts, 5);
        assert_eq!(worker.max_backoff, Duration::from_secs(1));
    }

    #[rstest]
    #[case(AppSettings { bind_host: Some("localhost:80".to_owned()), ..AppSettings::default() })]
    #[case(AppSettings { elastic_url: Some("not a url".to_owned()), ..AppSettings::default() })]
    #[case(AppSettings { elastic_items_index: Some("Items".to_owned()), ..AppSettings::default() })]
    fn invalid_values_are_reported(#[case] settings: AppSettings) {
        let failures = [
            settings.bind_addr().err(),
            settings.elastic_url().err(),
            settings.items_index().err(),
        ];
        assert_eq!(failures.iter().flatten().count(), 1);
    }
}
