//! Periodic check for a newer release on the package registry.
//!
//! Never blocks a flow: callers log failures and carry on.

pub mod cache;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::UpdateCheckConfig;
use crate::error::{AppError, Result};

pub use cache::{CacheRecord, FileCache, MemoryCache, UpdateCache};

/// Ten years; longer intervals are treated as this.
const MAX_INTERVAL_HOURS: u64 = 24 * 365 * 10;

#[async_trait]
pub trait Registry: Send + Sync {
    /// Newest published version of `name`.
    async fn latest_version(&self, name: &str) -> Result<String>;
}

/// crates.io-compatible registry API.
pub struct CratesIoRegistry {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_version: String,
}

impl CratesIoRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Registry for CratesIoRegistry {
    async fn latest_version(&self, name: &str) -> Result<String> {
        let url = format!("{}/{name}", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpdateCheck(format!("{url} returned {status}")));
        }

        let body = response.text().await?;
        parse_max_version(&body)
    }
}

/// Pull `crate.max_version` out of a registry response body.
pub fn parse_max_version(body: &str) -> Result<String> {
    let parsed: CrateResponse = serde_json::from_str(body)?;
    Ok(parsed.krate.max_version)
}

/// Compares the installed version against the registry at most once per interval.
pub struct UpdateChecker<R, C> {
    registry: R,
    cache: C,
    package: String,
    current: String,
    interval: chrono::Duration,
}

impl<R: Registry, C: UpdateCache> UpdateChecker<R, C> {
    pub fn new(registry: R, cache: C, package: &str, current: &str, interval_hours: u64) -> Self {
        Self {
            registry,
            cache,
            package: package.to_string(),
            current: current.to_string(),
            interval: chrono::Duration::hours(interval_hours.min(MAX_INTERVAL_HOURS) as i64),
        }
    }

    /// Whether enough time has passed since the last recorded check.
    ///
    /// An unreadable record or one dated in the future counts as due, so the
    /// next successful check replaces it.
    pub fn is_due(&self, now: DateTime<Utc>) -> Result<bool> {
        let record = match self.cache.read() {
            Ok(record) => record,
            Err(AppError::CacheFormat(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable update-check cache");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(match record {
            Some(record) if record.last_checked > now => {
                tracing::debug!(last_checked = %record.last_checked, "Update-check cache is dated in the future");
                true
            }
            Some(record) => now - record.last_checked >= self.interval,
            None => true,
        })
    }

    /// The newer published version, if the registry has one.
    ///
    /// Returns `None` without a network call while the last check is still fresh.
    pub async fn check(&self, now: DateTime<Utc>) -> Result<Option<String>> {
        if !self.is_due(now)? {
            tracing::debug!("Update check skipped, last check is recent");
            return Ok(None);
        }

        let latest = self.registry.latest_version(&self.package).await?;
        self.cache.write(&CacheRecord {
            last_checked: now,
            latest_version: Some(latest.clone()),
        })?;

        if is_newer(&latest, &self.current) {
            Ok(Some(latest))
        } else {
            Ok(None)
        }
    }
}

/// Check this package against crates.io using `config`.
pub async fn check_for_update(config: &UpdateCheckConfig) -> Result<Option<String>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let registry = CratesIoRegistry::new(&config.registry_url, timeout)?;
    let checker = UpdateChecker::new(
        registry,
        FileCache::default_location()?,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.interval_hours,
    );

    tokio::time::timeout(timeout, checker.check(Utc::now()))
        .await
        .map_err(|_| AppError::UpdateCheck("timed out".to_string()))?
}

/// Numeric comparison of dotted versions; pre-release and build tails are ignored.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    version_parts(candidate) > version_parts(current)
}

fn version_parts(version: &str) -> Vec<u64> {
    let core = version
        .trim()
        .trim_start_matches('v')
        .split(&['-', '+'][..])
        .next()
        .unwrap_or("");
    let mut parts: Vec<u64> = core
        .split('.')
        .map(|p| p.parse().unwrap_or(0))
        .collect();
    while parts.len() < 3 {
        parts.push(0);
    }
    parts
}
