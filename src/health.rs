//! Dependency health aggregation.
//!
//! A [`HealthChecker`] probes every registered dependency, records a
//! [`HealthIndicator`] per dependency and folds them into a single heartbeat.
//! The output type is chosen by the [`StatusShape`] parameter: the simple
//! shape drops the per-dependency breakdown, the detailed shape keeps it.
//!
//! `check()` cannot fail. A probe that panics is recorded as unhealthy.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::coffee::CoffeeClient;

/// Name under which the upstream coffee API is reported
pub const COFFEE_DEPENDENCY: &str = "coffee";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthIndicator {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthIndicator {
    fn from(healthy: bool) -> Self {
        if healthy {
            HealthIndicator::Healthy
        } else {
            HealthIndicator::Unhealthy
        }
    }
}

/// Per-dependency results keyed by dependency name
pub type HealthChecks = BTreeMap<String, HealthIndicator>;

/// `Healthy` iff every indicator is healthy. An empty set is healthy.
pub fn aggregate<'a, I>(indicators: I) -> HealthIndicator
where
    I: IntoIterator<Item = &'a HealthIndicator>,
{
    indicators
        .into_iter()
        .all(|i| *i == HealthIndicator::Healthy)
        .into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleHealthStatus {
    pub git_commit_sha: String,
    pub heartbeat: HealthIndicator,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthStatus {
    pub git_commit_sha: String,
    pub heartbeat: HealthIndicator,
    pub version: String,
    pub checks: HealthChecks,
}

/// Builds a status value from the aggregated results.
pub trait StatusShape {
    fn build(version: &str, git_sha: &str, heartbeat: HealthIndicator, checks: HealthChecks)
        -> Self;
}

impl StatusShape for SimpleHealthStatus {
    fn build(version: &str, git_sha: &str, heartbeat: HealthIndicator, _: HealthChecks) -> Self {
        Self {
            git_commit_sha: git_sha.to_string(),
            heartbeat,
            version: version.to_string(),
        }
    }
}

impl StatusShape for DetailedHealthStatus {
    fn build(
        version: &str,
        git_sha: &str,
        heartbeat: HealthIndicator,
        checks: HealthChecks,
    ) -> Self {
        Self {
            git_commit_sha: git_sha.to_string(),
            heartbeat,
            version: version.to_string(),
            checks,
        }
    }
}

/// A dependency whose reachability contributes to the heartbeat.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn probe(&self) -> bool;
}

/// Reports the upstream coffee API through [`CoffeeClient::healthy`].
pub struct CoffeeProbe {
    client: Arc<dyn CoffeeClient>,
}

impl CoffeeProbe {
    pub fn new(client: Arc<dyn CoffeeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthProbe for CoffeeProbe {
    fn name(&self) -> &str {
        COFFEE_DEPENDENCY
    }

    async fn probe(&self) -> bool {
        self.client.healthy().await
    }
}

pub struct HealthChecker<S> {
    dependencies: Vec<Arc<dyn HealthProbe>>,
    app_version: String,
    git_sha: String,
    _shape: PhantomData<fn() -> S>,
}

pub type SimpleHealthChecker = HealthChecker<SimpleHealthStatus>;
pub type DetailedHealthChecker = HealthChecker<DetailedHealthStatus>;

impl<S: StatusShape> HealthChecker<S> {
    /// Checker over the upstream coffee API.
    pub fn new(
        coffee_client: Arc<dyn CoffeeClient>,
        app_version: impl Into<String>,
        git_sha: impl Into<String>,
    ) -> Self {
        Self::with_probes(
            vec![Arc::new(CoffeeProbe::new(coffee_client))],
            app_version,
            git_sha,
        )
    }

    /// Checker over an explicit set of dependencies.
    pub fn with_probes(
        dependencies: Vec<Arc<dyn HealthProbe>>,
        app_version: impl Into<String>,
        git_sha: impl Into<String>,
    ) -> Self {
        Self {
            dependencies,
            app_version: app_version.into(),
            git_sha: git_sha.into(),
            _shape: PhantomData,
        }
    }

    pub async fn check(&self) -> S {
        let results = self.run_probes().await;
        let heartbeat = aggregate(results.iter().map(|(_, indicator)| indicator));

        let mut checks = HealthChecks::new();
        for (name, indicator) in results {
            // Duplicate names keep the worst result
            checks
                .entry(name)
                .and_modify(|existing| {
                    if indicator == HealthIndicator::Unhealthy {
                        *existing = indicator;
                    }
                })
                .or_insert(indicator);
        }

        if heartbeat == HealthIndicator::Unhealthy {
            tracing::warn!(checks = ?checks, "Health check reported unhealthy dependencies");
        }

        S::build(&self.app_version, &self.git_sha, heartbeat, checks)
    }

    async fn run_probes(&self) -> Vec<(String, HealthIndicator)> {
        let probes = self.dependencies.iter().map(|dependency| async move {
            let healthy = AssertUnwindSafe(dependency.probe())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    tracing::error!(dependency = dependency.name(), "Health probe panicked");
                    false
                });
            (dependency.name().to_string(), HealthIndicator::from(healthy))
        });
        join_all(probes).await
    }
}
