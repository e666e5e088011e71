//! Shared application state for request handlers.

use std::sync::Arc;

use crate::coffee::{CoffeeClient, SimpleCoffeeService};
use crate::config::AppConfig;
use crate::health::{DetailedHealthChecker, SimpleHealthChecker};
use crate::metrics::Metrics;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Checkers and services are cheap wrappers built per request from the
/// configuration and the shared upstream client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub coffee: Arc<dyn CoffeeClient>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: AppConfig, coffee: Arc<dyn CoffeeClient>, metrics: Metrics) -> Self {
        Self {
            config: Arc::new(config),
            coffee,
            metrics: Arc::new(metrics),
        }
    }

    pub fn simple_health_checker(&self) -> SimpleHealthChecker {
        SimpleHealthChecker::new(
            self.coffee.clone(),
            self.config.app_version.clone(),
            self.config.git_commit_sha.clone(),
        )
    }

    pub fn detailed_health_checker(&self) -> DetailedHealthChecker {
        DetailedHealthChecker::new(
            self.coffee.clone(),
            self.config.app_version.clone(),
            self.config.git_commit_sha.clone(),
        )
    }

    pub fn coffee_service(&self) -> SimpleCoffeeService {
        SimpleCoffeeService::new(self.coffee.clone())
    }
}
