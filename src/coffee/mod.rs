//! Coffee domain: the drink entity, the upstream client capability and the
//! recommendation service built on top of it.

pub mod client;
pub mod service;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

pub use client::HttpCoffeeClient;
pub use service::{CoffeeService, SimpleCoffeeService};

/// A beverage as served by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Only secure (`https://`) image links are kept
    pub image: Option<Url>,
    pub ingredients: Vec<String>,
}

/// Error type for upstream fetch operations
#[derive(Debug, thiserror::Error)]
pub enum CoffeeClientError {
    #[error("Error fetching data from {endpoint}: {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("Malformed data from {endpoint} endpoint: {source}")]
    Malformed {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
}

impl CoffeeClientError {
    /// Upstream path the failing call targeted
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Status { endpoint, .. }
            | Self::Malformed { endpoint, .. }
            | Self::Transport { endpoint, .. } => endpoint,
        }
    }
}

/// Access to the upstream beverage API.
///
/// `healthy` answers whether the upstream is reachable and never fails; the
/// fetch operations surface every failure as a [`CoffeeClientError`].
#[async_trait]
pub trait CoffeeClient: Send + Sync {
    /// Lightweight reachability probe
    async fn healthy(&self) -> bool;

    /// Hot drinks collection
    async fn get_hot(&self) -> Result<Vec<Drink>, CoffeeClientError>;

    /// Iced drinks collection
    async fn get_iced(&self) -> Result<Vec<Drink>, CoffeeClientError>;

    /// Hot drinks followed by iced drinks. Either failure fails the whole call.
    async fn get_all(&self) -> Result<Vec<Drink>, CoffeeClientError> {
        tracing::debug!("Fetching all coffee drinks");
        let mut drinks = self.get_hot().await?;
        drinks.extend(self.get_iced().await?);
        Ok(drinks)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{drink, StaticClient};
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_get_all_concatenates_hot_then_iced() {
        let client = StaticClient::new(
            Some(vec![drink(1, "Latte"), drink(2, "Espresso")]),
            Some(vec![drink(3, "Iced Coffee")]),
        );

        let ids: Vec<i64> = client.get_all().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_all_fails_when_iced_fails() {
        let client = StaticClient::new(Some(vec![drink(1, "Latte")]), None);

        let err = client.get_all().await.unwrap_err();
        assert_eq!(err.endpoint(), "/iced");
    }

    #[tokio::test]
    async fn test_get_all_stops_after_hot_failure() {
        let client = StaticClient::new(None, Some(vec![drink(3, "Iced Coffee")]));

        let err = client.get_all().await.unwrap_err();
        assert_eq!(err.endpoint(), "/hot");
        assert_eq!(client.iced_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drink_serializes_image_as_string() {
        let mut d = drink(7, "Espresso");
        d.image = Some(Url::parse("https://img.example/e.jpg").unwrap());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["image"], "https://img.example/e.jpg");
        assert_eq!(json["ingredients"], serde_json::json!(["coffee"]));
    }
}
