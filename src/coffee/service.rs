//! Drink recommendation.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CoffeeClient, CoffeeClientError, Drink};

/// Title of the drink the simple service recommends
pub const RECOMMENDED_TITLE: &str = "Espresso";

#[async_trait]
pub trait CoffeeService: Send + Sync {
    /// Recommend a drink. `Ok(None)` means nothing suitable was found.
    async fn recommend(&self) -> Result<Option<Drink>, CoffeeClientError>;
}

/// Recommends the first hot drink titled exactly "Espresso".
#[derive(Clone)]
pub struct SimpleCoffeeService {
    client: Arc<dyn CoffeeClient>,
}

impl SimpleCoffeeService {
    pub fn new(client: Arc<dyn CoffeeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CoffeeService for SimpleCoffeeService {
    async fn recommend(&self) -> Result<Option<Drink>, CoffeeClientError> {
        tracing::debug!("Recommending a drink");
        let drinks = self.client.get_hot().await?;

        match drinks.into_iter().find(|d| d.title == RECOMMENDED_TITLE) {
            Some(espresso) => {
                tracing::debug!(id = espresso.id, "Recommending espresso");
                Ok(Some(espresso))
            }
            None => {
                tracing::warn!("Espresso not found");
                Ok(None)
            }
        }
    }
}
