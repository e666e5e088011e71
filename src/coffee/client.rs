//! HTTP client for the upstream coffee API.
//!
//! Upstream records are loosely typed: `image` may be any value and
//! `ingredients` may be a list or a single comma-separated string. Both are
//! normalized while deserializing so the domain [`Drink`] stays strict.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::{CoffeeClient, CoffeeClientError, Drink};
use crate::config::CoffeeApiConfig;

/// Path of the hot drinks collection, also used as the reachability target
pub const HOT_ENDPOINT: &str = "/hot";

/// Path of the iced drinks collection
pub const ICED_ENDPOINT: &str = "/iced";

/// Separator used when upstream flattens ingredients into one string
const INGREDIENT_SEPARATOR: &str = ", ";

/// Wire shape of a single upstream drink record
#[derive(Debug, Deserialize)]
struct DrinkRecord {
    id: i64,
    title: String,
    description: String,
    #[serde(default, deserialize_with = "secure_image")]
    image: Option<Url>,
    #[serde(default, deserialize_with = "ingredient_list")]
    ingredients: Vec<String>,
}

impl From<DrinkRecord> for Drink {
    fn from(record: DrinkRecord) -> Self {
        Drink {
            id: record.id,
            title: record.title,
            description: record.description,
            image: record.image,
            ingredients: record.ingredients,
        }
    }
}

/// Keeps the image only when it is a string containing `https://` that parses
/// as an http(s) URL. Any other value becomes `None` instead of an error.
fn secure_image<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if s.contains("https://") => Url::parse(&s)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https")),
        _ => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientsWire {
    List(Vec<String>),
    Joined(String),
}

fn ingredient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IngredientsWire>::deserialize(deserializer)? {
        Some(IngredientsWire::List(list)) => list,
        Some(IngredientsWire::Joined(joined)) => joined
            .split(INGREDIENT_SEPARATOR)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}

/// Parse a response body into drinks. The body must be a JSON array of records.
pub fn parse_drinks(endpoint: &str, body: &[u8]) -> Result<Vec<Drink>, CoffeeClientError> {
    let records: Vec<DrinkRecord> =
        serde_json::from_slice(body).map_err(|source| CoffeeClientError::Malformed {
            endpoint: endpoint.to_string(),
            source,
        })?;
    Ok(records.into_iter().map(Drink::from).collect())
}

/// [`CoffeeClient`] backed by `reqwest`.
///
/// Each call is a single GET with no retries. Dropping the returned future
/// aborts the in-flight request.
#[derive(Clone)]
pub struct HttpCoffeeClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCoffeeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    /// Build from the `[coffee_api]` config section
    pub fn from_config(config: &CoffeeApiConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.host.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Use an existing `reqwest::Client` (shared connection pool)
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn fetch(&self, endpoint: &str) -> Result<Vec<Drink>, CoffeeClientError> {
        let transport = |source| CoffeeClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoffeeClientError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let drinks = parse_drinks(endpoint, &body)?;
        tracing::debug!(endpoint, count = drinks.len(), "Fetched coffee drinks");
        Ok(drinks)
    }
}

#[async_trait]
impl CoffeeClient for HttpCoffeeClient {
    async fn healthy(&self) -> bool {
        tracing::debug!(base_url = %self.base_url, "Performing healthcheck");
        match self.http.get(self.url(HOT_ENDPOINT)).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    tracing::debug!(status = %response.status(), "Upstream reported failure");
                }
                healthy
            }
            Err(e) => {
                tracing::debug!(error = %e, "Upstream unreachable");
                false
            }
        }
    }

    async fn get_hot(&self) -> Result<Vec<Drink>, CoffeeClientError> {
        tracing::debug!("Fetching hot coffee drinks");
        self.fetch(HOT_ENDPOINT).await
    }

    async fn get_iced(&self) -> Result<Vec<Drink>, CoffeeClientError> {
        tracing::debug!("Fetching iced coffee drinks");
        self.fetch(ICED_ENDPOINT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpCoffeeClient {
        HttpCoffeeClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn parse_one(record: serde_json::Value) -> Drink {
        let body = serde_json::to_vec(&json!([record])).unwrap();
        parse_drinks(HOT_ENDPOINT, &body).unwrap().remove(0)
    }

    #[test]
    fn test_insecure_image_dropped() {
        let drink = parse_one(json!({
            "id": 1, "title": "Latte", "description": "d",
            "image": "http://insecure.example/x.jpg",
        }));
        assert_eq!(drink.image, None);
    }

    #[test]
    fn test_secure_image_kept() {
        let drink = parse_one(json!({
            "id": 1, "title": "Latte", "description": "d",
            "image": "https://secure.example/x.jpg",
        }));
        assert_eq!(
            drink.image.as_ref().map(Url::as_str),
            Some("https://secure.example/x.jpg")
        );
    }

    #[test]
    fn test_non_string_and_malformed_images_dropped() {
        for image in [
            json!(null),
            json!(42),
            json!(["https://x"]),
            json!("see https://"),
            json!("javascript:alert('https://x')"),
            json!("ftp://files.example/a.jpg?u=https://x"),
            json!("xhttps://evil"),
        ] {
            let drink = parse_one(json!({
                "id": 1, "title": "Latte", "description": "d", "image": image,
            }));
            assert_eq!(drink.image, None);
        }
    }

    #[test]
    fn test_missing_ingredients_default_empty() {
        let drink = parse_one(json!({"id": 1, "title": "Latte", "description": "d"}));
        assert!(drink.ingredients.is_empty());
        assert_eq!(drink.image, None);
    }

    #[test]
    fn test_joined_ingredients_split() {
        let drink = parse_one(json!({
            "id": 1, "title": "Latte", "description": "d",
            "ingredients": "coffee, milk",
        }));
        assert_eq!(drink.ingredients, vec!["coffee", "milk"]);
    }

    #[test]
    fn test_ingredient_list_kept_in_order() {
        let drink = parse_one(json!({
            "id": 1, "title": "Mocha", "description": "d",
            "ingredients": ["espresso", "chocolate", "milk"],
        }));
        assert_eq!(drink.ingredients, vec!["espresso", "chocolate", "milk"]);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let body = br#"[{"id": 1, "description": "d"}]"#;
        let err = parse_drinks(HOT_ENDPOINT, body).unwrap_err();
        assert!(matches!(err, CoffeeClientError::Malformed { .. }));
    }

    #[test]
    fn test_invalid_ingredients_is_malformed() {
        let body = br#"[{"id": 1, "title": "t", "description": "d", "ingredients": 5}]"#;
        assert!(parse_drinks(HOT_ENDPOINT, body).is_err());
    }

    #[tokio::test]
    async fn test_get_hot_parses_drinks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Espresso", "description": "d",
                 "image": "https://x", "ingredients": ["coffee"]},
                {"id": 2, "title": "Latte", "description": "d",
                 "image": null, "ingredients": "espresso, steamed milk"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let drinks = client_for(&server).get_hot().await.unwrap();
        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0].title, "Espresso");
        assert!(drinks[0].image.is_some());
        assert_eq!(drinks[1].ingredients, vec!["espresso", "steamed milk"]);
    }

    #[tokio::test]
    async fn test_get_hot_not_found_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).get_hot().await.unwrap_err();
        match err {
            CoffeeClientError::Status { endpoint, status } => {
                assert_eq!(endpoint, "/hot");
                assert_eq!(status, StatusCode::NOT_FOUND);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_hot_object_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server).get_hot().await.unwrap_err();
        assert!(matches!(err, CoffeeClientError::Malformed { .. }));
        assert_eq!(err.endpoint(), "/hot");
    }

    #[tokio::test]
    async fn test_get_iced_uses_iced_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/iced"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 9, "title": "Iced Coffee", "description": "cold"}
            ])))
            .mount(&server)
            .await;

        let drinks = client_for(&server).get_iced().await.unwrap();
        assert_eq!(drinks[0].id, 9);
    }

    #[tokio::test]
    async fn test_get_all_fails_without_partial_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Espresso", "description": "d"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/iced"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).get_all().await.unwrap_err();
        assert_eq!(err.endpoint(), "/iced");
    }

    #[tokio::test]
    async fn test_healthy_true_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(client_for(&server).healthy().await);
    }

    #[tokio::test]
    async fn test_healthy_false_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hot"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(!client_for(&server).healthy().await);
    }

    #[tokio::test]
    async fn test_healthy_false_when_unreachable() {
        // Port 9 (discard) on loopback is not expected to accept HTTP
        let client =
            HttpCoffeeClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(!client.healthy().await);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = HttpCoffeeClient::with_client("http://upstream/coffee/", reqwest::Client::new());
        assert_eq!(client.base_url(), "http://upstream/coffee");
        assert_eq!(client.url(HOT_ENDPOINT), "http://upstream/coffee/hot");
    }
}
