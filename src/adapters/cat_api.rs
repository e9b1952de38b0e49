use crate::domain::model::{Breed, Candidate, SearchHit};
use crate::domain::ports::{ConfigProvider, RecordSource};
use crate::utils::error::{FinderError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.thecatapi.com/v1";

const API_KEY_HEADER: &str = "x-api-key";

// TheCatAPI 回傳格式，所有欄位都先當成可選，再自行檢查
#[derive(Debug, Deserialize)]
struct ImagePayload {
    id: Option<String>,
    url: Option<String>,
    #[serde(default)]
    breeds: Option<Vec<BreedPayload>>,
}

#[derive(Debug, Deserialize)]
struct BreedPayload {
    name: Option<String>,
    origin: Option<String>,
    life_span: Option<String>,
    temperament: Option<String>,
    weight: Option<WeightPayload>,
}

#[derive(Debug, Deserialize)]
struct WeightPayload {
    imperial: Option<String>,
    metric: Option<String>,
}

/// `RecordSource` backed by TheCatAPI's `images/search` and `images/{id}`.
#[derive(Debug, Clone)]
pub struct CatApiSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatApiSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Builds the client (timeout included) from any config provider.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| FinderError::MissingConfigError {
                field: "api_key".to_string(),
            })?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, config.api_base_url(), api_key))
    }

    fn search_url(&self) -> String {
        format!("{}/images/search", self.base_url)
    }

    fn image_url(&self, id: &str) -> String {
        format!("{}/images/{}", self.base_url, id)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!("API response status: {} ({})", status, what);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FinderError::AuthError {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FinderError::HttpStatusError {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| FinderError::malformed(format!("{} response is not valid: {}", what, e)))
    }
}

#[async_trait::async_trait]
impl RecordSource for CatApiSource {
    async fn search(&self) -> Result<SearchHit> {
        let url = self.search_url();
        tracing::debug!("Making search request to: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("has_breeds", "1"), ("api_key", self.api_key.as_str())])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let hits: Vec<ImagePayload> = Self::read_json(response, "search").await?;
        let first = hits.into_iter().next().ok_or(FinderError::EmptySearchResult)?;

        Ok(SearchHit {
            id: first
                .id
                .ok_or_else(|| FinderError::malformed("search result has no 'id'"))?,
            url: first
                .url
                .ok_or_else(|| FinderError::malformed("search result has no 'url'"))?,
        })
    }

    async fn fetch(&self, id: &str) -> Result<Candidate> {
        let url = self.image_url(id);
        tracing::debug!("Fetching image record from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let payload: ImagePayload = Self::read_json(response, "image").await?;
        into_candidate(payload)
    }
}

fn into_candidate(payload: ImagePayload) -> Result<Candidate> {
    let id = payload
        .id
        .ok_or_else(|| FinderError::malformed("image record has no 'id'"))?;
    let url = payload
        .url
        .ok_or_else(|| FinderError::malformed(format!("image record {} has no 'url'", id)))?;

    // 只使用第一個品種，與畫面顯示一致
    let breed = match payload.breeds.and_then(|breeds| breeds.into_iter().next()) {
        Some(b) => {
            let name = b.name.ok_or_else(|| {
                FinderError::malformed(format!("breed of image record {} has no 'name'", id))
            })?;
            let (weight_imperial, weight_metric) = match b.weight {
                Some(w) => (w.imperial, w.metric),
                None => (None, None),
            };
            Some(Breed {
                name,
                weight_imperial,
                weight_metric,
                origin: b.origin,
                life_span: b.life_span,
                temperament: b.temperament,
            })
        }
        None => None,
    };

    Ok(Candidate::new(id, url, breed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn abyssinian() -> serde_json::Value {
        serde_json::json!({
            "id": "0XYvRd7oD",
            "url": "https://cdn2.thecatapi.com/images/0XYvRd7oD.jpg",
            "width": 1204,
            "height": 1445,
            "breeds": [{
                "id": "abys",
                "name": "Abyssinian",
                "origin": "Egypt",
                "life_span": "14 - 15",
                "temperament": "Active, Energetic, Independent",
                "weight": { "imperial": "7  -  10", "metric": "3 - 5" }
            }]
        })
    }

    #[tokio::test]
    async fn test_search_sends_key_and_breed_filter() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/images/search")
                .query_param("has_breeds", "1")
                .query_param("api_key", "live_test")
                .header("x-api-key", "live_test");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "0XYvRd7oD", "url": "https://cdn2.thecatapi.com/images/0XYvRd7oD.jpg", "width": 1204, "height": 1445},
                    {"id": "other", "url": "https://cdn2.thecatapi.com/images/other.jpg"}
                ]));
        });

        let source = CatApiSource::new(server.base_url(), "live_test");
        let hit = source.search().await.unwrap();

        search_mock.assert();
        assert_eq!(hit.id, "0XYvRd7oD");
        assert_eq!(hit.url, "https://cdn2.thecatapi.com/images/0XYvRd7oD.jpg");
    }

    #[tokio::test]
    async fn test_fetch_maps_breed_fields() {
        let server = MockServer::start();
        let image_mock = server.mock(|when, then| {
            when.method(GET).path("/images/0XYvRd7oD");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(abyssinian());
        });

        let source = CatApiSource::new(format!("{}/", server.base_url()), "live_test");
        let candidate = source.fetch("0XYvRd7oD").await.unwrap();

        image_mock.assert();
        let breed = candidate.breed.unwrap();
        assert_eq!(breed.name, "Abyssinian");
        assert_eq!(breed.origin.as_deref(), Some("Egypt"));
        assert_eq!(breed.life_span.as_deref(), Some("14 - 15"));
        assert_eq!(breed.weight_imperial.as_deref(), Some("7  -  10"));
        assert_eq!(breed.weight_metric.as_deref(), Some("3 - 5"));
    }

    #[tokio::test]
    async fn test_fetch_without_breeds() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/images/plain");
            then.status(200)
                .json_body(serde_json::json!({"id": "plain", "url": "https://cdn.example/plain.jpg"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/images/empty");
            then.status(200).json_body(
                serde_json::json!({"id": "empty", "url": "https://cdn.example/empty.jpg", "breeds": []}),
            );
        });

        let source = CatApiSource::new(server.base_url(), "live_test");
        assert!(source.fetch("plain").await.unwrap().breed.is_none());
        assert!(source.fetch("empty").await.unwrap().breed.is_none());
    }

    #[tokio::test]
    async fn test_empty_search_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/images/search");
            then.status(200).json_body(serde_json::json!([]));
        });

        let source = CatApiSource::new(server.base_url(), "live_test");
        let err = source.search().await.unwrap_err();
        assert!(matches!(err, FinderError::EmptySearchResult));
    }

    #[tokio::test]
    async fn test_search_hit_without_url_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/images/search");
            then.status(200).json_body(serde_json::json!([{"id": "abc"}]));
        });

        let source = CatApiSource::new(server.base_url(), "live_test");
        let err = source.search().await.unwrap_err();
        assert!(matches!(err, FinderError::MalformedPayloadError { ref message } if message.contains("url")));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/images/search");
            then.status(401).body("{\"message\":\"unauthorized\"}");
        });

        let source = CatApiSource::new(server.base_url(), "wrong");
        let err = source.search().await.unwrap_err();
        assert!(matches!(err, FinderError::AuthError { status: 401 }));
    }

    #[tokio::test]
    async fn test_server_error_and_malformed_payloads() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/images/search");
            then.status(503);
        });
        server.mock(|when, then| {
            when.method(GET).path("/images/garbled");
            then.status(200).body("<html>not json</html>");
        });
        server.mock(|when, then| {
            when.method(GET).path("/images/nourl");
            then.status(200).json_body(serde_json::json!({"id": "nourl", "breeds": []}));
        });

        let source = CatApiSource::new(server.base_url(), "live_test");

        let err = source.search().await.unwrap_err();
        assert!(matches!(err, FinderError::HttpStatusError { status: 503, .. }));

        let err = source.fetch("garbled").await.unwrap_err();
        assert!(matches!(err, FinderError::MalformedPayloadError { .. }));

        let err = source.fetch("nourl").await.unwrap_err();
        assert!(matches!(err, FinderError::MalformedPayloadError { ref message } if message.contains("url")));
    }
}
