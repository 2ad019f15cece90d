use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a001_category::Category;
use contracts::domain::a002_unit_of_measure::UnitOfMeasure;
use contracts::domain::a003_item::CreateItemRequest;
use contracts::usecases::u101_import_items::{BulkCreateItemsRequest, BulkCreateItemsResponse};

use crate::shared::config::ItemsApiConfig;

/// Заголовок с ключом пакета для защиты от дублей при повторной отправке
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Внешний API хранения номенклатуры и справочников
#[async_trait]
pub trait ItemsApi: Send + Sync {
    /// Активные категории
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Единицы измерения
    async fn list_units(&self) -> Result<Vec<UnitOfMeasure>>;

    /// Пакетное создание: ответ содержит созданные записи и ошибки по строкам
    async fn bulk_create(
        &self,
        items: Vec<CreateItemRequest>,
        idempotency_key: &str,
    ) -> Result<BulkCreateItemsResponse>;
}

/// HTTP-клиент внешнего API номенклатуры
pub struct HttpItemsApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpItemsApi {
    pub fn new(config: &ItemsApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("Items API: GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error requesting {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {} from {}: {}", status, url, body);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON from {}: {}", url, e))
    }
}

#[async_trait]
impl ItemsApi for HttpItemsApi {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories: Vec<Category> = self.get_json("/api/categories?active=true").await?;
        tracing::info!("Items API: loaded {} categories", categories.len());
        Ok(categories)
    }

    async fn list_units(&self) -> Result<Vec<UnitOfMeasure>> {
        let units: Vec<UnitOfMeasure> = self.get_json("/api/uom-types").await?;
        tracing::info!("Items API: loaded {} units of measure", units.len());
        Ok(units)
    }

    async fn bulk_create(
        &self,
        items: Vec<CreateItemRequest>,
        idempotency_key: &str,
    ) -> Result<BulkCreateItemsResponse> {
        let url = format!("{}/api/items/bulk", self.base_url);
        let count = items.len();
        tracing::info!(
            "Items API: POST {} ({} items, key={})",
            url,
            count,
            idempotency_key
        );

        let response = self
            .authorize(self.client.post(&url))
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(&BulkCreateItemsRequest { items })
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Network error requesting {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {} from {}: {}", status, url, body);
        }

        let result: BulkCreateItemsResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON from {}: {}", url, e))?;

        tracing::info!(
            "Items API: bulk create finished, created={}, failed={}",
            result.created.len(),
            result.errors.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base_url: String) -> ItemsApiConfig {
        ItemsApiConfig {
            base_url,
            timeout_secs: 5,
            api_key: Some("secret".to_string()),
        }
    }

    #[tokio::test]
    async fn test_loads_reference_lists() {
        let app = Router::new()
            .route(
                "/api/categories",
                get(|| async {
                    Json(json!([
                        {"id": "7b0c1f3e-51d1-4b53-9a53-0c1b3c7d9e01", "name": "Office Supplies", "code": "OFF"},
                        {"id": "7b0c1f3e-51d1-4b53-9a53-0c1b3c7d9e02", "name": "Cleaning"}
                    ]))
                }),
            )
            .route(
                "/api/uom-types",
                get(|| async {
                    Json(json!([
                        {"id": "1e2d3c4b-5a69-4788-9900-aabbccddee01", "code": "EA", "name": "Each"}
                    ]))
                }),
            );
        let api = HttpItemsApi::new(&config(serve(app).await)).unwrap();

        let categories = api.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].code.as_deref(), Some("OFF"));
        assert!(categories[1].code.is_none());

        let units = api.list_units().await.unwrap();
        assert_eq!(units[0].code, "EA");
    }

    #[tokio::test]
    async fn test_bulk_create_sends_payload_and_key() {
        let app = Router::new().route(
            "/api/items/bulk",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let key = headers
                    .get(IDEMPOTENCY_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let first = body["items"][0].clone();
                Json(json!({
                    "created": [{
                        "id": "0b6f4a9c-3f55-4f8f-8a43-6a8d3b1e0c01",
                        "name": first["name"],
                        "code": first["code"]
                    }],
                    "errors": [{"row": 3, "name": key, "error": auth}]
                }))
            }),
        );
        let api = HttpItemsApi::new(&config(serve(app).await)).unwrap();

        let items = vec![CreateItemRequest {
            name: "Ballpoint Pen".to_string(),
            code: None,
            description: None,
            category_id: None,
            default_uom_id: None,
        }];
        let response = api.bulk_create(items, "batch-1").await.unwrap();

        assert_eq!(response.created[0].name, "Ballpoint Pen");
        assert!(response.created[0].code.is_none());
        assert_eq!(response.errors[0].name, "batch-1");
        assert_eq!(response.errors[0].error, "Bearer secret");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let app = Router::new().route(
            "/api/items/bulk",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is down") }),
        );
        let api = HttpItemsApi::new(&config(serve(app).await)).unwrap();

        let err = api.bulk_create(Vec::new(), "batch-2").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "{}", message);
        assert!(message.contains("database is down"), "{}", message);
    }
}
