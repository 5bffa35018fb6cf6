//! HTTP client for the WooCommerce product endpoints.
//!
//! Reads authenticate with HTTP basic auth. Writes pass the consumer key and
//! secret as query parameters instead, which the store accepts more reliably
//! for `PUT` requests. Nothing is retried: a failed call fails the operation.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde_json::{json, Value};

use seatsync_core::{MetaEntry, Product, WooConfig};

use crate::error::WooError;

const API_PATH: &str = "wp-json/wc/v3/";
const USER_AGENT: &str = "seatsync/0.1 (inventory-reconciliation)";

/// Error code WooCommerce returns in the body for an unknown product id.
const INVALID_PRODUCT_CODE: &str = "woocommerce_rest_product_invalid_id";

/// Client for one WooCommerce store.
pub struct WooClient {
    client: Client,
    base_url: Url,
    consumer_key: String,
    consumer_secret: String,
}

impl WooClient {
    /// Creates a client for the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`WooError::InvalidBaseUrl`] if the store URL does not parse.
    pub fn new(config: &WooConfig, timeout_secs: u64) -> Result<Self, WooError> {
        Self::with_base_url(
            &config.api_url,
            &config.consumer_key,
            &config.consumer_secret,
            timeout_secs,
        )
    }

    /// Creates a client rooted at an arbitrary store URL (a mock server in
    /// tests). The `wp-json/wc/v3` path is appended here.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`WooError::InvalidBaseUrl`] if `api_url` does not parse.
    pub fn with_base_url(
        api_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
        timeout_secs: u64,
    ) -> Result<Self, WooError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        let root = format!("{}/{API_PATH}", api_url.trim_end_matches('/'));
        let base_url = Url::parse(&root).map_err(|e| WooError::InvalidBaseUrl {
            url: api_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(WooError::InvalidBaseUrl {
                url: api_url.to_owned(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url,
            consumer_key: consumer_key.to_owned(),
            consumer_secret: consumer_secret.to_owned(),
        })
    }

    /// Fetches one product with its full metadata list.
    ///
    /// # Errors
    ///
    /// - [`WooError::ProductNotFound`] on HTTP 404 or an invalid-id error body.
    /// - [`WooError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`WooError::Http`] on network failure.
    /// - [`WooError::Deserialize`] if the body is not a product.
    pub async fn get_product(&self, product_id: i64) -> Result<Product, WooError> {
        let url = self.endpoint(&format!("products/{product_id}"))?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;

        let body = Self::read_json(response, Some(product_id)).await?;
        if body.get("code").and_then(Value::as_str) == Some(INVALID_PRODUCT_CODE) {
            return Err(WooError::ProductNotFound { product_id });
        }

        serde_json::from_value(body).map_err(|e| WooError::Deserialize {
            context: format!("product {product_id}"),
            source: e,
        })
    }

    /// Fetches one page of published products. An empty page marks the end.
    ///
    /// # Errors
    ///
    /// - [`WooError::UnexpectedStatus`] on any non-2xx status.
    /// - [`WooError::Http`] on network failure.
    /// - [`WooError::Deserialize`] if the body is not a product list.
    pub async fn list_products_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        let mut url = self.endpoint("products")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string())
            .append_pair("status", "publish");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;

        let body = Self::read_json(response, None).await?;
        serde_json::from_value(body).map_err(|e| WooError::Deserialize {
            context: format!("products page {page}"),
            source: e,
        })
    }

    /// Replaces the given metadata entries on a product.
    ///
    /// Entries not listed are left untouched by the store.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::get_product`], minus deserialization of the reply.
    pub async fn update_product_meta(
        &self,
        product_id: i64,
        meta_data: &[MetaEntry],
    ) -> Result<(), WooError> {
        let keys: Vec<&str> = meta_data.iter().map(|m| m.key.as_str()).collect();
        self.put_product(product_id, &json!({ "meta_data": meta_data }))
            .await
            .inspect_err(|e| tracing::error!(product_id, ?keys, error = %e, "metadata update failed"))?;

        tracing::info!(product_id, ?keys, "updated product metadata");
        Ok(())
    }

    /// Sets the native stock quantity and turns stock management on.
    ///
    /// # Errors
    ///
    /// Same as [`WooClient::get_product`], minus deserialization of the reply.
    pub async fn update_stock_quantity(
        &self,
        product_id: i64,
        stock_quantity: i64,
    ) -> Result<(), WooError> {
        let body = json!({ "stock_quantity": stock_quantity, "manage_stock": true });
        self.put_product(product_id, &body)
            .await
            .inspect_err(|e| tracing::error!(product_id, stock_quantity, error = %e, "stock update failed"))?;

        tracing::info!(product_id, stock_quantity, "updated product stock quantity");
        Ok(())
    }

    async fn put_product(&self, product_id: i64, body: &Value) -> Result<(), WooError> {
        let url = self.write_url(&format!("products/{product_id}"))?;
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| WooError::Http(e.without_url()))?;
        Self::read_json(response, Some(product_id)).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, WooError> {
        self.base_url
            .join(path)
            .map_err(|e| WooError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    fn write_url(&self, path: &str) -> Result<Url, WooError> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("consumer_key", &self.consumer_key)
            .append_pair("consumer_secret", &self.consumer_secret);
        Ok(url)
    }

    /// Checks the status and parses the body as JSON.
    ///
    /// URLs in errors never include the query string, which may carry
    /// credentials.
    async fn read_json(response: Response, product_id: Option<i64>) -> Result<Value, WooError> {
        let status = response.status();
        let mut url = response.url().clone();
        url.set_query(None);

        if status == StatusCode::NOT_FOUND {
            if let Some(product_id) = product_id {
                return Err(WooError::ProductNotFound { product_id });
            }
        }
        if !status.is_success() {
            return Err(WooError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| WooError::Http(e.without_url()))?;
        serde_json::from_str(&text).map_err(|e| WooError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
