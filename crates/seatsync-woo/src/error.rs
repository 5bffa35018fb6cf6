use thiserror::Error;

#[derive(Debug, Error)]
pub enum WooError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("product {product_id} not found")]
    ProductNotFound { product_id: i64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
