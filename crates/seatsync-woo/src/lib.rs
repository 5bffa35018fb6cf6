//! WooCommerce REST (`wc/v3`) client for reading and patching event products.

mod client;
mod error;

pub use client::WooClient;
pub use error::WooError;
