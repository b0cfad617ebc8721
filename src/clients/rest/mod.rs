//! REST client for the Shopify Admin API.
//!
//! # Overview
//!
//! - [`RestClient`]: `get()`, `post()`, `put()`, `delete()`, cursor paging
//!   with `next_page()` / `prev_page()`, and call-limit state
//! - [`ResourcePager`]: item-by-item iteration across pages
//! - [`RestError`]: error type for REST operations
//!
//! # Path Normalization
//!
//! - Leading slashes are stripped: `/products` -> `products.json`
//! - A trailing `.json` is stripped and re-added: `products.json` -> `products.json`
//! - Absolute URLs and paths with a query string are rejected; pass query
//!   parameters through [`RequestOptions`](crate::RequestOptions)
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_client::{RequestOptions, RestClient};
//!
//! let first = client
//!     .get("products", Some(RequestOptions::new().query_param("limit", 50)))
//!     .await?;
//! while client.has_next_page() {
//!     let Some(page) = client.next_page().await? else { break };
//!     println!("{}", page["products"]);
//! }
//! ```

mod client;
mod errors;
mod pager;

pub use client::RestClient;
pub use errors::RestError;
pub use pager::{ResourcePager, MAX_PAGE_SIZE};
