//! Lazy item streaming across pages.
//!
//! A [`ResourcePager`] turns a paginated list endpoint into a single pass
//! over its items. Pages are fetched only when the buffered items run out.

use std::collections::VecDeque;

use futures::stream::{self, Stream};
use serde_json::Value;

use crate::auth::AuthStrategy;
use crate::clients::rest::client::RestClient;
use crate::clients::rest::errors::RestError;
use crate::clients::RequestOptions;

/// Largest page the API will return.
pub const MAX_PAGE_SIZE: usize = 250;

/// A one-shot, lazily fetched sequence of resource items.
///
/// Created by [`RestClient::paginate`]. Each page body maps one or more
/// collection keys to arrays; every array is flattened into the sequence in
/// server order.
///
/// The sequence ends when, in order:
/// 1. a fetched page has no items,
/// 2. the `max_items` cap is reached (possibly mid-page),
/// 3. the cursor reports no next page.
///
/// An error is returned once and ends the sequence. Once ended the pager
/// stays ended; call [`RestClient::paginate`] again to start over.
///
/// # Example
///
/// ```rust,ignore
/// let mut pager = client.paginate("orders", Some(1_000), RequestOptions::new().query_param("status", "any"));
/// while let Some(order) = pager.next_item().await? {
///     println!("{}", order["id"]);
/// }
/// println!("{} pages", pager.pages_fetched());
/// ```
#[derive(Debug)]
pub struct ResourcePager<'a, A: AuthStrategy> {
    client: &'a mut RestClient<A>,
    resource: String,
    options: RequestOptions,
    max_items: Option<usize>,
    buffer: VecDeque<Value>,
    fetched_any: bool,
    done: bool,
    pages_fetched: usize,
    items_yielded: usize,
}

impl<'a, A: AuthStrategy> ResourcePager<'a, A> {
    pub(crate) fn new(
        client: &'a mut RestClient<A>,
        resource: &str,
        max_items: Option<usize>,
        options: RequestOptions,
    ) -> Self {
        let page_size = page_size(&options, max_items);
        Self {
            client,
            resource: resource.to_string(),
            options: options.query_param("limit", page_size),
            max_items,
            buffer: VecDeque::new(),
            fetched_any: false,
            done: false,
            pages_fetched: 0,
            items_yielded: 0,
        }
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns the number of items yielded so far.
    #[must_use]
    pub const fn items_yielded(&self) -> usize {
        self.items_yielded
    }

    /// Returns the next item, fetching a page if the buffer is empty.
    ///
    /// Returns `Ok(None)` once the sequence has ended.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] if a page fetch fails. The sequence ends.
    pub async fn next_item(&mut self) -> Result<Option<Value>, RestError> {
        loop {
            if self.done {
                return Ok(None);
            }
            if self.max_items.is_some_and(|max| self.items_yielded >= max) {
                self.done = true;
                return Ok(None);
            }
            if let Some(item) = self.buffer.pop_front() {
                self.items_yielded += 1;
                return Ok(Some(item));
            }
            if self.fetched_any && !self.client.has_next_page() {
                self.done = true;
                return Ok(None);
            }

            let page = match self.fetch_page().await {
                Ok(page) => page,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };
            self.fetched_any = true;
            self.pages_fetched += 1;

            let items = flatten_page(page);
            tracing::debug!(
                resource = self.resource.as_str(),
                page = self.pages_fetched,
                items = items.len(),
                "Fetched page"
            );
            if items.is_empty() {
                self.done = true;
                return Ok(None);
            }
            self.buffer.extend(items);
        }
    }

    async fn fetch_page(&mut self) -> Result<Value, RestError> {
        if self.fetched_any {
            Ok(self.client.next_page().await?.unwrap_or(Value::Null))
        } else {
            self.client
                .get(&self.resource, Some(self.options.clone()))
                .await
        }
    }

    /// Drains the pager into a `Vec`.
    ///
    /// # Errors
    ///
    /// Returns the first page fetch error; items read before it are dropped.
    pub async fn collect_all(mut self) -> Result<Vec<Value>, RestError> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Converts the pager into a [`Stream`] of items.
    ///
    /// An error is yielded once and ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Value, RestError>> + 'a
    where
        A: 'a,
    {
        stream::try_unfold(self, |mut pager| async move {
            Ok::<_, RestError>(pager.next_item().await?.map(|item| (item, pager)))
        })
    }
}

fn page_size(options: &RequestOptions, max_items: Option<usize>) -> usize {
    options
        .query()
        .get("limit")
        .and_then(|limit| limit.trim().parse::<usize>().ok())
        .or(max_items)
        .unwrap_or(MAX_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Collects the items of every array-valued key of a page body.
fn flatten_page(page: Value) -> Vec<Value> {
    match page {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(_, value)| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .flatten()
            .collect(),
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
