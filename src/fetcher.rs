//! Collection Fetcher: walks the upstream pages for one request.

use tracing::{info, warn};

use crate::client::PageSource;
use crate::error::Result;
use crate::message::Message;

/// Statuses on which lenient pagination keeps what it has instead of failing.
const LENIENT_STOP_STATUSES: [u16; 4] = [400, 401, 404, 405];

pub struct Fetcher<S> {
    source: S,
    page_size: usize,
}

impl<S: PageSource + Sync> Fetcher<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        Fetcher { source, page_size }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetches pages sequentially until an empty page, a short page, or
    /// `max_pages` requests. Any page failure fails the whole collection.
    pub async fn fetch_all(&self, max_pages: usize) -> Result<Vec<Message>> {
        self.collect(max_pages, &[]).await
    }

    /// Like [`Fetcher::fetch_all`], but a 400/401/404/405 on a later page ends
    /// pagination and keeps the pages gathered so far.
    pub async fn fetch_all_lenient(&self, max_pages: usize) -> Result<Vec<Message>> {
        self.collect(max_pages, &LENIENT_STOP_STATUSES).await
    }

    async fn collect(&self, max_pages: usize, stop_statuses: &[u16]) -> Result<Vec<Message>> {
        let mut items = Vec::new();
        let mut skip = 0;
        let mut pages = 0;

        while pages < max_pages {
            let page = match self.source.fetch_page(skip, self.page_size).await {
                Ok(page) => page,
                Err(err) => match err.upstream_status() {
                    Some(status) if stop_statuses.contains(&status) => {
                        warn!(skip, status, "Stopping pagination early on upstream status");
                        break;
                    }
                    _ => return Err(err),
                },
            };
            pages += 1;

            let batch = page.into_items();
            if batch.is_empty() {
                break;
            }
            let last_page = batch.len() < self.page_size;
            items.extend(batch);
            if last_page {
                break;
            }
            skip += self.page_size;
        }

        info!(messages = items.len(), pages, page_size = self.page_size, "Fetched messages");
        Ok(items)
    }
}
