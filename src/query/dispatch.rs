//! Sequential lookup dispatch
//!
//! Lookups are tried one at a time in the order the query selects. The
//! first non-empty result list wins and later lookups are never called.
//! Errors are not retried or skipped here; they go straight to the caller.

use crate::error::{Error, Result};
use crate::lookup::{GeoResult, Registry};
use crate::query::Query;
use tracing::{debug, info};

/// Runs queries against a registry's lookups
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Results of the first lookup that finds anything, else an empty list
    ///
    /// Each call is bounded by the query's timeout, or the registry's when
    /// the query sets none.
    pub async fn execute(&self, query: &Query) -> Result<Vec<GeoResult>> {
        let text = query.sanitized_text();
        let options = query.options();
        let timeout = options.timeout.or(self.registry.settings().timeout);

        for name in query.select_providers(self.registry) {
            let lookup = self.registry.get(name)?;
            debug!("Searching {} for {:?}", name, text);

            let search = lookup.search(&text, options);
            let results = match timeout {
                Some(timeout) => tokio::time::timeout(timeout, search)
                    .await
                    .map_err(|_| Error::Timeout {
                        provider: name.to_string(),
                        timeout,
                    })??,
                None => search.await?,
            };

            if !results.is_empty() {
                info!("{} returned {} result(s)", name, results.len());
                return Ok(results);
            }
            debug!("{} found nothing, trying next lookup", name);
        }

        Ok(Vec::new())
    }
}
