//! Deterministic `test` lookup
//!
//! Answers from a table of stubbed results keyed by query text. Clones share
//! the same table, so a harness can keep a handle and add stubs after
//! handing the lookup to a registry.

use crate::error::{Error, Result};
use crate::lookup::{GeoResult, Lookup, ProviderName};
use crate::query::{LookupOptions, Query};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Stubs {
    by_query: HashMap<String, Vec<GeoResult>>,
    default: Option<Vec<GeoResult>>,
}

/// In-memory lookup for tests
#[derive(Debug, Clone, Default)]
pub struct TestLookup {
    stubs: Arc<Mutex<Stubs>>,
}

impl TestLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `results`
    pub fn add_stub(&self, query: impl Into<String>, results: Vec<GeoResult>) {
        self.lock().by_query.insert(query.into(), results);
    }

    pub fn delete_stub(&self, query: &str) {
        self.lock().by_query.remove(query);
    }

    /// Answer any query without its own stub with `results`
    pub fn set_default_stub(&self, results: Vec<GeoResult>) {
        self.lock().default = Some(results);
    }

    pub fn reset(&self) {
        let mut stubs = self.lock();
        stubs.by_query.clear();
        stubs.default = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stubs> {
        self.stubs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Lookup for TestLookup {
    fn name(&self) -> ProviderName {
        ProviderName::Test
    }

    async fn search(&self, text: &str, _options: &LookupOptions) -> Result<Vec<GeoResult>> {
        let stubs = self.lock();
        stubs
            .by_query
            .get(text)
            .or(stubs.default.as_ref())
            .cloned()
            .ok_or_else(|| Error::lookup("test", format!("no stub for query {:?}", text)))
    }

    fn query_url(&self, query: &Query) -> String {
        format!("test://{}", urlencoding::encode(&query.sanitized_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_lookup() {
        let lookup = TestLookup::new();
        lookup.add_stub("Paris", vec![GeoResult::new(48.8566, 2.3522, "Paris, France")]);

        let results = lookup.search("Paris", &LookupOptions::default()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].address.as_deref(), Some("Paris, France"));
    }

    #[tokio::test]
    async fn test_default_stub_and_missing_stub() {
        let lookup = TestLookup::new();
        assert!(lookup.search("anywhere", &LookupOptions::default()).await.is_err());

        lookup.set_default_stub(Vec::new());
        let results = lookup.search("anywhere", &LookupOptions::default()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_stubs() {
        let lookup = TestLookup::new();
        let handle = lookup.clone();
        handle.add_stub("Oslo", vec![GeoResult::new(59.9139, 10.7522, "Oslo")]);
        assert_eq!(lookup.search("Oslo", &LookupOptions::default()).await.unwrap().len(), 1);

        handle.delete_stub("Oslo");
        assert!(lookup.search("Oslo", &LookupOptions::default()).await.is_err());
    }

    #[test]
    fn test_query_url() {
        let url = TestLookup::new().query_url(&Query::new("40.0, -70.0"));
        assert_eq!(url, "test://40.0%2C-70.0");
    }
}
