pub mod http;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::catalog::ProgramId;
use crate::types::FetchResult;

pub use http::PortalClient;

/// Source of raw rating pages, one request per program.
#[async_trait]
pub trait RatingSource: Send + Sync {
    async fn fetch(&self, program: ProgramId) -> FetchResult;
}

/// Canned pages keyed by program. Programs without a page answer with a
/// transport-style failure.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pages: BTreeMap<ProgramId, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, program: ProgramId, html: impl Into<String>) -> Self {
        self.pages.insert(program, html.into());
        self
    }
}

#[async_trait]
impl RatingSource for StaticSource {
    async fn fetch(&self, program: ProgramId) -> FetchResult {
        match self.pages.get(&program) {
            Some(html) => FetchResult::body(program, html.clone()),
            None => FetchResult::failed(program, format!("no page for {program}")),
        }
    }
}
