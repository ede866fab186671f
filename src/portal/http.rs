use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::catalog::{Catalog, ProgramId};
use crate::config::PortalConfig;
use crate::portal::RatingSource;
use crate::types::FetchResult;

/// Posts the rating form for each program to the admissions portal.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    url: String,
    catalog: Arc<Catalog>,
}

impl PortalClient {
    pub fn new(config: &PortalConfig, catalog: Arc<Catalog>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs.max(1)))
            .build()
            .context("failed to build portal HTTP client")?;
        Ok(Self {
            client,
            url: config.url.clone(),
            catalog,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Urlencoded form POST; `form` sets the content type.
    fn form_request(&self, program: ProgramId) -> RequestBuilder {
        let fields = self.catalog.form_fields(program);
        self.client.post(&self.url).form(&fields)
    }

    async fn post_form(&self, program: ProgramId) -> Result<String> {
        let response = self
            .form_request(program)
            .send()
            .await
            .with_context(|| format!("failed POST request: {}", self.url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed reading response body: {}", self.url))?;
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(anyhow!("POST {} returned {status}: {preview}", self.url));
        }
        Ok(body)
    }
}

#[async_trait]
impl RatingSource for PortalClient {
    async fn fetch(&self, program: ProgramId) -> FetchResult {
        debug!("requesting rating page for {program}");
        match self.post_form(program).await {
            Ok(body) => {
                debug!("received {} bytes for {program}", body.len());
                FetchResult::body(program, body)
            }
            Err(err) => {
                warn!("error while getting server response for {program}: {err:#}");
                FetchResult::failed(program, format!("{err:#}"))
            }
        }
    }
}
