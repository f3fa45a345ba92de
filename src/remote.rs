//! Blocking HTTP client for the catalog endpoints. All three paths collapse
//! network, status, and decode failures into `anyhow` errors at this
//! boundary; callers convert them to rendered UI states. No automatic
//! retries — recovery is user-initiated.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{CatalogMeta, RecommendationRequest, SearchParams, SearchResponse};

mod http_client;

pub struct CatalogClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("coursedeck")
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One GET against the paginated search endpoint. Omitted filters are
    /// left out of the query string entirely.
    pub fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(major) = &params.major {
            query.push(("major", major.clone()));
        }
        if let Some(geneds) = &params.geneds {
            query.push(("geneds", geneds.clone()));
        }
        if let Some(q) = &params.q {
            query.push(("q", q.clone()));
        }
        query.push(("limit", params.limit.to_string()));

        log::debug!("GET /api/courses limit={}", params.limit);
        let resp = self
            .client
            .get(self.url("/api/courses"))
            .query(&query)
            .send()
            .context("send course search")?;
        self.ensure_ok(resp, "course search")?
            .json()
            .context("parse course search response")
    }

    /// One-shot metadata fetch for the selector contents.
    pub fn meta(&self) -> Result<CatalogMeta> {
        let resp = self
            .client
            .get(self.url("/api/courses/meta"))
            .send()
            .context("send catalog meta")?;
        self.ensure_ok(resp, "catalog meta")?
            .json()
            .context("parse catalog meta response")
    }

    /// POST the recommendation request. A non-OK response prefers the
    /// server-supplied error string when the body carries one.
    pub fn recommend(&self, request: &RecommendationRequest) -> Result<Value> {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            error: Option<String>,
        }
        #[derive(Deserialize)]
        struct Reply {
            #[serde(default)]
            recommendation: Value,
        }

        let resp = self
            .client
            .post(self.url("/api/ai-assistant"))
            .json(request)
            .send()
            .context("send recommendation request")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Failed to generate recommendation".to_string());
            log::warn!("recommendation endpoint returned {status}: {message}");
            anyhow::bail!(message);
        }

        let reply: Reply = resp.json().context("parse recommendation response")?;
        Ok(reply.recommendation)
    }
}
