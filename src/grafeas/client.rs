use crate::config::GrafeasConfig;
use crate::context::Context;
use crate::grafeas::types::{Note, Occurrence};
use crate::grafeas::{OccurrencePage, OccurrenceStore, Publish};
use crate::metadata::Auth;
use crate::{Result, VoucherError};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::sync::Arc;

/// HTTP client for the Grafeas v1 REST API.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Clone)]
pub struct GrafeasClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    page_size: u32,
    auth: Option<Arc<dyn Auth>>,
}

impl GrafeasClient {
    pub fn new(config: &GrafeasConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| VoucherError::Config(format!("invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            page_size: config.page_size,
            auth: None,
        })
    }

    pub fn with_auth(mut self, auth: Arc<dyn Auth>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn project_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.base_url, self.project, collection
        )
    }

    async fn send(
        &self,
        ctx: &Context,
        method: Method,
        url: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder + Send,
    ) -> Result<Response> {
        let mut request = build(self.client.request(method, url));
        if let Some(auth) = &self.auth {
            let token = auth.token(ctx).await?;
            request = request.bearer_auth(token);
        }

        ctx.run(async { Ok(request.send().await?) }).await
    }

    /// Map a non-2xx response to an error carrying method, URL, status and body
    async fn error_for_status(ctx: &Context, method: &Method, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = ctx
            .run(async { Ok(response.text().await.unwrap_or_else(|_| "Unknown error".to_string())) })
            .await?;

        Err(VoucherError::Http {
            method: method.to_string(),
            url,
            status: status.as_u16(),
            body,
        })
    }

    async fn create(
        &self,
        ctx: &Context,
        url: &str,
        query: Vec<(&'static str, String)>,
        body: serde_json::Value,
    ) -> Result<Publish> {
        let response = self
            .send(ctx, Method::POST, url, |req| req.query(&query).json(&body))
            .await?;

        if response.status() == StatusCode::CONFLICT {
            debug!("{} reported the record already exists", url);
            return Ok(Publish::AlreadyExists);
        }

        Self::error_for_status(ctx, &Method::POST, response).await?;
        Ok(Publish::Created)
    }
}

#[async_trait]
impl OccurrenceStore for GrafeasClient {
    async fn list_occurrences(
        &self,
        ctx: &Context,
        filter: &str,
        page_token: Option<&str>,
    ) -> Result<OccurrencePage> {
        let url = self.project_url("occurrences");

        let mut query = vec![
            ("filter", filter.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .send(ctx, Method::GET, &url, |req| req.query(&query))
            .await?;
        let response = Self::error_for_status(ctx, &Method::GET, response).await?;

        let bytes = ctx.run(async { Ok(response.bytes().await?) }).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn create_occurrence(&self, ctx: &Context, occurrence: &Occurrence) -> Result<Publish> {
        let url = self.project_url("occurrences");
        self.create(ctx, &url, Vec::new(), serde_json::to_value(occurrence)?)
            .await
    }

    async fn create_note(&self, ctx: &Context, note_id: &str, note: &Note) -> Result<Publish> {
        let url = self.project_url("notes");
        self.create(
            ctx,
            &url,
            vec![("noteId", note_id.to_string())],
            serde_json::to_value(note)?,
        )
        .await
    }

    fn project(&self) -> &str {
        &self.project
    }
}

impl std::fmt::Debug for GrafeasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrafeasClient")
            .field("base_url", &self.base_url)
            .field("project", &self.project)
            .field("page_size", &self.page_size)
            .field("auth", &self.auth.is_some())
            .finish()
    }
}
