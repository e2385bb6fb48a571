use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{CjmError, Result};

/// Number of records requested per page from the paginated Jira
/// collection endpoints.
pub const PAGE_SIZE: i64 = 50;

pub struct JiraClient {
    http: Client,
    base: Url,
    user: String,
    token: String,
}

/// Envelope wrapping every paginated Jira collection response. The
/// record list key varies by endpoint ("values", "issues" or
/// "comments"); older servers omit "isLast".
#[derive(Deserialize)]
pub struct Page<T> {
    #[serde(alias = "issues", alias = "comments")]
    pub values: Vec<T>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(rename = "isLast", default)]
    pub is_last: Option<bool>,
}

impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_credentials(
            config.scheme(),
            config.host()?,
            config.user()?,
            config.token()?,
        )
    }

    pub fn with_credentials(scheme: &str, host: &str, user: &str, token: String) -> Result<Self> {
        let base = Url::parse(&format!("{scheme}://{host}/"))?;
        Ok(Self {
            http: Client::new(),
            base,
            user: user.to_string(),
            token,
        })
    }

    /// Url of a Jira core API resource.
    pub fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(&format!("rest/api/3/{path}"))?)
    }

    /// Url of a Jira Agile API resource.
    pub fn agile_url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(&format!("rest/agile/1.0/{path}"))?)
    }

    /// Url of the issue page shown to humans.
    pub fn browse_url(&self, issue_key: &str) -> String {
        format!("{}browse/{}", self.base, issue_key)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.dispatch(self.http.get(url.clone()), &url).await?;
        Ok(response.json().await?)
    }

    /// GET variant treating 404 as an empty result instead of a failure.
    pub async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.user, Some(&self.token))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(&url, response).await);
        }

        Ok(Some(response.json().await?))
    }

    pub async fn post(&self, url: Url, body: &serde_json::Value) -> Result<()> {
        debug!(%url, "POST");
        self.dispatch(self.http.post(url.clone()).json(body), &url)
            .await?;
        Ok(())
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T> {
        debug!(%url, "POST");
        let response = self
            .dispatch(self.http.post(url.clone()).json(body), &url)
            .await?;
        Ok(response.json().await?)
    }

    /// Collect all pages of a paginated GET collection.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut start_at: i64 = 0;

        loop {
            let mut page_url = url.clone();
            {
                let mut pairs = page_url.query_pairs_mut();
                for (name, value) in query {
                    pairs.append_pair(name, value);
                }
                pairs.append_pair("startAt", &start_at.to_string());
                pairs.append_pair("maxResults", &PAGE_SIZE.to_string());
            }

            let Page {
                values,
                total,
                is_last,
            } = self.get(page_url).await?;
            records.extend(values);
            start_at += PAGE_SIZE;

            if page_done(is_last, total, start_at) {
                break;
            }
        }

        Ok(records)
    }

    /// Collect all pages of a paginated POST collection, e.g. a JQL
    /// search.
    pub async fn post_all_pages<T: DeserializeOwned>(
        &self,
        url: Url,
        body: serde_json::Value,
    ) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut start_at: i64 = 0;

        loop {
            let mut page_body = body.clone();
            if let Some(parameters) = page_body.as_object_mut() {
                parameters.insert("startAt".to_string(), start_at.into());
                parameters.insert("maxResults".to_string(), PAGE_SIZE.into());
            }

            let Page {
                values,
                total,
                is_last,
            } = self.post_json(url.clone(), &page_body).await?;
            records.extend(values);
            start_at += PAGE_SIZE;

            if page_done(is_last, total, start_at) {
                break;
            }
        }

        Ok(records)
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response> {
        let response = request
            .basic_auth(&self.user, Some(&self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(url, response).await);
        }

        Ok(response)
    }

    async fn api_error(url: &Url, response: reqwest::Response) -> CjmError {
        CjmError::Api {
            url: url.to_string(),
            status: response.status().as_u16(),
            message: response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string()),
        }
    }
}

/// Whether the page just fetched was the final one. Servers reporting
/// "isLast" are trusted; otherwise the running offset is checked against
/// the reported total; with neither, one page is all there is.
fn page_done(is_last: Option<bool>, total: Option<i64>, next_start: i64) -> bool {
    match (is_last, total) {
        (Some(last), _) => last,
        (None, Some(total)) => next_start >= total,
        (None, None) => true,
    }
}
