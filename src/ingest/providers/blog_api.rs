use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{BlogSource, RawPost};

// The endpoints wrap the post list in a single field.
#[derive(Debug, Deserialize)]
struct BlogList {
    #[serde(rename = "blogList", default)]
    blog_list: Vec<RawPost>,
}

/// Provider for one blog list endpoint. HTTP in production, fixture strings
/// in tests so the whole pipeline runs offline.
pub struct BlogApiProvider {
    name: String,
    category: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

// Some blog hosts sit behind bot challenges that reject the default
// reqwest UA outright. A browser UA is enough for the JSON endpoints.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

impl BlogApiProvider {
    pub fn from_url(
        name: impl Into<String>,
        category: impl Into<String>,
        url: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            name: name.into(),
            category: category.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Accepts any &str (e.g. an include_str! fixture), copies internally.
    pub fn from_fixture(
        name: impl Into<String>,
        category: impl Into<String>,
        s: &str,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse_posts_from_str(&self, s: &str) -> Result<Vec<RawPost>> {
        let body: BlogList = serde_json::from_str(s)
            .with_context(|| format!("parsing blog list json from {}", self.name))?;
        counter!("ingest_posts_total").increment(body.blog_list.len() as u64);
        Ok(body.blog_list)
    }
}

#[async_trait]
impl BlogSource for BlogApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawPost>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_posts_from_str(s),

            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{} http get", self.name))?;
                let resp = resp
                    .error_for_status()
                    .with_context(|| format!("{} non-2xx", self.name))?;
                let body = resp
                    .text()
                    .await
                    .with_context(|| format!("{} http .text()", self.name))?;
                self.parse_posts_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }
}
