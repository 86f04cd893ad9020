// src/ingest/types.rs
use anyhow::Result;

/// One record as returned by a blog list endpoint. Every field is optional;
/// the normalizer decides what is usable.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RawPost {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "gridTitle")]
    pub grid_title: Option<String>,
    pub link: Option<String>,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "trendingImage")]
    pub trending_image: Option<String>,
    pub trending: bool,
    #[serde(rename = "_metaTags")]
    pub meta_tags: Option<String>,
    pub content: Option<String>,
}

#[async_trait::async_trait]
pub trait BlogSource: Send + Sync {
    /// Posts in the order the endpoint returned them. A failing source must
    /// not abort the others; errors are handled by the cycle driver.
    async fn fetch_latest(&self) -> Result<Vec<RawPost>>;
    fn name(&self) -> &str;
    fn category(&self) -> &str;
}
