pub mod discord;

use anyhow::Result;

use crate::normalize::CanonicalPost;

/// Display payload for one post, ready for the outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub thumbnail: Option<String>,
    pub feature_image: Option<String>,
    pub link: String,
    pub category: String,
}

/// CanonicalPost -> display payload. Side-effect-free; the description is
/// absent from the payload when none was resolved, never an empty string.
pub fn compose(post: &CanonicalPost) -> NotificationEvent {
    NotificationEvent {
        title: post.title.clone(),
        description: post.description.clone().filter(|d| !d.is_empty()),
        author: post.author.clone(),
        thumbnail: post.thumbnail.clone(),
        feature_image: post.feature_image.clone(),
        link: post.link.clone(),
        category: post.category.clone(),
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// One delivery attempt. `mention` is a role id to tag; only the first
    /// message of a cycle carries one.
    async fn send(&self, ev: &NotificationEvent, mention: Option<u64>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> CanonicalPost {
        CanonicalPost {
            identity: "a1".into(),
            title: "Title".into(),
            description: Some("desc".into()),
            author: "Unknown".into(),
            thumbnail: None,
            feature_image: None,
            link: "https://www.fortnite.com/".into(),
            category: "Normal".into(),
        }
    }

    #[test]
    fn compose_carries_fields_through() {
        let ev = compose(&canonical());
        assert_eq!(ev.title, "Title");
        assert_eq!(ev.description.as_deref(), Some("desc"));
        assert_eq!(ev.category, "Normal");
    }

    #[test]
    fn empty_description_is_dropped() {
        let mut c = canonical();
        c.description = Some(String::new());
        assert_eq!(compose(&c).description, None);
    }
}
