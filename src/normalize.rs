// src/normalize.rs
//! Pure mapping from a raw endpoint record to the canonical post view the
//! rest of the pipeline works with. No I/O, no state.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::RawPost;

const BLOG_BASE_URL: &str = "https://www.fortnite.com/blog";
const ROOT_URL: &str = "https://www.fortnite.com/";
const TITLE_BOILERPLATE: &str = "the competitive Fortnite team";
const THUMBNAIL_SIZE_MARKER: &str = "576x576";
const INLINE_STYLE_MARKER: &str = "<p style=";
const DESCRIPTION_MAX: usize = 1000;

/// Normalized view of one post. Recomputed every cycle, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPost {
    pub identity: String,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub thumbnail: Option<String>,
    pub feature_image: Option<String>,
    pub link: String,
    pub category: String,
}

/// Stable key across cycles: explicit id, else link, else slug.
/// `None` means the post cannot be tracked and is skipped silently.
pub fn post_identity(post: &RawPost) -> Option<String> {
    [&post.id, &post.link, &post.slug]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
}

fn resolve_title(post: &RawPost) -> String {
    let raw = post
        .title
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(post.grid_title.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("No Title");
    let stripped = raw.replace(TITLE_BOILERPLATE, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        "No Title".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pull the meta-description content out of a raw markup blob.
pub fn extract_meta_description(meta_tags: &str) -> Option<String> {
    static RE_META: OnceCell<Regex> = OnceCell::new();
    let re = RE_META.get_or_init(|| {
        Regex::new(r#"(?s)meta name="description".*?content="([^"]*)""#).unwrap()
    });
    re.captures(meta_tags)
        .and_then(|c| c.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
        .filter(|s| !s.is_empty())
}

fn resolve_description(post: &RawPost) -> Option<String> {
    let mut description = post
        .meta_tags
        .as_deref()
        .and_then(extract_meta_description);

    if description.is_none() {
        description = post
            .content
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.chars().count() > DESCRIPTION_MAX {
                    let mut cut: String = s.chars().take(DESCRIPTION_MAX - 3).collect();
                    cut.push_str("...");
                    cut
                } else {
                    s.to_string()
                }
            });
    }

    // Rich markup leaking into the body means the field is unusable as a
    // plain-text summary; drop it entirely instead of half-stripping it.
    description.filter(|d| !d.contains(INLINE_STYLE_MARKER))
}

fn resolve_link(post: &RawPost) -> String {
    match post.link.as_deref() {
        Some(link) if link.starts_with("http") => link.to_string(),
        _ => match post.slug.as_deref().filter(|s| !s.is_empty()) {
            Some(slug) => format!("{BLOG_BASE_URL}/{slug}"),
            None => ROOT_URL.to_string(),
        },
    }
}

/// RawPost -> CanonicalPost. `None` when no identity can be resolved.
pub fn canonicalize(post: &RawPost, category: &str) -> Option<CanonicalPost> {
    let identity = post_identity(post)?;
    Some(CanonicalPost {
        identity,
        title: resolve_title(post),
        description: resolve_description(post),
        author: post
            .author
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        thumbnail: post
            .image
            .clone()
            .filter(|u| u.contains(THUMBNAIL_SIZE_MARKER)),
        feature_image: post.trending_image.clone().filter(|u| !u.is_empty()),
        link: resolve_link(post),
        category: category.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> RawPost {
        RawPost::default()
    }

    #[test]
    fn identity_prefers_id_then_link_then_slug() {
        let mut p = post();
        p.id = Some("id1".into());
        p.link = Some("https://x/".into());
        p.slug = Some("slug1".into());
        assert_eq!(post_identity(&p).as_deref(), Some("id1"));

        p.id = None;
        assert_eq!(post_identity(&p).as_deref(), Some("https://x/"));

        p.link = None;
        assert_eq!(post_identity(&p).as_deref(), Some("slug1"));

        p.slug = None;
        assert_eq!(post_identity(&p), None);
    }

    #[test]
    fn empty_id_falls_through() {
        let mut p = post();
        p.id = Some(String::new());
        p.slug = Some("s".into());
        assert_eq!(post_identity(&p).as_deref(), Some("s"));
    }

    #[test]
    fn title_boilerplate_is_stripped_and_trimmed() {
        let mut p = post();
        p.id = Some("a".into());
        p.title = Some("  News from the competitive Fortnite team  ".into());
        let c = canonicalize(&p, "Comp").unwrap();
        assert_eq!(c.title, "News from");
    }

    #[test]
    fn grid_title_is_the_fallback() {
        let mut p = post();
        p.id = Some("a".into());
        p.grid_title = Some("Grid".into());
        assert_eq!(canonicalize(&p, "Comp").unwrap().title, "Grid");

        p.grid_title = None;
        assert_eq!(canonicalize(&p, "Comp").unwrap().title, "No Title");
    }

    #[test]
    fn meta_description_wins_over_content() {
        let mut p = post();
        p.id = Some("a".into());
        p.meta_tags = Some(
            r#"<meta charset="utf-8"><meta name="description" content="From the tags"><meta name="x" content="y">"#
                .into(),
        );
        p.content = Some("body text".into());
        let c = canonicalize(&p, "Comp").unwrap();
        assert_eq!(c.description.as_deref(), Some("From the tags"));
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let mut p = post();
        p.id = Some("a".into());
        p.content = Some("x".repeat(1500));
        let d = canonicalize(&p, "Comp").unwrap().description.unwrap();
        assert_eq!(d.chars().count(), 1000);
        assert!(d.ends_with("..."));
    }

    #[test]
    fn short_content_passes_untouched() {
        let mut p = post();
        p.id = Some("a".into());
        p.content = Some("short body".into());
        let c = canonicalize(&p, "Comp").unwrap();
        assert_eq!(c.description.as_deref(), Some("short body"));
    }

    #[test]
    fn inline_style_suppresses_description_entirely() {
        let mut p = post();
        p.id = Some("a".into());
        p.content = Some(r#"<p style="color:red">styled</p> and more"#.into());
        assert_eq!(canonicalize(&p, "Comp").unwrap().description, None);
    }

    #[test]
    fn link_resolution_ladder() {
        let mut p = post();
        p.id = Some("a".into());

        p.link = Some("https://example.com/post".into());
        assert_eq!(
            canonicalize(&p, "Comp").unwrap().link,
            "https://example.com/post"
        );

        p.link = Some("relative/path".into());
        p.slug = Some("my-post".into());
        assert_eq!(
            canonicalize(&p, "Comp").unwrap().link,
            "https://www.fortnite.com/blog/my-post"
        );

        p.link = None;
        p.slug = None;
        // identity still resolvable through id
        assert_eq!(canonicalize(&p, "Comp").unwrap().link, "https://www.fortnite.com/");
    }

    #[test]
    fn thumbnail_requires_size_marker() {
        let mut p = post();
        p.id = Some("a".into());
        p.image = Some("https://cdn/img-1024x512.png".into());
        assert_eq!(canonicalize(&p, "Comp").unwrap().thumbnail, None);

        p.image = Some("https://cdn/img-576x576.png".into());
        assert_eq!(
            canonicalize(&p, "Comp").unwrap().thumbnail.as_deref(),
            Some("https://cdn/img-576x576.png")
        );
    }

    #[test]
    fn author_defaults_to_unknown() {
        let mut p = post();
        p.id = Some("a".into());
        assert_eq!(canonicalize(&p, "Comp").unwrap().author, "Unknown");
    }
}
