// tests/provider_fixture.rs
use blog_monitor::ingest::providers::blog_api::BlogApiProvider;
use blog_monitor::ingest::types::BlogSource;
use blog_monitor::normalize;

#[tokio::test]
async fn fixture_posts_normalize_end_to_end() {
    let json = include_str!("fixtures/blog_posts.json");
    let provider = BlogApiProvider::from_fixture("blog", "Competitive", json);
    let posts = provider.fetch_latest().await.expect("fixture parses");
    assert_eq!(posts.len(), 3);

    let first = normalize::canonicalize(&posts[0], "Competitive").expect("has identity");
    assert_eq!(first.identity, "5f2a9c1e");
    assert_eq!(first.title, "Balance changes from");
    assert_eq!(
        first.description.as_deref(),
        Some("Sweeping balance changes arrive this week.")
    );
    assert_eq!(first.author, "The Fortnite Team");
    assert_eq!(
        first.thumbnail.as_deref(),
        Some("https://cdn.example.com/balance-576x576.jpg")
    );
    assert_eq!(
        first.feature_image.as_deref(),
        Some("https://cdn.example.com/balance-wide.jpg")
    );
    // no absolute link field, so the slug synthesizes one
    assert_eq!(first.link, "https://www.fortnite.com/blog/balance-changes");
    assert!(posts[0].trending);

    let second = normalize::canonicalize(&posts[1], "Competitive").expect("has identity");
    // no _id, the absolute link doubles as the identity
    assert_eq!(second.identity, "https://www.fortnite.com/blog/patch-notes-28-10");
    assert_eq!(second.title, "Patch Notes 28.10");
    assert_eq!(
        second.description.as_deref(),
        Some("Everything that changed in 28.10.")
    );
    // wrong aspect marker, no thumbnail
    assert_eq!(second.thumbnail, None);
    assert_eq!(second.link, "https://www.fortnite.com/blog/patch-notes-28-10");

    // neither id, link, nor slug: not trackable
    assert!(normalize::canonicalize(&posts[2], "Competitive").is_none());
}
