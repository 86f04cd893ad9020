//! Demo that pushes one sample embed through the Discord notifier.
//! Requires DISCORD_WEBHOOK_URL; exits quietly otherwise.

use blog_monitor::notify::discord::DiscordNotifier;
use blog_monitor::{NotificationEvent, Notifier};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let _ = dotenvy::dotenv();

    let Ok(webhook) = std::env::var("DISCORD_WEBHOOK_URL") else {
        println!("notify-demo: DISCORD_WEBHOOK_URL not set, nothing to do");
        return;
    };

    let notifier = DiscordNotifier::new(webhook);
    let ev = NotificationEvent {
        title: "Demo Post".into(),
        description: Some("A sample notification from blog-monitor.".into()),
        author: "Unknown".into(),
        thumbnail: None,
        feature_image: None,
        link: "https://www.fortnite.com/".into(),
        category: "Normal".into(),
    };

    match notifier.send(&ev, None).await {
        Ok(()) => println!("notify-demo done"),
        Err(e) => eprintln!("notify-demo failed: {e:#}"),
    }
}
