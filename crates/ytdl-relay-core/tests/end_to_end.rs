//! Click-to-notification scenarios: page context, router, coordinator and a
//! stub download server wired together.

mod common;

use common::stub_server::{self, Reply};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use ytdl_relay_core::browser::{MemoryBrowser, RawCookie};
use ytdl_relay_core::config::{ExtensionSettings, SettingsStore, DEFAULT_SERVER_URL};
use ytdl_relay_core::cookies::CookieCollector;
use ytdl_relay_core::coordinator::DownloadCoordinator;
use ytdl_relay_core::dom::{Document, Element, Selector};
use ytdl_relay_core::notify::{NotificationEvent, NotificationState, Severity};
use ytdl_relay_core::page::PageContext;
use ytdl_relay_core::router::Background;

const TAB: i64 = 42;
const VIDEO_ID: &str = "dQw4w9WgXcQ";

struct World {
    page: PageContext,
    browser: Arc<MemoryBrowser>,
    _dir: TempDir,
}

/// `server_url: None` leaves the settings file absent.
fn world(server_url: Option<&str>) -> World {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open_at(dir.path().join("settings.toml"));
    if let Some(url) = server_url {
        store
            .save(&ExtensionSettings {
                server_url: url.to_string(),
                ..ExtensionSettings::default()
            })
            .unwrap();
    }
    let browser = Arc::new(MemoryBrowser::new());
    browser.open_tab(TAB, "https://www.youtube.com/", true);
    let coordinator = DownloadCoordinator::new(store, CookieCollector::new(browser.clone()));
    let (client, _) = Background::new(Arc::new(coordinator), browser.clone()).spawn();
    let page = PageContext::new(Document::new(), client.with_sender(TAB)).unwrap();
    World {
        page,
        browser,
        _dir: dir,
    }
}

/// Home-feed entry: thumbnail link with tracking params plus a title link.
fn feed_entry(doc: &Document) -> Element {
    let item = doc.create_element("ytd-rich-item-renderer");
    let thumb = doc.create_element("ytd-thumbnail");
    let link = doc.create_element("a");
    link.set_attr("id", "thumbnail");
    link.set_attr("href", &format!("/watch?v={VIDEO_ID}&pp=ygUEdGVzdA%3D%3D"));
    thumb.append_child(&link);
    item.append_child(&thumb);
    let title = doc.create_element("a");
    title.set_attr("id", "video-title-link");
    title.set_attr("href", &format!("/watch?v={VIDEO_ID}"));
    item.append_child(&title);
    doc.body().append_child(&item);
    item
}

fn click_download(doc: &Document) {
    let sel = Selector::parse(".ytdl-relay-download-btn").unwrap();
    let controls = doc.query_selector_all(&sel);
    assert_eq!(controls.len(), 1);
    controls[0].click();
}

async fn terminal_notification(events: &mut broadcast::Receiver<NotificationEvent>) -> NotificationEvent {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let ev = events.recv().await.unwrap();
            if ev.state == NotificationState::Visible && !ev.progress {
                return ev;
            }
        }
    })
    .await
    .expect("a notification is shown")
}

#[tokio::test]
async fn click_sends_cookies_and_reports_success_with_elapsed_time() {
    let server = stub_server::start(Reply::json(200, r#"{"status":"ok"}"#));
    let w = world(Some(&server.base_url));
    // Three cookies on the apex domain, none on www.
    w.browser.add_cookies([
        RawCookie::new("SID", "s1", ".youtube.com", "/"),
        RawCookie::new("HSID", "h2", ".youtube.com", "/"),
        RawCookie::new("SSID", "x3", ".youtube.com", "/"),
    ]);

    let doc = w.page.document().clone();
    feed_entry(&doc);
    let mut events = w.page.notifications().subscribe();
    w.page.start();
    click_download(&doc);

    let ev = terminal_notification(&mut events).await;
    assert_eq!(ev.severity, Severity::Success);
    assert!(
        ev.message.starts_with("Video sent for download! (") && ev.message.ends_with("s)"),
        "{}",
        ev.message
    );

    let posted = server.download_requests();
    assert_eq!(posted.len(), 1);
    let body = posted[0].json();
    assert_eq!(body["url"], format!("https://www.youtube.com/watch?v={VIDEO_ID}"));
    assert_eq!(body["cookies"], "SID=s1; HSID=h2; SSID=x3");
    assert_eq!(w.page.pending_count(), 0);
    assert!(doc.navigations().is_empty());
    w.page.stop();
}

#[tokio::test]
async fn server_error_body_reaches_the_user_verbatim() {
    let server = stub_server::start(Reply::json(500, "disk full"));
    let w = world(Some(&server.base_url));
    let doc = w.page.document().clone();
    feed_entry(&doc);
    let mut events = w.page.notifications().subscribe();
    w.page.start();
    click_download(&doc);

    let ev = terminal_notification(&mut events).await;
    assert_eq!(ev.severity, Severity::Error);
    assert!(ev.message.contains("disk full"), "{}", ev.message);
    w.page.stop();
}

#[tokio::test]
async fn unset_server_url_unreachable_names_the_default() {
    // Only meaningful when nothing is serving the default address.
    if std::net::TcpStream::connect("127.0.0.1:8080").is_ok() {
        eprintln!("skipping: something is listening on 127.0.0.1:8080");
        return;
    }
    let w = world(None);
    let doc = w.page.document().clone();
    feed_entry(&doc);
    let mut events = w.page.notifications().subscribe();
    w.page.start();
    click_download(&doc);

    let ev = terminal_notification(&mut events).await;
    assert_eq!(ev.severity, Severity::Error);
    assert!(ev.message.contains(DEFAULT_SERVER_URL), "{}", ev.message);
    w.page.stop();
}

#[tokio::test]
async fn two_clicks_run_independently() {
    let server = stub_server::start(Reply::json(200, r#"{"status":"ok"}"#));
    let w = world(Some(&server.base_url));
    let doc = w.page.document().clone();
    feed_entry(&doc);
    let second = doc.create_element("ytd-video-renderer");
    second.set_attr("data-video-id", "aqz-KE-bpKQ");
    doc.body().append_child(&second);

    let mut events = w.page.notifications().subscribe();
    w.page.start();
    let sel = Selector::parse(".ytdl-relay-download-btn").unwrap();
    for control in doc.query_selector_all(&sel) {
        control.click();
    }

    terminal_notification(&mut events).await;
    terminal_notification(&mut events).await;
    let mut urls: Vec<String> = server
        .download_requests()
        .iter()
        .map(|r| r.json()["url"].as_str().unwrap().to_string())
        .collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://www.youtube.com/watch?v=aqz-KE-bpKQ".to_string(),
            format!("https://www.youtube.com/watch?v={VIDEO_ID}"),
        ]
    );
    w.page.stop();
}
