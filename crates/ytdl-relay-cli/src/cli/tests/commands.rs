use crate::cli::commands::{run_config, run_cookies, run_extract};
use crate::cli::ConfigAction;
use std::io::Write;
use ytdl_relay_core::config::{SettingsStore, DEFAULT_SERVER_URL};

#[test]
fn config_set_show_reset() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open_at(dir.path().join("settings.toml"));

    run_config(
        &store,
        ConfigAction::SetServer {
            url: "http://nas.local:9000".into(),
        },
    )
    .unwrap();
    assert_eq!(store.load().unwrap().server_url, "http://nas.local:9000");
    run_config(&store, ConfigAction::Show).unwrap();

    assert!(run_config(
        &store,
        ConfigAction::SetServer {
            url: "nas.local".into()
        }
    )
    .is_err());

    run_config(&store, ConfigAction::Reset).unwrap();
    assert_eq!(store.load().unwrap().server_url, DEFAULT_SERVER_URL);
}

#[test]
fn extract_accepts_links_and_bare_ids() {
    assert!(run_extract("/watch?v=dQw4w9WgXcQ&list=PL1").is_ok());
    assert!(run_extract("dQw4w9WgXcQ").is_ok());
    assert!(run_extract("/shorts/nothing").is_err());
}

#[tokio::test]
async fn cookies_command_reads_netscape_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "# Netscape HTTP Cookie File").unwrap();
    writeln!(f, ".youtube.com\tTRUE\t/\tTRUE\t0\tSID\tabc").unwrap();
    f.flush().unwrap();
    run_cookies(f.path()).await.unwrap();
    assert!(run_cookies(std::path::Path::new("/nonexistent/cookies.txt"))
        .await
        .is_err());
}
