use super::parse;
use crate::cli::{Cli, CliCommand, ConfigAction};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_health() {
    assert!(matches!(parse(&["ytdl-relay", "health"]), CliCommand::Health));
}

#[test]
fn cli_parse_submit() {
    match parse(&["ytdl-relay", "submit", "https://www.youtube.com/watch?v=dQw4w9WgXcQ"]) {
        CliCommand::Submit {
            url,
            cookies,
            timeout,
        } => {
            assert_eq!(url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
            assert!(cookies.is_none());
            assert!(timeout.is_none());
        }
        _ => panic!("expected Submit"),
    }
}

#[test]
fn cli_parse_submit_with_cookies_and_timeout() {
    match parse(&[
        "ytdl-relay",
        "submit",
        "/watch?v=dQw4w9WgXcQ",
        "--cookies",
        "cookies.txt",
        "--timeout",
        "30",
    ]) {
        CliCommand::Submit {
            cookies, timeout, ..
        } => {
            assert_eq!(cookies, Some(PathBuf::from("cookies.txt")));
            assert_eq!(timeout, Some(30));
        }
        _ => panic!("expected Submit"),
    }
}

#[test]
fn cli_parse_extract_and_cookies() {
    match parse(&["ytdl-relay", "extract", "/watch?v=dQw4w9WgXcQ&t=1s"]) {
        CliCommand::Extract { href } => assert_eq!(href, "/watch?v=dQw4w9WgXcQ&t=1s"),
        _ => panic!("expected Extract"),
    }
    match parse(&["ytdl-relay", "cookies", "--file", "c.txt"]) {
        CliCommand::Cookies { file } => assert_eq!(file, PathBuf::from("c.txt")),
        _ => panic!("expected Cookies"),
    }
}

#[test]
fn cli_parse_monitor_default_interval() {
    match parse(&["ytdl-relay", "monitor"]) {
        CliCommand::Monitor { interval } => assert_eq!(interval, 30),
        _ => panic!("expected Monitor"),
    }
}

#[test]
fn cli_parse_config_actions() {
    assert!(matches!(
        parse(&["ytdl-relay", "config", "show"]),
        CliCommand::Config {
            action: ConfigAction::Show
        }
    ));
    match parse(&["ytdl-relay", "config", "set-server", "http://nas:8080"]) {
        CliCommand::Config {
            action: ConfigAction::SetServer { url },
        } => assert_eq!(url, "http://nas:8080"),
        _ => panic!("expected SetServer"),
    }
    assert!(matches!(
        parse(&["ytdl-relay", "config", "reset"]),
        CliCommand::Config {
            action: ConfigAction::Reset
        }
    ));
}

#[test]
fn cli_global_settings_flag() {
    let cli = Cli::try_parse_from(["ytdl-relay", "health", "--settings", "/tmp/s.toml"]).unwrap();
    assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.toml")));
}

#[test]
fn cli_rejects_missing_url() {
    assert!(Cli::try_parse_from(["ytdl-relay", "submit"]).is_err());
}
