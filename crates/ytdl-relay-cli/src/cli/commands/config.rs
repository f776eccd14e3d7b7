//! `ytdl-relay config ...` – the settings page, on the command line.

use anyhow::Result;
use ytdl_relay_core::config::SettingsStore;

use crate::cli::ConfigAction;

pub fn run_config(store: &SettingsStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = store.load()?;
            println!("# {}", store.path().display());
            println!("serverUrl     = {}", settings.base_url());
            let format = if settings.default_format.is_empty() {
                "(server default)"
            } else {
                settings.default_format.as_str()
            };
            println!("defaultFormat = {}", format);
        }
        ConfigAction::SetServer { url } => {
            let settings = store.set_server_url(&url)?;
            println!("Server URL set to {}", settings.server_url);
        }
        ConfigAction::SetFormat { format } => {
            let settings = store.set_default_format(&format)?;
            println!("Default format set to {:?}", settings.default_format);
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}
