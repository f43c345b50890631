use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Core terminal configuration, loaded from ~/.config/squall/config.json.
///
/// Only knobs the emulator core consumes live here; font and theme
/// settings belong to the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scrollback depth in lines for the primary buffer.
    pub scrollback_lines: usize,
    /// Default tab stop interval in columns.
    pub tab_interval: u16,
    /// Paste chunk budget in UTF-8 bytes.
    pub paste_chunk_bytes: usize,
    /// Render bold text in indices 0-7 with the bright 8-15 palette.
    pub bold_is_bright: bool,
    /// Backspace sends 0x08 instead of DEL.
    pub backspace_sends_backspace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrollback_lines: 10_000,
            tab_interval: 8,
            paste_chunk_bytes: 4096,
            bold_is_bright: true,
            backspace_sends_backspace: false,
        }
    }
}

impl Config {
    /// Load config from the standard config path, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard config path.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("squall")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.scrollback_lines, 10_000);
        assert_eq!(config.tab_interval, 8);
        assert_eq!(config.paste_chunk_bytes, 4096);
    }

    #[test]
    fn json_roundtrip() {
        let config = Config {
            scrollback_lines: 500,
            bold_is_bright: false,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scrollback_lines, 500);
        assert!(!back.bold_is_bright);
    }
}
