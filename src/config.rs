use log::LevelFilter;
use serde::Deserialize;

pub const DEFAULT_POLL_INTERVAL_MS: u32 = 20;
pub const DEFAULT_STYLE_ELEMENT_ID: &str = "dtk-font-face-declarations";

/// Host-supplied settings. Every field is optional on the JS side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylerOptions {
    /// Delay between two checks for new stylesheets.
    pub poll_interval_ms: u32,
    /// Id of the injected `<style>` element holding the font faces.
    pub style_element_id: String,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for StylerOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            style_element_id: DEFAULT_STYLE_ELEMENT_ID.to_owned(),
            log_level: "warn".to_owned(),
        }
    }
}

impl StylerOptions {
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}
