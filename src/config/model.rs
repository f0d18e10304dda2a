// src/config/model.rs

use serde::Deserialize;

use crate::types::LatLng;

/// Top-level client configuration as read from a TOML file.
///
/// ```toml
/// [server]
/// base_url = "http://localhost:8000/api"
/// api_token = "0123abcd"
/// timeout_secs = 30
///
/// [polling]
/// interval_ms = 3000
/// max_consecutive_failures = 5
///
/// [map]
/// fallback_center = [18.4861, -69.9312]
/// zoom = 13
/// ```
///
/// All sections are optional and have reasonable defaults. Use
/// [`ConfigFile`] (obtained through validation) in the rest of the crate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub map: MapSection,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)` or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub polling: PollingSection,
    pub map: MapSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(server: ServerSection, polling: PollingSection, map: MapSection) -> Self {
        Self { server, polling, map }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.server, raw.polling, raw.map)
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// API root; `delivery-batches/` is resolved relative to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Token for `Authorization: Token <key>`. `BATCHROUTE_API_TOKEN`
    /// overrides it.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[polling]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PollingSection {
    /// Delay between status polls, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Fetch once right away instead of waiting for the first tick.
    #[serde(default)]
    pub fetch_immediately: bool,

    /// Consecutive failed polls tolerated before a batch is reported
    /// unreachable. `None` keeps polling through failures indefinitely.
    #[serde(default)]
    pub max_consecutive_failures: Option<u32>,
}

fn default_interval_ms() -> u64 {
    3000
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            fetch_immediately: false,
            max_consecutive_failures: None,
        }
    }
}

/// `[map]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MapSection {
    /// `[lat, lng]` used as the map center when no delivery is placed.
    #[serde(default = "default_fallback_center")]
    pub fallback_center: [f64; 2],

    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

fn default_fallback_center() -> [f64; 2] {
    [18.4861, -69.9312]
}

fn default_zoom() -> u8 {
    13
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            fallback_center: default_fallback_center(),
            zoom: default_zoom(),
        }
    }
}

impl MapSection {
    pub fn fallback_center(&self) -> LatLng {
        LatLng::from(self.fallback_center)
    }
}
