// src/config/validate.rs

use reqwest::Url;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BatchrouteError, Result};
use crate::types::LatLng;

/// Highest zoom level common tile servers provide.
const MAX_ZOOM: u8 = 22;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BatchrouteError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.server, raw.polling, raw.map))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_polling(cfg)?;
    validate_map(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    let url = Url::parse(cfg.server.base_url.trim()).map_err(|e| {
        BatchrouteError::ConfigError(format!(
            "[server].base_url {:?} is not a valid URL: {e}",
            cfg.server.base_url
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(BatchrouteError::ConfigError(format!(
            "[server].base_url must use http or https (got {:?})",
            url.scheme()
        )));
    }

    if cfg.server.timeout_secs == 0 {
        return Err(BatchrouteError::ConfigError(
            "[server].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_polling(cfg: &RawConfigFile) -> Result<()> {
    if cfg.polling.interval_ms == 0 {
        return Err(BatchrouteError::ConfigError(
            "[polling].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_map(cfg: &RawConfigFile) -> Result<()> {
    let center = LatLng::from(cfg.map.fallback_center);
    if !center.is_valid() {
        return Err(BatchrouteError::ConfigError(format!(
            "[map].fallback_center {:?} is outside lat [-90, 90] / lng [-180, 180]",
            cfg.map.fallback_center
        )));
    }

    if cfg.map.zoom > MAX_ZOOM {
        return Err(BatchrouteError::ConfigError(format!(
            "[map].zoom must be <= {MAX_ZOOM} (got {})",
            cfg.map.zoom
        )));
    }

    Ok(())
}
