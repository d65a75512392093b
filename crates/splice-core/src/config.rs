//! Navigation configuration
//!
//! Accepts both snake_case keys and the camelCase option names used by
//! page templates (`initialURL`, `redirectionCode`, ...).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Where to send users that land on `/`
    #[serde(alias = "initialURL")]
    pub initial_url: String,
    /// Status the server uses for client-side redirects
    #[serde(alias = "redirectionCode")]
    pub redirection_code: u16,
    /// Anchors with any of these classes have their clicks swallowed
    #[serde(default, alias = "disabledAnchorClasses")]
    pub disabled_anchor_classes: Vec<String>,
    /// Anchors with any of these classes are left to the browser
    #[serde(default, alias = "excludeAnchorClasses")]
    pub exclude_anchor_classes: Vec<String>,
    #[serde(default = "default_maximum_ajax_requests", alias = "maximumAjaxRequests")]
    pub maximum_ajax_requests: usize,
    /// Throttle window in milliseconds
    #[serde(default = "default_ajax_request_timeout", alias = "ajaxRequestTimeout")]
    pub ajax_request_timeout: u64,
    #[serde(default = "default_ajax_throttling_message", alias = "ajaxThrottlingMessage")]
    pub ajax_throttling_message: String,
    /// Lifetime of the throttle toast in milliseconds
    #[serde(default = "default_throttle_notice_timeout")]
    pub throttle_notice_timeout: u64,
    #[serde(default = "default_refresh_animation_ms")]
    pub refresh_animation_ms: u64,
    /// Request header carrying the last displayed location
    #[serde(default = "default_referer_header")]
    pub referer_header: String,
    /// Render verbose error banners instead of server error pages
    #[serde(default)]
    pub debug: bool,
}

fn default_maximum_ajax_requests() -> usize {
    10
}

fn default_ajax_request_timeout() -> u64 {
    5000
}

fn default_ajax_throttling_message() -> String {
    "Too many requests.".to_string()
}

fn default_throttle_notice_timeout() -> u64 {
    10_000
}

fn default_refresh_animation_ms() -> u64 {
    1000
}

fn default_referer_header() -> String {
    "X-Alt-Referer".to_string()
}

impl NavigationConfig {
    pub fn new(initial_url: impl Into<String>, redirection_code: u16) -> Self {
        Self {
            initial_url: initial_url.into(),
            redirection_code,
            disabled_anchor_classes: Vec::new(),
            exclude_anchor_classes: Vec::new(),
            maximum_ajax_requests: default_maximum_ajax_requests(),
            ajax_request_timeout: default_ajax_request_timeout(),
            ajax_throttling_message: default_ajax_throttling_message(),
            throttle_notice_timeout: default_throttle_notice_timeout(),
            refresh_animation_ms: default_refresh_animation_ms(),
            referer_header: default_referer_header(),
            debug: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let root = Url::parse("http://localhost/").map_err(|e| CoreError::Config(e.to_string()))?;
        let initial = root
            .join(&self.initial_url)
            .map_err(|e| CoreError::Config(format!("initial_url {:?}: {}", self.initial_url, e)))?;
        if self.initial_url.trim().is_empty() || initial.path() == "/" {
            return Err(CoreError::Config(
                "initial_url must name a location other than /".to_string(),
            ));
        }

        // Only success responses reach the redirect check
        if !(200..=299).contains(&self.redirection_code) {
            return Err(CoreError::Config(format!(
                "redirection_code must be a 2xx status, got {}",
                self.redirection_code
            )));
        }

        if self.maximum_ajax_requests == 0 {
            return Err(CoreError::Config(
                "maximum_ajax_requests must be at least 1".to_string(),
            ));
        }

        let valid_header = !self.referer_header.is_empty()
            && self
                .referer_header
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_header {
            return Err(CoreError::Config(format!(
                "invalid referer_header {:?}",
                self.referer_header
            )));
        }

        Ok(())
    }

    pub fn request_window(&self) -> Duration {
        Duration::from_millis(self.ajax_request_timeout)
    }

    pub fn throttle_notice(&self) -> Duration {
        Duration::from_millis(self.throttle_notice_timeout)
    }

    pub fn refresh_animation(&self) -> Duration {
        Duration::from_millis(self.refresh_animation_ms)
    }
}
