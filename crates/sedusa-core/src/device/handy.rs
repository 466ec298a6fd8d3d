//! HAMP-mode client for the Handy v2 HTTP API.
//!
//! Physical millimetres map onto the device's 0-100 slide scale, which is
//! inverted (0 is the deep end). Speed is sent as a velocity percentage
//! derived from the current window length, so it is held back until a
//! window has been set.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::Actuator;
use crate::error::DeviceError;

/// Maximum physical travel of the device.
pub const FULL_TRAVEL_MM: f64 = 110.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    /// Log commands instead of sending them.
    Simulate,
    /// Talk to the real device through the vendor API.
    Handy,
}

#[derive(Debug, Clone)]
pub struct HandySettings {
    pub mode: DeviceMode,
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub log_device: bool,
    pub speed_calibration_factor: f64,
}

impl Default for HandySettings {
    fn default() -> Self {
        Self {
            mode: DeviceMode::Simulate,
            api_key: String::new(),
            base_url: "https://www.handyfeeling.com/api/handy/v2/".into(),
            timeout: Duration::from_secs(5),
            log_device: true,
            speed_calibration_factor: 2.8,
        }
    }
}

#[derive(Debug, Default)]
struct LastSent {
    window: Option<(f64, f64)>,
    speed_hz: Option<f64>,
}

pub struct HandyClient {
    settings: HandySettings,
    http: Client,
    last: Mutex<LastSent>,
}

impl HandyClient {
    /// Build a client. Remote mode requires an API key.
    pub fn new(settings: HandySettings) -> Result<Self, DeviceError> {
        if settings.mode == DeviceMode::Handy && settings.api_key.trim().is_empty() {
            return Err(DeviceError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(DeviceError::Client)?;
        Ok(Self {
            settings,
            http,
            last: Mutex::new(LastSent::default()),
        })
    }

    pub fn simulated() -> Result<Self, DeviceError> {
        Self::new(HandySettings::default())
    }

    pub fn mode(&self) -> DeviceMode {
        self.settings.mode
    }

    fn last(&self) -> std::sync::MutexGuard<'_, LastSent> {
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn put(&self, path: &str, body: Value) -> Result<(), DeviceError> {
        if self.settings.mode == DeviceMode::Simulate {
            if self.settings.log_device {
                info!(target: "sedusa::device", "[sim] PUT /{path} {body}");
            }
            return Ok(());
        }

        let url = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        if self.settings.log_device {
            debug!(target: "sedusa::device", "PUT {url} {body}");
        }
        let resp = self
            .http
            .put(&url)
            .header("X-Connection-Key", &self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| DeviceError::Http {
                path: path.to_string(),
                source,
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(DeviceError::Status {
                path: path.to_string(),
                status: resp.status().as_u16(),
            })
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Convert a window in millimetres to the device's inverted slide range.
pub fn slide_percentages(min_mm: f64, max_mm: f64) -> (u8, u8) {
    let min_pct = min_mm / FULL_TRAVEL_MM * 100.0;
    let max_pct = max_mm / FULL_TRAVEL_MM * 100.0;

    let api_min = (100.0 - max_pct).round().clamp(0.0, 100.0) as u8;
    let mut api_max = (100.0 - min_pct).round().clamp(0.0, 100.0) as u8;
    if api_min >= api_max {
        api_max = (api_min + 2).min(100);
    }
    (api_min, api_max)
}

/// Velocity percentage for a stroke of `window_mm` at `hz`.
pub fn velocity_percent(window_mm: f64, hz: f64, calibration: f64) -> u8 {
    let calibration = if calibration > 0.0 { calibration } else { 1.0 };
    let window_pct = window_mm / FULL_TRAVEL_MM * 100.0;
    let velocity = (window_pct * hz / calibration).trunc();
    velocity.clamp(0.0, 100.0) as u8
}

impl Actuator for HandyClient {
    async fn set_window(&self, min_mm: f64, max_mm: f64) -> Result<(), DeviceError> {
        let window = (round1(min_mm), round1(max_mm));
        {
            let mut last = self.last();
            if last.window == Some(window) {
                return Ok(());
            }
            last.window = Some(window);
        }
        let (min, max) = slide_percentages(min_mm, max_mm);
        self.put("slide", json!({ "min": min, "max": max })).await
    }

    async fn set_speed(&self, hz: f64) -> Result<(), DeviceError> {
        let (lo, hi) = {
            let mut last = self.last();
            let Some(window) = last.window else {
                return Ok(());
            };
            if last.speed_hz == Some(hz) {
                return Ok(());
            }
            last.speed_hz = Some(hz);
            window
        };
        let velocity = velocity_percent(hi - lo, hz, self.settings.speed_calibration_factor);
        self.put("hamp/velocity", json!({ "velocity": velocity })).await
    }

    async fn start_motion(&self) -> Result<(), DeviceError> {
        self.put("mode", json!({ "mode": 1 })).await?;
        self.put("hamp/start", json!({})).await
    }

    async fn stop_motion(&self) -> Result<(), DeviceError> {
        self.put("hamp/stop", json!({})).await
    }
}
