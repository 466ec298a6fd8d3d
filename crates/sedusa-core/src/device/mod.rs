//! Actuator contract and the stroker client that implements it.

mod handy;

pub use handy::{slide_percentages, velocity_percent, DeviceMode, HandyClient, HandySettings, FULL_TRAVEL_MM};

use std::future::Future;

use crate::error::DeviceError;

/// The four commands the scheduler issues.
///
/// Implementations de-duplicate `set_window`/`set_speed` against the last
/// value sent and hide any vendor unit conversion. Calls are issued one at a
/// time by the control loop, but `pause`/`stop` may come from other tasks, so
/// implementations must be `Sync`.
pub trait Actuator: Send + Sync + 'static {
    fn set_window(&self, min_mm: f64, max_mm: f64) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn set_speed(&self, hz: f64) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn start_motion(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn stop_motion(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;
}
