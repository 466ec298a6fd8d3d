//! # Sedusa Core Library
//!
//! This library turns declarative haptic motifs into timed actuation and plays
//! them back as a narrated, multi-act session against a stroker device. The
//! `sedusa` CLI binary is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Motifs**: Pattern definitions and the JSON banks they are loaded from
//! - **Timeline**: Compiles a pattern into overlapping, time-offset segments
//! - **Story**: Act timeline, contrast-seeking playlists, and the control loop
//!   that drives the device one 60ms tick at a time
//! - **Device**: The actuator contract and an HTTP client for the Handy API
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`compile_by_name`]: Pattern name to segments, never failing
//! - [`SessionManager`]: Start, pause, resume, stop, and observe a session
//! - [`Actuator`]: Trait the control loop issues commands through
//! - [`Config`]: Application configuration management

pub mod device;
pub mod error;
pub mod motifs;
pub mod storage;
pub mod story;
pub mod timeline;

pub use device::{Actuator, DeviceMode, HandyClient, HandySettings};
pub use error::{BankError, ConfigError, CoreError, DeviceError, Result, ValidationError};
pub use motifs::{MotifLibrary, Motion, PatternDefinition, PatternKind, PatternLookup, SubSegment};
pub use storage::Config;
pub use story::{
    act_timeline, Act, ActPhase, Caps, Lifecycle, Narrative, SessionManager, SessionRequest, StatusSnapshot,
    StoryLog, StorySettings,
};
pub use timeline::{compile_by_name, compile_pattern, Band, Segment, DEFAULT_OVERLAP};
