//! Story playback: act timeline, playlists, and the session control loop.

pub mod acts;
pub mod drivers;
pub mod manager;
pub mod narrative;
pub mod params;
pub mod playlist;
pub mod runner;
pub mod selection;
pub mod session;

pub use acts::{act_timeline, Act, ActPhase};
pub use drivers::{DriveCommand, MotionRange};
pub use manager::SessionManager;
pub use narrative::Narrative;
pub use params::{Caps, SessionParams, SessionRequest};
pub use playlist::{build_playlist, Playlist};
pub use runner::{PhaseLog, StoryLog, StoryRunner, StorySettings};
pub use session::{Lifecycle, SessionControl, SessionShared, StatusSnapshot};
