//! Timeline compiler: motif definitions to time-ordered segments.

mod band;
mod compiler;
mod segment;

pub use band::Band;
pub use compiler::{compile_by_name, compile_pattern, DEFAULT_OVERLAP};
pub use segment::{span, speed_percent_to_hz, Segment, HZ_AT_FULL_SPEED};
