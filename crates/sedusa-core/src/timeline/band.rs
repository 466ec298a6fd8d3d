use serde::{Deserialize, Serialize};

/// Coarse depth zone: shallow, middle, or deep third of the stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
    C,
}

impl Band {
    /// Classify a depth percentage (0-100).
    pub fn from_depth(depth_percent: f64) -> Self {
        if depth_percent < 33.0 {
            Band::A
        } else if depth_percent < 66.0 {
            Band::B
        } else {
            Band::C
        }
    }

    /// Position of the band's center, in thirds of the usable span.
    pub fn center_thirds(self) -> f64 {
        match self {
            Band::A => 0.5,
            Band::B => 1.5,
            Band::C => 2.5,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Band::A => "A",
            Band::B => "B",
            Band::C => "C",
        };
        f.write_str(s)
    }
}
