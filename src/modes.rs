// SPDX-License-Identifier: GPL-3.0-only

//! Supported stream mode tables and validation
//!
//! The sensor family only accepts a closed set of (width, height, fps)
//! combinations per stream. Validation is exact membership against these
//! tables; there is no fuzzy matching or range interpolation. A mode that
//! is not in its table is never applied to hardware.

use serde::{Deserialize, Serialize};

/// A requested (width, height, fps) triple for one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamMode {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl StreamMode {
    pub const fn new(width: u32, height: u32, fps: u32) -> Self {
        Self { width, height, fps }
    }

    /// All three fields set to something (possibly invalid)
    pub fn is_fully_specified(&self) -> bool {
        self.width > 0 && self.height > 0 && self.fps > 0
    }
}

impl std::fmt::Display for StreamMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.fps)
    }
}

/// Which of the two sensor streams a mode belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    Color,
    Depth,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Color => write!(f, "color"),
            StreamKind::Depth => write!(f, "depth"),
        }
    }
}

/// Default color mode applied when an invalid color triple is corrected
pub const DEFAULT_COLOR_MODE: StreamMode = StreamMode::new(1280, 720, 30);

/// Default depth mode applied when an invalid depth triple is corrected
pub const DEFAULT_DEPTH_MODE: StreamMode = StreamMode::new(640, 480, 30);

/// Color stream modes the sensor accepts
pub const VALID_COLOR_MODES: &[StreamMode] = &[
    StreamMode::new(1920, 1080, 6),
    StreamMode::new(1920, 1080, 15),
    StreamMode::new(1920, 1080, 30),
    StreamMode::new(1280, 720, 6),
    StreamMode::new(1280, 720, 15),
    StreamMode::new(1280, 720, 30),
    StreamMode::new(960, 540, 6),
    StreamMode::new(960, 540, 15),
    StreamMode::new(960, 540, 30),
    StreamMode::new(960, 540, 60),
    StreamMode::new(848, 480, 6),
    StreamMode::new(848, 480, 15),
    StreamMode::new(848, 480, 30),
    StreamMode::new(848, 480, 60),
    StreamMode::new(640, 480, 6),
    StreamMode::new(640, 480, 15),
    StreamMode::new(640, 480, 30),
    StreamMode::new(640, 480, 60),
    StreamMode::new(640, 360, 6),
    StreamMode::new(640, 360, 15),
    StreamMode::new(640, 360, 30),
    StreamMode::new(640, 360, 60),
    StreamMode::new(424, 240, 6),
    StreamMode::new(424, 240, 15),
    StreamMode::new(424, 240, 30),
    StreamMode::new(424, 240, 60),
    StreamMode::new(320, 240, 6),
    StreamMode::new(320, 240, 30),
    StreamMode::new(320, 240, 60),
    StreamMode::new(320, 180, 6),
    StreamMode::new(320, 180, 30),
    StreamMode::new(320, 180, 60),
];

/// Depth stream modes the sensor accepts
pub const VALID_DEPTH_MODES: &[StreamMode] = &[
    StreamMode::new(1280, 720, 6),
    StreamMode::new(1280, 720, 15),
    StreamMode::new(1280, 720, 30),
    StreamMode::new(848, 480, 6),
    StreamMode::new(848, 480, 15),
    StreamMode::new(848, 480, 30),
    StreamMode::new(848, 480, 60),
    StreamMode::new(848, 480, 90),
    StreamMode::new(640, 480, 6),
    StreamMode::new(640, 480, 15),
    StreamMode::new(640, 480, 30),
    StreamMode::new(640, 480, 60),
    StreamMode::new(640, 480, 90),
    StreamMode::new(640, 360, 6),
    StreamMode::new(640, 360, 15),
    StreamMode::new(640, 360, 30),
    StreamMode::new(640, 360, 60),
    StreamMode::new(640, 360, 90),
    StreamMode::new(480, 270, 6),
    StreamMode::new(480, 270, 15),
    StreamMode::new(480, 270, 30),
    StreamMode::new(480, 270, 60),
    StreamMode::new(480, 270, 90),
    StreamMode::new(424, 240, 6),
    StreamMode::new(424, 240, 15),
    StreamMode::new(424, 240, 30),
    StreamMode::new(424, 240, 60),
    StreamMode::new(424, 240, 90),
];

impl StreamKind {
    /// The mode table for this stream
    pub fn valid_modes(&self) -> &'static [StreamMode] {
        match self {
            StreamKind::Color => VALID_COLOR_MODES,
            StreamKind::Depth => VALID_DEPTH_MODES,
        }
    }

    /// The hardcoded default this stream reverts to on invalid configuration
    pub fn default_mode(&self) -> StreamMode {
        match self {
            StreamKind::Color => DEFAULT_COLOR_MODE,
            StreamKind::Depth => DEFAULT_DEPTH_MODE,
        }
    }
}

/// Exact membership test against the stream's mode table
pub fn is_valid_mode(kind: StreamKind, mode: StreamMode) -> bool {
    kind.valid_modes().contains(&mode)
}

pub fn is_valid_color_mode(mode: StreamMode) -> bool {
    is_valid_mode(StreamKind::Color, mode)
}

pub fn is_valid_depth_mode(mode: StreamMode) -> bool {
    is_valid_mode(StreamKind::Depth, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_modes_are_valid() {
        assert!(is_valid_color_mode(StreamMode::new(1920, 1080, 30)));
        assert!(is_valid_color_mode(StreamMode::new(320, 180, 60)));
        assert!(is_valid_depth_mode(StreamMode::new(848, 480, 90)));
        assert!(is_valid_depth_mode(StreamMode::new(424, 240, 6)));
    }

    #[test]
    fn test_membership_is_exact() {
        // Right resolution, unsupported rate
        assert!(!is_valid_color_mode(StreamMode::new(1920, 1080, 60)));
        assert!(!is_valid_color_mode(StreamMode::new(320, 240, 15)));
        // Depth-only resolution is not a color mode and vice versa
        assert!(!is_valid_color_mode(StreamMode::new(480, 270, 30)));
        assert!(!is_valid_depth_mode(StreamMode::new(1920, 1080, 30)));
        // Nothing close counts
        assert!(!is_valid_depth_mode(StreamMode::new(641, 480, 30)));
        assert!(!is_valid_depth_mode(StreamMode::new(640, 480, 29)));
    }

    #[test]
    fn test_defaults_are_members_of_their_tables() {
        assert!(is_valid_color_mode(DEFAULT_COLOR_MODE));
        assert!(is_valid_depth_mode(DEFAULT_DEPTH_MODE));
    }

    #[test]
    fn test_zero_fields_never_validate() {
        assert!(!is_valid_color_mode(StreamMode::new(0, 720, 30)));
        assert!(!is_valid_depth_mode(StreamMode::new(640, 0, 30)));
        assert!(!is_valid_depth_mode(StreamMode::new(640, 480, 0)));
    }
}
