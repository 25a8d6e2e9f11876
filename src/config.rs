// SPDX-License-Identifier: GPL-3.0-only

//! Source configuration
//!
//! Configuration arrives from the host property layer one field at a time,
//! so each setter re-checks the affected stream's (width, height, fps)
//! triple as soon as all three fields are positive. An invalid triple is
//! reset to the stream's default with a warning; only the values in force
//! at start time are validated fatally.
//!
//! Changing any option while the source is running has no effect until the
//! next start.

use crate::constants::DEFAULT_DEVICE_MODEL;
use crate::modes::{self, StreamKind, StreamMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Which stream's viewpoint the other stream is reprojected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignTarget {
    /// No reprojection; both streams keep their native geometry
    None,
    /// Reproject depth into the color viewpoint (default)
    #[default]
    Color,
    /// Reproject color into the depth viewpoint
    Depth,
}

impl AlignTarget {
    /// Parse the numeric property value (0=None, 1=Color, 2=Depth)
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(AlignTarget::None),
            1 => Some(AlignTarget::Color),
            2 => Some(AlignTarget::Depth),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlignTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignTarget::None => write!(f, "none"),
            AlignTarget::Color => write!(f, "color"),
            AlignTarget::Depth => write!(f, "depth"),
        }
    }
}

/// All options the source recognizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Alignment between the color and depth sensors
    pub align: AlignTarget,
    /// Requested color stream mode
    pub color_mode: StreamMode,
    /// Requested depth stream mode
    pub depth_mode: StreamMode,
    /// Optional advanced-mode preset JSON applied at start (best effort)
    pub preset_file: Option<PathBuf>,
    /// Model identifier the device gate accepts; anything else fails start
    pub device_model: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            align: AlignTarget::default(),
            color_mode: modes::DEFAULT_COLOR_MODE,
            depth_mode: modes::DEFAULT_DEPTH_MODE,
            preset_file: None,
            device_model: DEFAULT_DEVICE_MODEL.to_string(),
        }
    }
}

impl SourceConfig {
    /// The currently held mode for one stream
    pub fn mode(&self, kind: StreamKind) -> StreamMode {
        match kind {
            StreamKind::Color => self.color_mode,
            StreamKind::Depth => self.depth_mode,
        }
    }

    fn mode_mut(&mut self, kind: StreamKind) -> &mut StreamMode {
        match kind {
            StreamKind::Color => &mut self.color_mode,
            StreamKind::Depth => &mut self.depth_mode,
        }
    }

    /// Soft validation tier: once the triple is fully specified, an invalid
    /// combination reverts to the stream default with a warning. Returns
    /// true if the mode was reset.
    pub fn sanitize_mode(&mut self, kind: StreamKind) -> bool {
        let mode = self.mode(kind);
        if mode.is_fully_specified() && !modes::is_valid_mode(kind, mode) {
            let fallback = kind.default_mode();
            warn!(
                stream = %kind,
                requested = %mode,
                fallback = %fallback,
                "Invalid mode requested, reverting to default"
            );
            *self.mode_mut(kind) = fallback;
            return true;
        }
        false
    }

    pub fn set_align(&mut self, align: AlignTarget) {
        self.align = align;
    }

    pub fn set_color_width(&mut self, width: u32) {
        self.mode_mut(StreamKind::Color).width = width;
        self.sanitize_mode(StreamKind::Color);
    }

    pub fn set_color_height(&mut self, height: u32) {
        self.mode_mut(StreamKind::Color).height = height;
        self.sanitize_mode(StreamKind::Color);
    }

    pub fn set_color_fps(&mut self, fps: u32) {
        self.mode_mut(StreamKind::Color).fps = fps;
        self.sanitize_mode(StreamKind::Color);
    }

    pub fn set_depth_width(&mut self, width: u32) {
        self.mode_mut(StreamKind::Depth).width = width;
        self.sanitize_mode(StreamKind::Depth);
    }

    pub fn set_depth_height(&mut self, height: u32) {
        self.mode_mut(StreamKind::Depth).height = height;
        self.sanitize_mode(StreamKind::Depth);
    }

    pub fn set_depth_fps(&mut self, fps: u32) {
        self.mode_mut(StreamKind::Depth).fps = fps;
        self.sanitize_mode(StreamKind::Depth);
    }

    pub fn set_preset_file(&mut self, path: Option<PathBuf>) {
        // An empty path means "no preset", same as unset
        self.preset_file = path.filter(|p| !p.as_os_str().is_empty());
    }

    pub fn set_device_model(&mut self, model: impl Into<String>) {
        self.device_model = model.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::{DEFAULT_COLOR_MODE, DEFAULT_DEPTH_MODE};

    #[test]
    fn test_defaults_match_documented_values() {
        let config = SourceConfig::default();
        assert_eq!(config.align, AlignTarget::Color);
        assert_eq!(config.color_mode, StreamMode::new(1280, 720, 30));
        assert_eq!(config.depth_mode, StreamMode::new(640, 480, 30));
        assert!(config.preset_file.is_none());
        assert_eq!(config.device_model, DEFAULT_DEVICE_MODEL);
    }

    #[test]
    fn test_invalid_color_triple_reverts_to_default() {
        let mut config = SourceConfig::default();
        config.set_color_width(1000);
        assert_eq!(config.color_mode, DEFAULT_COLOR_MODE);
    }

    #[test]
    fn test_invalid_depth_triple_reverts_to_default() {
        let mut config = SourceConfig::default();
        config.set_depth_fps(45);
        assert_eq!(config.depth_mode, DEFAULT_DEPTH_MODE);
    }

    #[test]
    fn test_incremental_configuration_lands_on_valid_mode() {
        // Each intermediate triple happens to be valid here, so the soft
        // tier never fires and the final mode is exactly what was asked.
        let mut config = SourceConfig::default();
        config.set_depth_width(848);
        config.set_depth_height(480);
        config.set_depth_fps(90);
        assert_eq!(config.depth_mode, StreamMode::new(848, 480, 90));
    }

    #[test]
    fn test_valid_reconfiguration_is_kept() {
        let mut config = SourceConfig::default();
        config.set_color_width(640);
        config.set_color_height(480);
        config.set_color_fps(60);
        assert_eq!(config.color_mode, StreamMode::new(640, 480, 60));
    }

    #[test]
    fn test_empty_preset_path_means_unset() {
        let mut config = SourceConfig::default();
        config.set_preset_file(Some(PathBuf::new()));
        assert!(config.preset_file.is_none());
        config.set_preset_file(Some(PathBuf::from("/tmp/preset.json")));
        assert!(config.preset_file.is_some());
    }

    #[test]
    fn test_align_from_index() {
        assert_eq!(AlignTarget::from_index(0), Some(AlignTarget::None));
        assert_eq!(AlignTarget::from_index(1), Some(AlignTarget::Color));
        assert_eq!(AlignTarget::from_index(2), Some(AlignTarget::Depth));
        assert_eq!(AlignTarget::from_index(3), None);
        assert_eq!(AlignTarget::from_index(-1), None);
    }
}
