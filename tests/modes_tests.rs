// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for mode validation and the two-tier policy

use stereomux::modes::{
    DEFAULT_COLOR_MODE, DEFAULT_DEPTH_MODE, VALID_COLOR_MODES, VALID_DEPTH_MODES,
    is_valid_color_mode, is_valid_depth_mode,
};
use stereomux::{SourceConfig, StreamMode};

#[test]
fn test_every_table_entry_validates() {
    for &mode in VALID_COLOR_MODES {
        assert!(is_valid_color_mode(mode), "color {} should be valid", mode);
    }
    for &mode in VALID_DEPTH_MODES {
        assert!(is_valid_depth_mode(mode), "depth {} should be valid", mode);
    }
}

#[test]
fn test_neighbors_of_table_entries_fail() {
    // Perturbing any field of a valid triple by one must fail: membership
    // is exact, no fuzzy matching.
    for &mode in VALID_COLOR_MODES {
        let off = StreamMode::new(mode.width + 1, mode.height, mode.fps);
        assert!(!is_valid_color_mode(off), "{} should be invalid", off);
        let off = StreamMode::new(mode.width, mode.height + 1, mode.fps);
        assert!(!is_valid_color_mode(off), "{} should be invalid", off);
        let off = StreamMode::new(mode.width, mode.height, mode.fps + 1);
        assert!(!is_valid_color_mode(off), "{} should be invalid", off);
    }
    for &mode in VALID_DEPTH_MODES {
        let off = StreamMode::new(mode.width, mode.height, mode.fps + 1);
        assert!(!is_valid_depth_mode(off), "{} should be invalid", off);
    }
}

#[test]
fn test_universes_are_disjoint_where_expected() {
    // 1920x1080 is color-only, 480x270 is depth-only
    assert!(!is_valid_depth_mode(StreamMode::new(1920, 1080, 30)));
    assert!(!is_valid_color_mode(StreamMode::new(480, 270, 30)));
    // 90 fps exists only on depth
    assert!(!is_valid_color_mode(StreamMode::new(848, 480, 90)));
    assert!(is_valid_depth_mode(StreamMode::new(848, 480, 90)));
}

#[test]
fn test_configuration_time_reset_to_documented_defaults() {
    let mut config = SourceConfig::default();

    config.set_color_width(333);
    assert_eq!(config.color_mode, DEFAULT_COLOR_MODE);
    assert_eq!(config.color_mode, StreamMode::new(1280, 720, 30));

    config.set_depth_height(333);
    assert_eq!(config.depth_mode, DEFAULT_DEPTH_MODE);
    assert_eq!(config.depth_mode, StreamMode::new(640, 480, 30));
}

#[test]
fn test_soft_tier_leaves_valid_modes_alone() {
    let mut config = SourceConfig::default();
    config.set_color_width(1920);
    config.set_color_height(1080);
    config.set_color_fps(15);
    assert_eq!(config.color_mode, StreamMode::new(1920, 1080, 15));
}
