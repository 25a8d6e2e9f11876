// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the full source lifecycle against the simulated
//! camera backend

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use stereomux::device::sim::SimulatedSdk;
use stereomux::device::DeviceDescriptor;
use stereomux::{
    AlignTarget, FlowStatus, MuxSource, SourceConfig, SourceError, SourceState, StreamMode,
};

fn fast_sdk() -> Arc<SimulatedSdk> {
    let sdk = Arc::new(SimulatedSdk::new());
    sdk.set_frame_delay(Duration::ZERO);
    sdk
}

/// Unique scratch path for preset-file tests
fn scratch_path(name: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("stereomux-test-{}-{}-{}", std::process::id(), n, name))
}

#[test]
fn test_start_with_no_devices_fails_and_stays_idle() {
    let sdk = Arc::new(SimulatedSdk::empty());
    let mut source = MuxSource::new(sdk, SourceConfig::default());

    let err = source.start().unwrap_err();
    assert!(matches!(err, SourceError::NoDeviceFound));
    assert_eq!(source.state(), SourceState::Idle);
    assert!(source.output_geometry().is_none());
}

#[test]
fn test_unsupported_model_never_opens_a_stream() {
    let sdk = Arc::new(SimulatedSdk::with_devices(vec![DeviceDescriptor {
        model: "Intel RealSense D415".to_string(),
        serial: "000000000001".to_string(),
    }]));
    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), SourceConfig::default());

    let err = source.start().unwrap_err();
    assert!(matches!(err, SourceError::UnsupportedDevice { .. }));
    assert_eq!(source.state(), SourceState::Idle);
    // The gate fired before any stream configuration reached the SDK
    assert!(sdk.last_request().is_none());
}

#[test]
fn test_model_gate_is_configurable() {
    let sdk = Arc::new(SimulatedSdk::with_devices(vec![DeviceDescriptor {
        model: "Simulated Stereo Cam".to_string(),
        serial: "000000000002".to_string(),
    }]));
    sdk.set_frame_delay(Duration::ZERO);

    let mut config = SourceConfig::default();
    config.set_device_model("Simulated Stereo Cam");
    let mut source = MuxSource::new(sdk, config);

    source.start().unwrap();
    assert_eq!(source.state(), SourceState::Running);
    source.stop();
}

#[test]
fn test_start_rejects_invalid_mode_set_directly() {
    // Bypass the property setters (and their soft correction) to model a
    // host that wrote an unvalidated triple straight into the session
    let mut config = SourceConfig::default();
    config.color_mode = StreamMode::new(1000, 1000, 10);

    let mut source = MuxSource::new(fast_sdk(), config);
    let err = source.start().unwrap_err();
    assert!(matches!(err, SourceError::InvalidMode { .. }));
    assert_eq!(source.state(), SourceState::Idle);
}

#[test]
fn test_missing_preset_file_does_not_block_start() {
    let sdk = fast_sdk();
    let mut config = SourceConfig::default();
    config.set_preset_file(Some(scratch_path("missing.json")));

    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), config);
    source.start().unwrap();
    assert_eq!(source.state(), SourceState::Running);
    assert!(sdk.applied_presets().is_empty());
    source.stop();
}

#[test]
fn test_malformed_preset_degrades_to_warning() {
    let sdk = fast_sdk();
    let path = scratch_path("broken.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let mut config = SourceConfig::default();
    config.set_preset_file(Some(path.clone()));

    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), config);
    source.start().unwrap();
    assert!(sdk.applied_presets().is_empty());
    source.stop();
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_valid_preset_is_applied_with_idempotent_advanced_mode() {
    let sdk = fast_sdk();
    let path = scratch_path("preset.json");
    std::fs::write(&path, br#"{"param-depthunits": 1000}"#).unwrap();

    let mut config = SourceConfig::default();
    config.set_preset_file(Some(path.clone()));

    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), config);
    source.start().unwrap();
    assert_eq!(sdk.applied_presets().len(), 1);
    assert_eq!(sdk.advanced_toggles(), 1);
    source.stop();

    // Advanced mode is already on for this device; a restart applies the
    // preset again without toggling
    source.start().unwrap();
    assert_eq!(sdk.applied_presets().len(), 2);
    assert_eq!(sdk.advanced_toggles(), 1);
    source.stop();
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_output_geometry_doubles_color_height() {
    let sdk = fast_sdk();
    let mut config = SourceConfig::default();
    config.set_color_width(640);
    config.set_color_height(480);
    config.set_color_fps(30);

    let mut source = MuxSource::new(sdk, config);
    source.start().unwrap();

    let geometry = source.output_geometry().unwrap();
    assert_eq!(geometry.width, 640);
    assert_eq!(geometry.height, 960);
    assert_eq!(geometry.fps, 30);

    let (buffer, _) = source.create().unwrap();
    assert_eq!(buffer.width, 640);
    assert_eq!(buffer.height, 960);
    assert_eq!(buffer.data.len(), geometry.frame_size());
    source.stop();
}

#[test]
fn test_align_to_depth_uses_depth_geometry() {
    let sdk = fast_sdk();
    let mut config = SourceConfig::default();
    config.set_align(AlignTarget::Depth);

    let mut source = MuxSource::new(sdk, config);
    source.start().unwrap();

    // Color is reprojected into the 640x480 depth viewpoint
    let geometry = source.output_geometry().unwrap();
    assert_eq!(geometry.width, 640);
    assert_eq!(geometry.height, 960);
    source.stop();
}

#[test]
fn test_sequence_indices_increase_without_gaps() {
    let sdk = fast_sdk();
    let mut source = MuxSource::new(sdk, SourceConfig::default());
    source.start().unwrap();

    for expected in 0..5u64 {
        let (buffer, status) = source.create().unwrap();
        assert_eq!(buffer.index, expected);
        assert_eq!(status, FlowStatus::Ok);
    }
    source.stop();

    // Indices restart at zero on the next run; nothing leaks across
    source.start().unwrap();
    let (buffer, _) = source.create().unwrap();
    assert_eq!(buffer.index, 0);
    source.stop();
}

#[test]
fn test_timestamps_are_monotonic() {
    let sdk = Arc::new(SimulatedSdk::new());
    sdk.set_frame_delay(Duration::from_millis(2));
    let mut source = MuxSource::new(sdk, SourceConfig::default());
    source.start().unwrap();

    let (first, _) = source.create().unwrap();
    let (second, _) = source.create().unwrap();
    assert!(second.pts > first.pts);
    source.stop();
}

#[test]
fn test_depth_plane_lands_encoded_in_bottom_half() {
    let sdk = fast_sdk();
    sdk.set_depth_fill(2550);
    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), SourceConfig::default());
    source.start().unwrap();

    let (buffer, _) = source.create().unwrap();
    let bottom = &buffer.data[buffer.data.len() / 2..];
    // 2550 % 10 = 0, 2550 / 10 = 255
    assert!(bottom.chunks_exact(3).all(|p| p == [0, 255, 0]));
    source.stop();
}

#[test]
fn test_cancellation_still_delivers_the_inflight_buffer() {
    let sdk = fast_sdk();
    let mut source = MuxSource::new(sdk, SourceConfig::default());
    source.start().unwrap();

    let (buffer, status) = source.create().unwrap();
    assert_eq!(status, FlowStatus::Ok);
    assert_eq!(buffer.index, 0);

    // Signal raised from a control thread, inspected not awaited
    let signal = source.stop_signal();
    let handle = std::thread::spawn(move || {
        signal.store(true, Ordering::SeqCst);
    });
    handle.join().unwrap();

    let (buffer, status) = source.create().unwrap();
    assert_eq!(status, FlowStatus::Flushing);
    assert_eq!(buffer.index, 1);
    assert!(!buffer.data.is_empty());
    source.stop();

    // Clearing the signal lets the next run flow normally
    source.clear_stop();
    source.start().unwrap();
    let (_, status) = source.create().unwrap();
    assert_eq!(status, FlowStatus::Ok);
    source.stop();
}

#[test]
fn test_device_failure_during_create_is_fatal_for_the_cycle() {
    let sdk = fast_sdk();
    // One pull is consumed by negotiation, one succeeds, then the device
    // goes away
    sdk.fail_pull_after(2);
    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), SourceConfig::default());
    source.start().unwrap();

    assert!(source.create().is_ok());
    let err = source.create().unwrap_err();
    assert!(matches!(err, SourceError::Device(_)));
    source.stop();
}

#[test]
fn test_negotiation_failure_fails_start() {
    let sdk = fast_sdk();
    // The very first pull (the negotiation pull) fails
    sdk.fail_pull_after(0);
    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), SourceConfig::default());

    let err = source.start().unwrap_err();
    assert!(matches!(err, SourceError::Device(_)));
    assert_eq!(source.state(), SourceState::Idle);
    assert!(source.output_geometry().is_none());
}

#[test]
fn test_stop_is_idempotent_and_safe_from_never_started() {
    let sdk = fast_sdk();
    let mut source = MuxSource::new(sdk, SourceConfig::default());

    // Never started
    source.stop();
    assert_eq!(source.state(), SourceState::Idle);

    source.start().unwrap();
    source.stop();
    source.stop();
    assert_eq!(source.state(), SourceState::Idle);

    // create() after stop reports the source as not running
    let err = source.create().unwrap_err();
    assert!(matches!(err, SourceError::NotRunning));
}

#[test]
fn test_reconfiguration_applies_on_next_start_only() {
    let sdk = fast_sdk();
    let mut source = MuxSource::new(Arc::<SimulatedSdk>::clone(&sdk), SourceConfig::default());
    source.start().unwrap();
    assert_eq!(
        sdk.last_request().unwrap().color_mode,
        StreamMode::new(1280, 720, 30)
    );

    // Mutating config mid-run does not touch the live session
    source.config_mut().set_color_width(640);
    source.config_mut().set_color_height(480);
    assert_eq!(
        sdk.last_request().unwrap().color_mode,
        StreamMode::new(1280, 720, 30)
    );
    source.stop();

    source.start().unwrap();
    assert_eq!(
        sdk.last_request().unwrap().color_mode,
        StreamMode::new(640, 480, 30)
    );
    source.stop();
}
