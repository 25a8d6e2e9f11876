// SPDX-License-Identifier: GPL-3.0-only

//! Crate-wide constants

/// Depth values at or beyond this raw distance encode to black.
///
/// The bottom-half encoding only discriminates depth inside a 2560-unit
/// window using decimal decomposition (`d % 10`, `d / 10`); anything at or
/// past the window, including the no-return sentinel, is an
/// indistinguishable `(0, 0, 0)` pixel. This precision loss is part of the
/// wire contract that downstream demuxers decode, so it must not change.
pub const DEPTH_ENCODE_LIMIT: u16 = 2560;

/// Bytes per pixel of the packed RGB output buffer
pub const OUTPUT_BYTES_PER_PIXEL: usize = 3;

/// Framerate declared on the output, regardless of the configured stream fps.
///
/// The negotiated caps always claim 30 fps even when the streams run at 6,
/// 15, 60 or 90. Deriving this from the actual stream rate would change the
/// declared cadence for every existing consumer, so the fixed value stays
/// until a compatibility decision says otherwise.
pub const NOMINAL_OUTPUT_FPS: u32 = 30;

/// Model identifier the device gate accepts by default.
///
/// The depth encoding window and the preset mechanism are calibrated to this
/// one sensor family, so the gate is fail-closed: anything else is rejected
/// at start. Tests and simulators override it via `SourceConfig`.
pub const DEFAULT_DEVICE_MODEL: &str = "Intel RealSense D435I";
