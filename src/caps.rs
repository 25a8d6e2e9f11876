// SPDX-License-Identifier: GPL-3.0-only

//! Output geometry negotiation
//!
//! The declared output geometry comes from the first real frame after
//! start, not from the configured properties: with alignment active the
//! device-negotiated dimensions can legitimately differ from what was
//! requested. Computed once per run; renegotiation requires a full
//! stop/start cycle.

use crate::constants::{NOMINAL_OUTPUT_FPS, OUTPUT_BYTES_PER_PIXEL};
use crate::device::ColorFrame;

/// Negotiated geometry of the muxed output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    /// Color frame width
    pub width: u32,
    /// Twice the color frame height: color on top, encoded depth below
    pub height: u32,
    /// Declared framerate; fixed nominal value, see NOMINAL_OUTPUT_FPS
    pub fps: u32,
}

impl OutputGeometry {
    /// Derive the output geometry from the first aligned color frame
    pub fn from_color_frame(frame: &ColorFrame) -> Self {
        Self {
            width: frame.width,
            height: frame.height * 2,
            fps: NOMINAL_OUTPUT_FPS,
        }
    }

    /// Size in bytes of one output buffer, for block-size negotiation
    pub fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * OUTPUT_BYTES_PER_PIXEL
    }

    /// Raw bitrate of the output in bits per second
    pub fn bitrate_bps(&self) -> u64 {
        self.frame_size() as u64 * 8 * self.fps as u64
    }
}

impl std::fmt::Display for OutputGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.fps)
    }
}
