// SPDX-License-Identifier: GPL-3.0-only

//! Frame multiplexer
//!
//! Fuses one synchronized color + depth pair into a single packed RGB
//! buffer: color bytes verbatim in the top half, depth re-encoded per
//! pixel in the bottom half. Pure transform, no I/O.

use std::time::Duration;

use crate::constants::{DEPTH_ENCODE_LIMIT, OUTPUT_BYTES_PER_PIXEL};
use crate::device::{ColorFrame, DepthFrame};
use crate::errors::{SourceError, SourceResult};

/// The single output artifact: color on top, encoded depth below.
///
/// Allocated fresh each acquisition cycle and handed off to the consumer;
/// the source never reads it again.
#[derive(Debug, Clone)]
pub struct MuxedBuffer {
    /// Color frame width
    pub width: u32,
    /// Twice the color frame height
    pub height: u32,
    /// Packed RGB bytes, width * height * 3
    pub data: Vec<u8>,
    /// Presentation timestamp relative to the run's base time (DTS is
    /// defined equal to PTS for this source)
    pub pts: Duration,
    /// Sequence index within the run; starts at 0, no gaps
    pub index: u64,
}

/// Encode one raw depth reading as an RGB pixel.
///
/// Values inside the window decompose decimally: red and blue both carry
/// `d % 10`, green carries `d / 10`. Values at or beyond the window encode
/// to black, exactly like a zero no-return reading; the two cases are
/// deliberately indistinguishable downstream. Lossy and range-limited, but
/// it is the format existing demuxers decode.
#[inline]
pub fn encode_depth_pixel(d: u16) -> [u8; 3] {
    if d < DEPTH_ENCODE_LIMIT {
        [(d % 10) as u8, (d / 10) as u8, (d % 10) as u8]
    } else {
        [0, 0, 0]
    }
}

/// Multiplex a color and a depth frame into one output payload.
///
/// The caller guarantees the two frames carry the active post-alignment
/// geometry; pixel counts are not re-validated here beyond sizing the
/// output from the color frame. Allocation failure is fatal for this
/// cycle only.
pub fn mux_frames(color: &ColorFrame, depth: &DepthFrame) -> SourceResult<Vec<u8>> {
    let half = color.num_pixels() * OUTPUT_BYTES_PER_PIXEL;
    let total = half * 2;

    let mut data = Vec::new();
    data.try_reserve_exact(total)
        .map_err(|_| SourceError::BufferAllocationFailed { requested: total })?;

    // Top half: verbatim color bytes, formats already match
    data.extend_from_slice(&color.data);

    // Bottom half: per-pixel depth encoding
    for &d in &depth.data {
        data.extend_from_slice(&encode_depth_pixel(d));
    }

    Ok(data)
}
