// SPDX-License-Identifier: GPL-3.0-only

//! Vendor SDK capability boundary
//!
//! The source never talks to camera hardware directly; everything it needs
//! from the vendor SDK (device enumeration, the stream pipeline, the
//! alignment primitive, advanced-mode presets) is expressed as the traits
//! in this module. A real SDK binding and the in-tree simulated backend
//! implement the same seam, so the whole lifecycle is testable without
//! hardware.

pub mod session;
pub mod sim;

use crate::config::AlignTarget;
use crate::errors::DeviceError;
use crate::modes::StreamMode;

/// A packed 3-channel 8-bit color image
#[derive(Debug, Clone)]
pub struct ColorFrame {
    pub width: u32,
    pub height: u32,
    /// RGB bytes, row-major, width * height * 3
    pub data: Vec<u8>,
}

impl ColorFrame {
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A 16-bit single-channel linear depth image
#[derive(Debug, Clone)]
pub struct DepthFrame {
    pub width: u32,
    pub height: u32,
    /// Raw distance units per pixel, row-major; 0 means no valid reading
    pub data: Vec<u16>,
}

impl DepthFrame {
    /// Build a frame from the raw Z16 byte payload the SDK delivers.
    /// Returns None if the byte count does not match the dimensions.
    pub fn from_z16_bytes(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        let expected = width as usize * height as usize * 2;
        if bytes.len() != expected {
            return None;
        }
        // pod_collect_to_vec copes with unaligned input, unlike cast_slice
        let data: Vec<u16> = bytemuck::pod_collect_to_vec(bytes);
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// The frame as raw Z16 bytes
    pub fn as_z16_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One synchronized color + depth pair pulled from the device.
///
/// Produced by a single blocking pull and consumed fully within the same
/// acquisition cycle; never retained across cycles.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub color: ColorFrame,
    pub depth: DepthFrame,
}

/// Identity of an enumerated device
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Model string reported by the device (checked by the gate)
    pub model: String,
    /// Serial number the streams are bound to
    pub serial: String,
}

/// Stream configuration handed to the SDK when opening the pipeline
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Serial of the device to bind
    pub serial: String,
    /// Color stream: packed RGB 8-bit at this mode
    pub color_mode: StreamMode,
    /// Depth stream: 16-bit linear Z16 at this mode
    pub depth_mode: StreamMode,
}

/// A started acquisition pipeline delivering synchronized frame sets
pub trait StreamPipeline: Send {
    /// Block until the next synchronized frame set is available.
    ///
    /// May block for up to one frame period. Any SDK failure is fatal for
    /// the cycle and is not retried here.
    fn wait_for_frames(&mut self) -> Result<FrameSet, DeviceError>;

    /// Tear the pipeline down. Must be safe to call more than once.
    fn stop(&mut self);
}

/// The SDK's alignment primitive: reprojects one stream of a frame set
/// into the other stream's viewpoint so pixels correspond 1:1.
pub trait AlignProcessor: Send {
    fn process(&self, frames: FrameSet) -> FrameSet;
}

/// Everything the source needs from the vendor SDK
pub trait DepthCameraSdk: Send + Sync {
    /// Enumerate attached devices, in SDK order
    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, DeviceError>;

    /// Whether the device's advanced configuration mode is already on
    fn is_advanced_mode_enabled(&self, serial: &str) -> Result<bool, DeviceError>;

    /// Turn on advanced configuration mode
    fn enable_advanced_mode(&self, serial: &str) -> Result<(), DeviceError>;

    /// Apply a preset JSON document as the active device configuration
    fn load_preset_json(&self, serial: &str, json: &str) -> Result<(), DeviceError>;

    /// Open and start the acquisition pipeline for the requested streams
    fn open_pipeline(&self, request: &StreamRequest)
    -> Result<Box<dyn StreamPipeline>, DeviceError>;

    /// Instantiate the alignment transform targeting the given stream.
    ///
    /// Never called with `AlignTarget::None`.
    fn create_align(&self, target: AlignTarget) -> Result<Box<dyn AlignProcessor>, DeviceError>;
}
