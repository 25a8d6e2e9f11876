// SPDX-License-Identifier: GPL-3.0-only

//! Simulated SDK backend
//!
//! Implements the [`DepthCameraSdk`] seam entirely in memory: a scriptable
//! device list, advanced-mode and preset bookkeeping, deterministic
//! synthetic frame generation at the requested modes, a nearest-neighbor
//! alignment transform, and fault injection for SDK failures. The test
//! suite and the demo binary run the full lifecycle against this backend;
//! a real vendor binding would implement the same traits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::{
    AlignProcessor, ColorFrame, DepthCameraSdk, DepthFrame, DeviceDescriptor, FrameSet,
    StreamPipeline, StreamRequest,
};
use crate::config::AlignTarget;
use crate::constants::DEFAULT_DEVICE_MODEL;
use crate::errors::DeviceError;
use crate::modes::StreamMode;

/// Serial the default simulated device reports
pub const SIM_SERIAL: &str = "923322071364";

#[derive(Debug, Default)]
struct SimState {
    devices: Vec<DeviceDescriptor>,
    /// Serials with advanced mode on
    advanced_enabled: Vec<String>,
    /// How many times advanced mode was toggled (idempotence check)
    advanced_toggles: u32,
    /// Preset JSON documents applied, in order
    applied_presets: Vec<String>,
    /// Stream requests seen by open_pipeline, in order
    open_requests: Vec<StreamRequest>,
    /// Injected failure for the next open_pipeline call
    fail_open: Option<DeviceError>,
    /// Pipelines error out after this many successful pulls
    fail_pull_after: Option<u64>,
    /// Raw depth value every generated pixel carries
    depth_fill: u16,
    /// Sleep per pull to mimic the camera cadence
    frame_delay: Duration,
}

/// In-memory stand-in for the vendor SDK
#[derive(Clone)]
pub struct SimulatedSdk {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSdk {
    /// One attached device of the supported model
    pub fn new() -> Self {
        Self::with_devices(vec![DeviceDescriptor {
            model: DEFAULT_DEVICE_MODEL.to_string(),
            serial: SIM_SERIAL.to_string(),
        }])
    }

    /// No attached devices
    pub fn empty() -> Self {
        Self::with_devices(Vec::new())
    }

    /// A specific set of attached devices, first one selected at start
    pub fn with_devices(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                devices,
                depth_fill: 1000,
                frame_delay: Duration::from_millis(1),
                ..SimState::default()
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Raw depth value every generated pixel will carry
    pub fn set_depth_fill(&self, value: u16) {
        self.lock().depth_fill = value;
    }

    /// Per-pull delay emulating the camera frame period
    pub fn set_frame_delay(&self, delay: Duration) {
        self.lock().frame_delay = delay;
    }

    /// Make the next open_pipeline call fail
    pub fn inject_open_failure(&self, error: DeviceError) {
        self.lock().fail_open = Some(error);
    }

    /// Make pipelines fail after this many successful pulls
    pub fn fail_pull_after(&self, pulls: u64) {
        self.lock().fail_pull_after = Some(pulls);
    }

    /// Preset JSON documents applied so far
    pub fn applied_presets(&self) -> Vec<String> {
        self.lock().applied_presets.clone()
    }

    /// Number of advanced-mode toggles performed
    pub fn advanced_toggles(&self) -> u32 {
        self.lock().advanced_toggles
    }

    /// The last stream request open_pipeline received
    pub fn last_request(&self) -> Option<StreamRequest> {
        self.lock().open_requests.last().cloned()
    }
}

impl Default for SimulatedSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthCameraSdk for SimulatedSdk {
    fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        Ok(self.lock().devices.clone())
    }

    fn is_advanced_mode_enabled(&self, serial: &str) -> Result<bool, DeviceError> {
        Ok(self.lock().advanced_enabled.iter().any(|s| s == serial))
    }

    fn enable_advanced_mode(&self, serial: &str) -> Result<(), DeviceError> {
        let mut state = self.lock();
        state.advanced_toggles += 1;
        if !state.advanced_enabled.iter().any(|s| s == serial) {
            state.advanced_enabled.push(serial.to_string());
        }
        Ok(())
    }

    fn load_preset_json(&self, _serial: &str, json: &str) -> Result<(), DeviceError> {
        self.lock().applied_presets.push(json.to_string());
        Ok(())
    }

    fn open_pipeline(
        &self,
        request: &StreamRequest,
    ) -> Result<Box<dyn StreamPipeline>, DeviceError> {
        let mut state = self.lock();
        state.open_requests.push(request.clone());
        if let Some(error) = state.fail_open.take() {
            return Err(error);
        }
        debug!(
            serial = %request.serial,
            color = %request.color_mode,
            depth = %request.depth_mode,
            "Opening simulated pipeline"
        );
        Ok(Box::new(SimulatedPipeline {
            color_mode: request.color_mode,
            depth_mode: request.depth_mode,
            sdk_state: Arc::clone(&self.state),
            frame_index: AtomicU64::new(0),
            stopped: false,
        }))
    }

    fn create_align(&self, target: AlignTarget) -> Result<Box<dyn AlignProcessor>, DeviceError> {
        Ok(Box::new(NearestAligner { target }))
    }
}

/// Pipeline generating deterministic synthetic frame sets
struct SimulatedPipeline {
    color_mode: StreamMode,
    depth_mode: StreamMode,
    sdk_state: Arc<Mutex<SimState>>,
    frame_index: AtomicU64,
    stopped: bool,
}

impl StreamPipeline for SimulatedPipeline {
    fn wait_for_frames(&mut self) -> Result<FrameSet, DeviceError> {
        if self.stopped {
            return Err(DeviceError::new(
                "wait_for_frames",
                "pipeline",
                "pipeline is stopped",
            ));
        }

        let (depth_fill, fail_after, delay) = {
            let state = self
                .sdk_state
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            (state.depth_fill, state.fail_pull_after, state.frame_delay)
        };

        let index = self.frame_index.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = fail_after
            && index >= limit
        {
            return Err(DeviceError::new(
                "wait_for_frames",
                format!("frame {}", index),
                "simulated device disconnect",
            ));
        }

        thread::sleep(delay);

        let color = synth_color_frame(self.color_mode, index);
        let depth = synth_depth_frame(self.depth_mode, depth_fill);
        Ok(FrameSet { color, depth })
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Deterministic RGB gradient, varying per frame so consumers can tell
/// successive buffers apart
fn synth_color_frame(mode: StreamMode, frame_index: u64) -> ColorFrame {
    let (w, h) = (mode.width as usize, mode.height as usize);
    let mut data = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 3;
            data[i] = (x + frame_index as usize) as u8;
            data[i + 1] = y as u8;
            data[i + 2] = (x ^ y) as u8;
        }
    }
    ColorFrame {
        width: mode.width,
        height: mode.height,
        data,
    }
}

/// Constant-depth plane, emitted through the same raw Z16 byte path a real
/// SDK delivers
fn synth_depth_frame(mode: StreamMode, fill: u16) -> DepthFrame {
    let pixels = mode.width as usize * mode.height as usize;
    let mut bytes = Vec::with_capacity(pixels * 2);
    for _ in 0..pixels {
        bytes.extend_from_slice(&fill.to_le_bytes());
    }
    DepthFrame::from_z16_bytes(mode.width, mode.height, &bytes)
        .unwrap_or(DepthFrame {
            width: mode.width,
            height: mode.height,
            data: vec![fill; pixels],
        })
}

/// Nearest-neighbor reprojection standing in for the SDK align primitive
struct NearestAligner {
    target: AlignTarget,
}

impl AlignProcessor for NearestAligner {
    fn process(&self, frames: FrameSet) -> FrameSet {
        match self.target {
            AlignTarget::Color => {
                let depth = resize_depth(&frames.depth, frames.color.width, frames.color.height);
                FrameSet {
                    color: frames.color,
                    depth,
                }
            }
            AlignTarget::Depth => {
                let color = resize_color(&frames.color, frames.depth.width, frames.depth.height);
                FrameSet {
                    color,
                    depth: frames.depth,
                }
            }
            AlignTarget::None => frames,
        }
    }
}

fn resize_depth(src: &DepthFrame, width: u32, height: u32) -> DepthFrame {
    if src.width == width && src.height == height {
        return src.clone();
    }
    let (sw, sh) = (src.width as usize, src.height as usize);
    let (dw, dh) = (width as usize, height as usize);
    let mut data = vec![0u16; dw * dh];
    for y in 0..dh {
        let sy = y * sh / dh;
        for x in 0..dw {
            let sx = x * sw / dw;
            data[y * dw + x] = src.data[sy * sw + sx];
        }
    }
    DepthFrame {
        width,
        height,
        data,
    }
}

fn resize_color(src: &ColorFrame, width: u32, height: u32) -> ColorFrame {
    if src.width == width && src.height == height {
        return src.clone();
    }
    let (sw, sh) = (src.width as usize, src.height as usize);
    let (dw, dh) = (width as usize, height as usize);
    let mut data = vec![0u8; dw * dh * 3];
    for y in 0..dh {
        let sy = y * sh / dh;
        for x in 0..dw {
            let sx = x * sw / dw;
            let d = (y * dw + x) * 3;
            let s = (sy * sw + sx) * 3;
            data[d..d + 3].copy_from_slice(&src.data[s..s + 3]);
        }
    }
    ColorFrame {
        width,
        height,
        data,
    }
}
