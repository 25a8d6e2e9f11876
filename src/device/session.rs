// SPDX-License-Identifier: GPL-3.0-only

//! Device session: one exclusive claim on a physical camera
//!
//! A session owns the device from discovery through pipeline start and is
//! destroyed at stop or on any error during start. The core assumes at
//! most one concurrent session per process.

use std::fs;

use tracing::{debug, info, warn};

use super::{AlignProcessor, DepthCameraSdk, FrameSet, StreamPipeline, StreamRequest};
use crate::config::{AlignTarget, SourceConfig};
use crate::errors::{SourceError, SourceResult};

/// A started camera session: bound device, live pipeline, optional aligner
pub struct DeviceSession {
    /// Serial of the device this session claimed
    serial: String,
    pipeline: Option<Box<dyn StreamPipeline>>,
    aligner: Option<Box<dyn AlignProcessor>>,
}

impl DeviceSession {
    /// Discover, gate, configure and start the camera.
    ///
    /// Any failure aborts the whole sequence; no partially started session
    /// is ever returned. The preset file is best effort: a missing or
    /// unparseable file degrades to a warning and the device keeps its
    /// default configuration.
    pub fn start(sdk: &dyn DepthCameraSdk, config: &SourceConfig) -> SourceResult<Self> {
        let devices = sdk.enumerate_devices()?;
        let Some(device) = devices.first() else {
            return Err(SourceError::NoDeviceFound);
        };

        // Hard compatibility fence: the depth encoding and the preset
        // mechanism are calibrated to a single sensor family.
        if device.model != config.device_model {
            return Err(SourceError::UnsupportedDevice {
                model: device.model.clone(),
                expected: config.device_model.clone(),
            });
        }

        let serial = device.serial.clone();
        info!(model = %device.model, serial = %serial, "Claimed depth camera");

        if let Some(preset_path) = &config.preset_file {
            Self::apply_preset(sdk, &serial, preset_path)?;
        }

        let request = StreamRequest {
            serial: serial.clone(),
            color_mode: config.color_mode,
            depth_mode: config.depth_mode,
        };
        let pipeline = sdk.open_pipeline(&request)?;

        let aligner = match config.align {
            AlignTarget::None => None,
            target => Some(sdk.create_align(target)?),
        };

        info!(
            color = %config.color_mode,
            depth = %config.depth_mode,
            align = %config.align,
            "Camera pipeline started"
        );

        Ok(Self {
            serial,
            pipeline: Some(pipeline),
            aligner,
        })
    }

    /// Load the advanced-mode preset, degrading to a warning on a file
    /// that cannot be read or is not JSON. An SDK failure applying a
    /// well-formed preset is still fatal.
    fn apply_preset(
        sdk: &dyn DepthCameraSdk,
        serial: &str,
        path: &std::path::Path,
    ) -> SourceResult<()> {
        info!(path = %path.display(), "Applying preset file");

        // Only toggled if not already on
        if !sdk.is_advanced_mode_enabled(serial)? {
            sdk.enable_advanced_mode(serial)?;
            debug!("Advanced mode enabled");
        }

        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not read preset file, using default configuration"
                );
                return Ok(());
            }
        };

        if let Err(e) = serde_json::from_str::<serde_json::Value>(&json) {
            warn!(
                path = %path.display(),
                error = %e,
                "Preset file is not valid JSON, using default configuration"
            );
            return Ok(());
        }

        sdk.load_preset_json(serial, &json)?;
        info!("Preset applied");
        Ok(())
    }

    /// Serial number of the claimed device
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Pull the next synchronized frame set, aligned if configured.
    ///
    /// Blocks for up to one frame period.
    pub fn next_frames(&mut self) -> SourceResult<FrameSet> {
        let pipeline = self.pipeline.as_mut().ok_or(SourceError::NotRunning)?;
        let frames = pipeline.wait_for_frames()?;
        match &self.aligner {
            Some(aligner) => Ok(aligner.process(frames)),
            None => Ok(frames),
        }
    }

    /// Tear down the pipeline and release the aligner.
    ///
    /// Safe to call multiple times and after a partial teardown.
    pub fn stop(&mut self) {
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.stop();
            debug!(serial = %self.serial, "Camera pipeline stopped");
        }
        self.aligner = None;
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.stop();
    }
}
