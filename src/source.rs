// SPDX-License-Identifier: GPL-3.0-only

//! Source lifecycle controller
//!
//! Drives the device session through idle → starting → running → stopping
//! and produces one muxed buffer per acquisition cycle. One logical thread
//! owns `start` → repeated `create` → `stop`; the cancellation signal is
//! the only piece of state other threads may touch. Callers that invoke
//! lifecycle methods from several threads must serialize them themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::caps::OutputGeometry;
use crate::config::SourceConfig;
use crate::device::DepthCameraSdk;
use crate::device::session::DeviceSession;
use crate::errors::{SourceError, SourceResult};
use crate::modes::{self, StreamKind};
use crate::mux::{self, MuxedBuffer};

/// Lifecycle states of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Outcome of one create() cycle alongside the produced buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    /// Normal delivery, keep pulling
    Ok,
    /// Cancellation is pending: this buffer is still valid, but the caller
    /// should stop requesting frames and proceed to stop()
    Flushing,
}

/// The multiplexing frame source
pub struct MuxSource {
    sdk: Arc<dyn DepthCameraSdk>,
    config: SourceConfig,
    state: SourceState,
    session: Option<DeviceSession>,
    geometry: Option<OutputGeometry>,
    /// Next buffer's sequence index; owned per instance and reset at each
    /// start so indices never leak across runs
    next_index: u64,
    /// Cooperative cancellation flag, shared with control threads
    stop_requested: Arc<AtomicBool>,
    /// Pipeline base time; PTS is measured relative to this
    base_time: Option<Instant>,
}

impl MuxSource {
    pub fn new(sdk: Arc<dyn DepthCameraSdk>, config: SourceConfig) -> Self {
        Self {
            sdk,
            config,
            state: SourceState::Idle,
            session: None,
            geometry: None,
            next_index: 0,
            stop_requested: Arc::new(AtomicBool::new(false)),
            base_time: None,
        }
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Mutate configuration. Changes are read on the next start(); a
    /// running session is unaffected.
    pub fn config_mut(&mut self) -> &mut SourceConfig {
        &mut self.config
    }

    /// Geometry negotiated from the first frame of the current run
    pub fn output_geometry(&self) -> Option<OutputGeometry> {
        self.geometry
    }

    /// Shared handle to the cancellation flag, for control threads
    /// (e.g. a signal handler)
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_requested)
    }

    /// Raise the cooperative cancellation signal. The in-flight create()
    /// still returns its buffer, flagged as flushing.
    pub fn request_stop(&self) {
        debug!("Stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Clear the cancellation signal
    pub fn clear_stop(&self) {
        debug!("Stop request cleared");
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Validate modes, open the device session and negotiate the output
    /// geometry from the first real frame.
    ///
    /// Any failure leaves the source back in Idle with nothing running.
    pub fn start(&mut self) -> SourceResult<()> {
        // A still-open previous session is torn down first
        if self.session.is_some() {
            self.stop();
        }
        self.state = SourceState::Starting;

        match self.try_start() {
            Ok(()) => {
                self.state = SourceState::Running;
                Ok(())
            }
            Err(e) => {
                if let Some(mut session) = self.session.take() {
                    session.stop();
                }
                self.geometry = None;
                self.base_time = None;
                self.state = SourceState::Idle;
                Err(e)
            }
        }
    }

    fn try_start(&mut self) -> SourceResult<()> {
        // Hard validation tier: whatever modes are in force now must be
        // table members, or the session is never opened
        for kind in [StreamKind::Color, StreamKind::Depth] {
            let mode = self.config.mode(kind);
            if !modes::is_valid_mode(kind, mode) {
                return Err(SourceError::InvalidMode { stream: kind, mode });
            }
        }

        let mut session = DeviceSession::start(self.sdk.as_ref(), &self.config)?;

        // Negotiation: size the output from the first aligned frame set.
        // The frame itself is consumed by negotiation and not delivered.
        let first = session.next_frames()?;
        let geometry = OutputGeometry::from_color_frame(&first.color);
        info!(
            serial = session.serial(),
            geometry = %geometry,
            frame_size = geometry.frame_size(),
            "Negotiated output geometry"
        );

        self.session = Some(session);
        self.geometry = Some(geometry);
        self.next_index = 0;
        self.base_time = Some(Instant::now());
        Ok(())
    }

    /// Produce the next muxed buffer.
    ///
    /// Blocks until the camera delivers a synchronized frame set, applies
    /// alignment, multiplexes, stamps PTS against the run's base time and
    /// assigns the next sequence index. A pending cancellation does not
    /// discard the frame: the buffer comes back flagged Flushing. SDK
    /// errors are fatal for the cycle and are not retried internally.
    pub fn create(&mut self) -> SourceResult<(MuxedBuffer, FlowStatus)> {
        trace!("create");
        let session = self.session.as_mut().ok_or(SourceError::NotRunning)?;
        let geometry = self.geometry.ok_or(SourceError::NotRunning)?;

        let frames = session.next_frames()?;

        let pts = self
            .base_time
            .map(|base| base.elapsed())
            .unwrap_or_default();

        let data = mux::mux_frames(&frames.color, &frames.depth)?;
        let buffer = MuxedBuffer {
            width: geometry.width,
            height: geometry.height,
            data,
            pts,
            index: self.next_index,
        };
        self.next_index += 1;

        let status = if self.is_stop_requested() {
            FlowStatus::Flushing
        } else {
            FlowStatus::Ok
        };
        Ok((buffer, status))
    }

    /// Tear everything down and return to Idle.
    ///
    /// Safe to call repeatedly and from the never-started state.
    pub fn stop(&mut self) {
        self.state = SourceState::Stopping;
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.geometry = None;
        self.base_time = None;
        self.next_index = 0;
        self.state = SourceState::Idle;
        debug!("Source stopped");
    }
}

impl Drop for MuxSource {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.stop();
        }
    }
}
