// SPDX-License-Identifier: GPL-3.0-only

//! stereomux - multiplexed color + depth source for stereo depth cameras
//!
//! This library acquires synchronized color and depth frames from a stereo
//! depth camera, aligns them spatially, and interleaves both into a single
//! packed RGB buffer: color in the top half, range-encoded depth in the
//! bottom half. Buffers are produced on a live cadence with monotonic
//! timestamps and sequence indices until the source is stopped.
//!
//! # Architecture
//!
//! - [`modes`]: supported stream mode tables and validation
//! - [`config`]: the configuration surface and its soft validation tier
//! - [`device`]: the vendor-SDK capability boundary, the device session
//!   and a simulated backend
//! - [`mux`]: the color + depth multiplexing transform
//! - [`caps`]: output geometry negotiated from the first real frame
//! - [`source`]: the public lifecycle state machine
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stereomux::device::sim::SimulatedSdk;
//! use stereomux::{FlowStatus, MuxSource, SourceConfig};
//!
//! let sdk = Arc::new(SimulatedSdk::new());
//! let mut source = MuxSource::new(sdk, SourceConfig::default());
//! source.start()?;
//! let (buffer, status) = source.create()?;
//! assert_eq!(status, FlowStatus::Ok);
//! assert_eq!(buffer.height, 2 * source.config().color_mode.height);
//! source.stop();
//! # Ok::<(), stereomux::SourceError>(())
//! ```

pub mod caps;
pub mod config;
pub mod constants;
pub mod device;
pub mod errors;
pub mod modes;
pub mod mux;
pub mod source;

// Re-export commonly used types
pub use caps::OutputGeometry;
pub use config::{AlignTarget, SourceConfig};
pub use errors::{DeviceError, SourceError, SourceResult};
pub use modes::{StreamKind, StreamMode};
pub use mux::MuxedBuffer;
pub use source::{FlowStatus, MuxSource, SourceState};
