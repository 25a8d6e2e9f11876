// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the mux source

use crate::modes::{StreamKind, StreamMode};
use std::fmt;

/// Result type alias using SourceError
pub type SourceResult<T> = Result<T, SourceError>;

/// Failure raised by an underlying SDK call.
///
/// Carries the failing operation's name and arguments so a hardware or
/// configuration mismatch can be diagnosed without source access.
#[derive(Debug, Clone)]
pub struct DeviceError {
    /// Name of the SDK operation that failed (e.g. "open_pipeline")
    pub op: String,
    /// Arguments the operation was called with
    pub args: String,
    /// Underlying failure description
    pub message: String,
}

impl DeviceError {
    pub fn new(
        op: impl Into<String>,
        args: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            op: op.into(),
            args: args.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device error calling {} ({}): {}",
            self.op, self.args, self.message
        )
    }
}

impl std::error::Error for DeviceError {}

/// Errors surfaced by the source lifecycle
#[derive(Debug, Clone)]
pub enum SourceError {
    /// No devices enumerated; fatal to start
    NoDeviceFound,
    /// The first enumerated device fails the model compatibility gate
    UnsupportedDevice {
        /// Model string the device reported
        model: String,
        /// Model string the gate requires
        expected: String,
    },
    /// A stream mode still invalid at start time
    InvalidMode {
        stream: StreamKind,
        mode: StreamMode,
    },
    /// Underlying SDK failure; fatal wherever raised
    Device(DeviceError),
    /// Output buffer allocation failed; fatal for that cycle only
    BufferAllocationFailed {
        /// Bytes that could not be allocated
        requested: usize,
    },
    /// A steady-state operation was invoked with no running session
    NotRunning,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NoDeviceFound => {
                write!(f, "No depth camera devices found, cannot start pipeline")
            }
            SourceError::UnsupportedDevice { model, expected } => {
                write!(
                    f,
                    "Selected device \"{}\" is not a supported \"{}\"",
                    model, expected
                )
            }
            SourceError::InvalidMode { stream, mode } => {
                write!(f, "Invalid {} mode: {}, not starting pipeline", stream, mode)
            }
            SourceError::Device(e) => write!(f, "{}", e),
            SourceError::BufferAllocationFailed { requested } => {
                write!(f, "Failed to allocate {} byte output buffer", requested)
            }
            SourceError::NotRunning => write!(f, "Source is not running"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for SourceError {
    fn from(err: DeviceError) -> Self {
        SourceError::Device(err)
    }
}
