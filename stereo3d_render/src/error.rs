// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use std::path::PathBuf;

use stereo3d_core::matching::MatchError;
use stereo3d_core::output::OutputId;
use thiserror::Error;

/// A failure reported by the [`GpuContext`](crate::gpu::GpuContext).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GpuError {
    /// A state change (color mask, stencil, matrix stack) was rejected.
    #[error("GPU rejected {operation}")]
    State {
        /// The rejected operation.
        operation: &'static str,
    },
    /// A fragment program could not be built.
    #[error("failed to build fragment program: {reason}")]
    Program {
        /// Driver diagnostic.
        reason: String,
    },
    /// A texture could not be allocated or uploaded.
    #[error("failed to allocate a {width}x{height} texture")]
    Texture {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The projection stack had nothing to pop.
    #[error("projection stack underflow")]
    StackUnderflow,
}

/// Errors that keep the effect from being activated on an output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A window match expression did not parse.
    #[error("invalid {which} match expression")]
    Match {
        /// Which of the three expressions failed.
        which: &'static str,
        /// The parse error.
        #[source]
        source: MatchError,
    },
    /// The cursor texture could not be created.
    #[error("failed to create the cursor texture")]
    CursorTexture(#[source] GpuError),
    /// An action or frame call named an output that is not managed.
    #[error("{0} is not managed")]
    UnknownOutput(OutputId),
    /// The output has no area.
    #[error("{output} has an empty geometry")]
    EmptyOutput {
        /// The output.
        output: OutputId,
    },
}

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// The file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the options schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A window match expression did not parse.
    #[error("invalid {which} match expression")]
    Match {
        /// Which of the three expressions failed.
        which: &'static str,
        /// The parse error.
        #[source]
        source: MatchError,
    },
}
