//! Error type.
//!
//! This is the shared error type for the whole crate. Every variant maps
//! directly to one of the error kinds from the error handling design: a
//! resource exceeding a device limit, a failed shader compile/link, an
//! illegal state transition, an out-of-range copy/blit, an attachment
//! mismatch, an unresolved or duplicated frame-graph slot, a reference to a
//! handle this frame never created, or a backend-reported failure.

use crate::frame_graph::FrameGraphSlot;
use std::{error, fmt};

/// The kind of GPU resource a [`Error::Capacity`] was raised for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapacityKind {
    ShaderUniformBuffer,
    ShaderStorageBuffer,
    MipMapLevels,
}

/// The stage of the shader compile/link pipeline a [`Error::CompileLink`] failed in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompileStage {
    Compile,
    Link,
}

#[derive(Clone, Debug)]
pub enum Error {
    /// A descriptor exceeded a device limit (uniform/storage buffer size, mip level count).
    Capacity {
        kind: CapacityKind,
        requested: u64,
        limit: u64,
    },
    /// Shader compilation or program linking failed.
    CompileLink {
        stage: CompileStage,
        entry_point: String,
        diagnostic: String,
    },
    /// An operation was attempted in a state that does not permit it
    /// (pass already running, no pass running, no pipeline/VAO bound, ...).
    InvalidState(&'static str),
    /// A copy, upload or blit referenced a range outside the bounds of a resource.
    InvalidRange {
        what: &'static str,
        offset: i64,
        count: i64,
        bound: u64,
    },
    /// A render target's attachment signature did not match the render pass it was begun with.
    IncompatibleTarget {
        expected_color: u32,
        expected_depth_stencil: bool,
        actual_color: u32,
        actual_depth_stencil: bool,
    },
    /// A frame-graph slot was read before being assigned, or assigned twice in the same frame.
    UnboundSlot(FrameGraphSlot),
    /// A command referenced a handle that was neither created this frame nor persisted from the last one.
    UnknownResource(u64),
    /// A lower-level diagnostic reported by the backend's debug callback.
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Capacity {
                kind,
                requested,
                limit,
            } => write!(
                f,
                "{:?} of size {} exceeds the device limit of {}",
                kind, requested, limit
            ),
            Error::CompileLink {
                stage,
                entry_point,
                diagnostic,
            } => write!(
                f,
                "shader {:?} failed at entry point `{}`: {}",
                stage, entry_point, diagnostic
            ),
            Error::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Error::InvalidRange {
                what,
                offset,
                count,
                bound,
            } => write!(
                f,
                "{} out of range: offset {} + count {} exceeds bound {}",
                what, offset, count, bound
            ),
            Error::IncompatibleTarget {
                expected_color,
                expected_depth_stencil,
                actual_color,
                actual_depth_stencil,
            } => write!(
                f,
                "render target attachment signature ({} color, depth_stencil={}) does not match \
                 the render pass ({} color, depth_stencil={})",
                actual_color, actual_depth_stencil, expected_color, expected_depth_stencil
            ),
            Error::UnboundSlot(slot) => write!(f, "frame graph slot {:?} is not bound", slot),
            Error::UnknownResource(id) => {
                write!(f, "resource handle {} is not live in this frame", id)
            }
            Error::BackendError(msg) => write!(f, "backend error: {}", msg),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = ::std::result::Result<T, Error>;
