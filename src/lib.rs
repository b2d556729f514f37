//! GPU command-recording and render-graph core.
//!
//! Four tightly coupled layers, leaves first:
//!
//! * [`descriptor`], [`buffer`], [`texture`], [`vao`], [`pipeline`],
//!   [`render_target`], [`render_pass`] — the object model: pure-value
//!   descriptors for every GPU-resident resource kind.
//! * [`handle`], [`traits`], [`backend`] — opaque owning handles over
//!   backend-implemented trait objects; the object model is the ABI, backends
//!   implement it.
//! * [`command`], [`command_buffer`], [`queue`] — a recorded, replayable
//!   command stream and the queue that validates and interprets it.
//! * [`frame_graph`] — the declarative, per-frame description of passes and
//!   their resources, and the allocator that realises it against a [`Device`].
//!
//! [`scene`] and [`settings`] are the external inputs a frame graph consumes;
//! [`error`] is the shared error type for the whole crate; [`device`] ties
//! everything together as the resource factory and queue owner.

// Reexport nalgebra_glm types if requested, for callers that build `Scene`
// transforms with it (see `scene::Transform`).
#[cfg(feature = "glm-types")]
pub use nalgebra_glm as glm;

pub mod backend;
pub mod buffer;
pub mod command;
pub mod command_buffer;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod frame_graph;
pub mod handle;
pub mod pipeline;
pub mod queue;
pub mod render_pass;
pub mod render_target;
pub mod scene;
pub mod settings;
pub mod shader;
pub mod sync;
pub mod texture;
pub mod traits;
pub mod vao;

pub use command::Command;
pub use command_buffer::CommandBuffer;
pub use device::{DebugCallback, DebugMessage, DebugSeverity, Device, DeviceInfo, FrameStats};
pub use error::{Error, Result};
pub use frame_graph::{FrameGraphAllocator, FrameGraphBuilder, FrameGraphPass};
pub use handle::{Handle, Kind};
pub use queue::CommandQueue;
