//! The frame graph (§4.H, §4.I): a declarative, per-frame description of the
//! passes that make up a frame, the resources each pass creates, reads,
//! writes and persists, and the inter-pass edges (slots) connecting them.
//!
//! [`builder`] is the API a pass's `setup` records against; [`resource`]
//! holds the frame-local resource identity and the declarative command
//! record the builder produces; [`slot`] is the named-edge enum;
//! [`allocator`] realises a recorded graph against a [`crate::device::Device`]
//! and executes it.

pub mod allocator;
pub mod builder;
pub mod resource;
pub mod slot;

pub use allocator::{FrameGraphAllocator, FrameGraphPass};
pub use builder::{FrameGraphBuilder, BACK_BUFFER};
pub use resource::{
    CopyResourceKind, FrameGraphCommand, FrameGraphResource, FrameGraphShaderResourceBinding,
    PassRecord, ResourceCreation, UploadSource,
};
pub use slot::FrameGraphSlot;
