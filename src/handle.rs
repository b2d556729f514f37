//! Resource handles (§4.B).
//!
//! A handle is an opaque, type-tagged, exclusively-owning reference to a
//! GPU-resident object. It is constructed only by [`crate::device::Device`]'s
//! factory methods, exposes `kind()` and `description()`, and releases the
//! underlying backend object when dropped (invariant 7: ownership).
//!
//! Handles are deliberately *not* `Clone`: the teacher crate's arena-owned
//! resources are shared borrows (`&'a dyn traits::Buffer`) out of an arena
//! that owns everything and releases it in bulk. This crate's resources
//! instead own their backend object individually (a `Box<dyn Trait>`) so
//! that an individual handle's drop can release exactly one GPU object,
//! matching the lifecycle the spec describes. Command records borrow
//! handles (`&'a Handle<O>`) rather than cloning them, so a command buffer
//! can never outlive the handles it references without the borrow checker
//! noticing.

use std::fmt;
use std::ops::Deref;

/// The closed set of GPU-resident resource kinds (§3).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Kind {
    VertexBuffer,
    IndexBuffer,
    UniformBuffer,
    StorageBuffer,
    TextureBuffer,
    TextureArrayBuffer,
    VertexArrayObject,
    RenderTarget,
    RenderPass,
    RenderPipeline,
    ComputePipeline,
    RaytracePipeline,
    CommandBuffer,
    CommandQueue,
    Fence,
    Semaphore,
    VideoMemory,
}

/// An opaque, owning reference to a GPU object of backend trait `O`.
///
/// `kind()` never changes for the lifetime of a handle (invariant 1), and
/// its descriptor is fixed at creation (invariant 2) since the backend
/// object behind `O` is immutable once built. `Handle<O>` derefs to `O`,
/// which is how kind-specific accessors (`description()`, `vertex_buffer()`
/// on a VAO, ...) are reached.
pub struct Handle<O: ?Sized> {
    kind: Kind,
    inner: Box<O>,
}

impl<O: ?Sized> Handle<O> {
    pub(crate) fn new(kind: Kind, inner: Box<O>) -> Handle<O> {
        Handle { kind, inner }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl<O: ?Sized> Deref for Handle<O> {
    type Target = O;
    fn deref(&self) -> &O {
        &self.inner
    }
}

impl<O: ?Sized + fmt::Debug> fmt::Debug for Handle<O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &self.kind)
            .field("inner", &self.inner)
            .finish()
    }
}
