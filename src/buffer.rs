//! Buffer descriptors: vertex, index, uniform and storage buffers (§3).
//!
//! All four kinds share the same shape (`size` in bytes plus a
//! [`BufferType`](crate::descriptor::BufferType)); they are kept as distinct
//! descriptor types rather than one generic `BufferDesc` because each backs a
//! separate [`crate::handle::Kind`] and a separate backend trait in
//! [`crate::traits`].

use crate::descriptor::BufferType;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexBufferDesc {
    pub size: u64,
    pub buffer_type: BufferType,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IndexBufferDesc {
    pub size: u64,
    pub buffer_type: BufferType,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct UniformBufferDesc {
    pub size: u64,
    pub buffer_type: BufferType,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StorageBufferDesc {
    pub size: u64,
    pub buffer_type: BufferType,
}
