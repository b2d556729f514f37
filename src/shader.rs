//! Shader blobs and the decompile hook (§4.G, §6).
//!
//! The crate consumes already-compiled shader blobs; compiling GLSL/HLSL/etc.
//! source to SPIR-V is out of scope (§1). SPIR-V is the canonical input
//! format: a blob is checked for the SPIR-V magic number, and if a backend
//! cannot ingest SPIR-V directly it is handed to a [`Decompiler`] to produce
//! source text in the backend's shading language instead.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::sync::Arc;

/// SPIR-V's magic number, little-endian (`0x07230203`).
const SPIRV_MAGIC: u32 = 0x0723_0203;

/// A compiled shader blob: SPIR-V bytes plus the entry point to invoke.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct ShaderStageDesc {
    pub blob: Arc<[u8]>,
    pub entry_point: String,
}

impl fmt::Debug for ShaderStageDesc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ShaderStageDesc")
            .field("blob_len", &self.blob.len())
            .field("entry_point", &self.entry_point)
            .field("is_spirv", &self.is_spirv())
            .finish()
    }
}

impl ShaderStageDesc {
    pub fn new(blob: impl Into<Arc<[u8]>>, entry_point: impl Into<String>) -> ShaderStageDesc {
        ShaderStageDesc {
            blob: blob.into(),
            entry_point: entry_point.into(),
        }
    }

    /// Whether `blob` starts with the SPIR-V magic number.
    pub fn is_spirv(&self) -> bool {
        self.blob.len() >= 4 && LittleEndian::read_u32(&self.blob[0..4]) == SPIRV_MAGIC
    }
}

/// Converts a shader blob that isn't SPIR-V (or that a backend can't ingest
/// directly) into the backend's own source language.
///
/// Implemented outside this crate: shader decompilation is out of scope
/// (§1), this is only the seam the pipeline factory calls through.
pub trait Decompiler {
    fn decompile(&self, stage: &ShaderStageDesc) -> crate::error::Result<String>;
}

/// A decompiler that always fails; used when a backend requires SPIR-V
/// ingestion and no decompilation path is configured.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDecompiler;

impl Decompiler for NoDecompiler {
    fn decompile(&self, stage: &ShaderStageDesc) -> crate::error::Result<String> {
        Err(crate::error::Error::CompileLink {
            stage: crate::error::CompileStage::Compile,
            entry_point: stage.entry_point.clone(),
            diagnostic: "no decompiler configured and blob is not SPIR-V".into(),
        })
    }
}
