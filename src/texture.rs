//! Texture and texture-array descriptors (§3, §4.A).

use crate::descriptor::{
    BufferType, ColorFormat, ColorRgba, Extent2, MipMapFiltering, TextureFiltering, TextureType,
    TextureWrapping,
};

/// Descriptor for a `TextureBuffer` resource.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureBufferDesc {
    pub size: Extent2,
    pub samples: u32,
    pub texture_type: TextureType,
    pub format: ColorFormat,
    pub wrapping: TextureWrapping,
    pub filter_min: TextureFiltering,
    pub filter_mag: TextureFiltering,
    pub mip_map_levels: u32,
    pub mip_map_filter: MipMapFiltering,
    pub border_color: ColorRgba,
    pub buffer_type: BufferType,
    pub generate_mipmap: bool,
    pub fixed_sample_locations: bool,
}

impl Default for TextureBufferDesc {
    fn default() -> Self {
        TextureBufferDesc {
            size: Extent2::new(1, 1),
            samples: 1,
            texture_type: TextureType::Texture2D,
            format: ColorFormat::RGBA8Unorm,
            wrapping: TextureWrapping::ClampToEdge,
            filter_min: TextureFiltering::Linear,
            filter_mag: TextureFiltering::Linear,
            mip_map_levels: 1,
            mip_map_filter: MipMapFiltering::Linear,
            border_color: ColorRgba::default(),
            buffer_type: BufferType::DeviceLocal,
            generate_mipmap: false,
            fixed_sample_locations: false,
        }
    }
}

/// Descriptor for a `TextureArrayBuffer` resource: a `TextureBufferDesc`
/// shared by every layer plus the layer count.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TextureArrayBufferDesc {
    pub texture: TextureBufferDesc,
    pub texture_count: u32,
}
