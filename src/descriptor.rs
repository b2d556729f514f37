//! Value-type descriptors and the closed enumerations used throughout the
//! object model (§4.A).
//!
//! Every descriptor in this crate derives structural equality and stable
//! hashing over all of its fields, so that pipeline and render-target
//! descriptions can serve as cache keys. Floating-point fields that must
//! participate in that hash (border colors, clear colors, depth bias) are
//! wrapped in [`ordered_float::NotNan`], the same trick the teacher crate
//! uses for `DepthBias` in its pipeline state.

use ordered_float::NotNan;

/// Base, sized-normalized, sized-float, sized-integer and compressed color
/// formats. This enumeration is the ABI surface for backends: it must be
/// matched exhaustively, a missing case is a hard compile error in the
/// backend, never a silent fallback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ColorFormat {
    R,
    RG,
    RGB,
    RGBA,
    Depth,
    DepthStencil,

    R8Unorm,
    RG8Unorm,
    RGB8Unorm,
    RGBA8Unorm,
    R16Unorm,
    RG16Unorm,
    RGB16Unorm,
    RGBA16Unorm,

    R16Float,
    RG16Float,
    RGB16Float,
    RGBA16Float,
    R32Float,
    RG32Float,
    RGB32Float,
    RGBA32Float,

    R8Uint,
    RG8Uint,
    RGBA8Uint,
    R32Uint,
    RG32Uint,
    RGBA32Uint,
    R8Sint,
    RG8Sint,
    RGBA8Sint,
    R32Sint,
    RG32Sint,
    RGBA32Sint,

    CompressedRGBA,
    CompressedRGB,
}

impl ColorFormat {
    /// Whether this format carries a depth and/or stencil component, as
    /// opposed to color channels. Used to validate attachment signatures.
    pub fn is_depth_stencil(self) -> bool {
        matches!(self, ColorFormat::Depth | ColorFormat::DepthStencil)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TextureType {
    Texture2D,
    Texture2DMultisample,
    CubeMap,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TextureWrapping {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TextureFiltering {
    Nearest,
    Linear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum MipMapFiltering {
    Nearest,
    Linear,
}

/// Whether a buffer/image lives in host-visible (mappable) memory or in
/// device-local memory only reachable through transfer commands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BufferType {
    HostVisible,
    DeviceLocal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum DepthTestMode {
    None,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StencilMode {
    None,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StencilAction {
    Keep,
    Zero,
    Replace,
    Increment,
    IncrementWrap,
    Decrement,
    DecrementWrap,
    Invert,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum FaceCullingMode {
    None,
    Front,
    Back,
    FrontAndBack,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BlendMode {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// A hashable RGBA color. Used for clear colors and border colors, where a
/// plain `f32` would break `Eq`/`Hash` on descriptors that must be cache keys.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorRgba {
    pub r: NotNan<f32>,
    pub g: NotNan<f32>,
    pub b: NotNan<f32>,
    pub a: NotNan<f32>,
}

impl ColorRgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> ColorRgba {
        ColorRgba {
            r: NotNan::new(r).expect("NaN clear color component"),
            g: NotNan::new(g).expect("NaN clear color component"),
            b: NotNan::new(b).expect("NaN clear color component"),
            a: NotNan::new(a).expect("NaN clear color component"),
        }
    }

    pub fn as_array(&self) -> [f32; 4] {
        [
            self.r.into_inner(),
            self.g.into_inner(),
            self.b.into_inner(),
            self.a.into_inner(),
        ]
    }
}

impl PartialEq for ColorRgba {
    fn eq(&self, other: &Self) -> bool {
        (self.r, self.g, self.b, self.a) == (other.r, other.g, other.b, other.a)
    }
}
impl Eq for ColorRgba {}
impl std::hash::Hash for ColorRgba {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
        self.a.hash(state);
    }
}

/// A 2D integer offset or extent, used for viewports, rectangles and blit regions.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Vec2i {
        Vec2i { x, y }
    }
}

#[cfg(feature = "glm-types")]
impl From<nalgebra_glm::IVec2> for Vec2i {
    fn from(v: nalgebra_glm::IVec2) -> Vec2i {
        Vec2i { x: v.x, y: v.y }
    }
}

/// A 2D unsigned size, used for texture and render target dimensions.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Extent2 {
    pub width: u32,
    pub height: u32,
}

impl Extent2 {
    pub const fn new(width: u32, height: u32) -> Extent2 {
        Extent2 { width, height }
    }

    pub fn scaled(self, scale: f32) -> Extent2 {
        Extent2 {
            width: ((self.width as f32) * scale).round() as u32,
            height: ((self.height as f32) * scale).round() as u32,
        }
    }
}

/// Descriptor for a raw device memory allocation (`Device::create_memory`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MemoryDesc {
    pub size: u64,
}
