//! Vertex array object descriptor: the binding of a vertex buffer, optional
//! index buffer, optional instance buffer, and the attribute layouts that
//! interpret them (§3, GLOSSARY "VAO").

/// The scalar component an attribute is made of.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ComponentType {
    U8,
    I8,
    U32,
    I32,
    F32,
    F64,
}

/// The shape of a single vertex attribute: a scalar, a 2-4 component vector,
/// or a 2x2-4x4 matrix (consuming that many consecutive attribute slots).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttributeShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AttributeShape {
    /// Number of scalar components making up one value of this shape.
    pub fn component_count(self) -> u32 {
        match self {
            AttributeShape::Scalar => 1,
            AttributeShape::Vec2 => 2,
            AttributeShape::Vec3 => 3,
            AttributeShape::Vec4 => 4,
            AttributeShape::Mat2 => 4,
            AttributeShape::Mat3 => 9,
            AttributeShape::Mat4 => 16,
        }
    }
}

/// One entry of a [`VertexLayout`]: an attribute's shape, component type and
/// byte offset within one vertex (or instance) record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub shape: AttributeShape,
    pub component_type: ComponentType,
    pub offset: u32,
}

/// An ordered sequence of attributes describing one vertex (or instance)
/// record's layout, plus the record's total stride in bytes.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    pub stride: u32,
}

impl VertexLayout {
    pub fn new(stride: u32, attributes: Vec<VertexAttribute>) -> VertexLayout {
        VertexLayout { attributes, stride }
    }
}

/// Descriptor for a `VertexArrayObject` resource: the attribute layouts
/// alone, kept hashable/structurally-equal (§4.A) independently of the
/// actual buffers bound under it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct VertexArrayObjectDesc {
    pub vertex_layout: VertexLayout,
    pub instance_array_layout: Option<VertexLayout>,
}

/// The buffers a VAO is created over. Not part of [`VertexArrayObjectDesc`]
/// since handles aren't structurally comparable; passed alongside the
/// descriptor to `Device::create_vertex_array_object`.
pub struct VertexArrayObjectBuffers<'a> {
    pub vertex_buffer: &'a crate::handle::Handle<dyn crate::traits::VertexBufferObject>,
    pub index_buffer: Option<&'a crate::handle::Handle<dyn crate::traits::IndexBufferObject>>,
    pub instance_buffer: Option<&'a crate::handle::Handle<dyn crate::traits::VertexBufferObject>>,
}
