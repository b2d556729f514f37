//! Scene input to the frame graph (§6): an acyclic node tree of typed
//! properties, immutable across a frame.

use std::collections::BTreeMap;

#[cfg(feature = "glm-types")]
use nalgebra_glm as glm;

/// The closed set of property kinds a [`Node`] may carry (§6).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PropertyKind {
    Transform,
    ShadowFlags,
    Mesh,
    SkinnedMesh,
    Material,
    BoneTransforms,
    PointLight,
    DirectionalLight,
    SpotLight,
    Skybox,
    Camera,
    Wireframe,
}

bitflags::bitflags! {
    /// Which shadow-casting/receiving behaviour a node's `ShadowFlags`
    /// property declares.
    #[derive(Default)]
    pub struct ShadowFlags: u32 {
        const CASTS    = 0b0001;
        const RECEIVES = 0b0010;
    }
}

#[cfg(feature = "glm-types")]
pub type Transform = glm::Mat4;
#[cfg(not(feature = "glm-types"))]
pub type Transform = [[f32; 4]; 4];

/// A mesh reference: out of scope to load (§1 "asset loaders"), so this
/// carries only the opaque identity a pass needs to ask the allocator for
/// vertex/index buffers.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MeshRef(pub String);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MaterialRef(pub String);

#[derive(Copy, Clone, Debug)]
pub struct PointLight {
    pub color: crate::descriptor::ColorRgba,
    pub intensity: f32,
    pub radius: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct DirectionalLight {
    pub color: crate::descriptor::ColorRgba,
    pub intensity: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct SpotLight {
    pub color: crate::descriptor::ColorRgba,
    pub intensity: f32,
    pub radius: f32,
    pub cone_angle: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

/// One typed property a [`Node`] may carry. A node's property map holds at
/// most one value per [`PropertyKind`].
#[derive(Clone, Debug)]
pub enum Property {
    Transform(Transform),
    ShadowFlags(ShadowFlags),
    Mesh(MeshRef),
    SkinnedMesh(MeshRef),
    Material(MaterialRef),
    BoneTransforms(Vec<Transform>),
    PointLight(PointLight),
    DirectionalLight(DirectionalLight),
    SpotLight(SpotLight),
    Skybox(MaterialRef),
    Camera(Camera),
    Wireframe(bool),
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Property::Transform(_) => PropertyKind::Transform,
            Property::ShadowFlags(_) => PropertyKind::ShadowFlags,
            Property::Mesh(_) => PropertyKind::Mesh,
            Property::SkinnedMesh(_) => PropertyKind::SkinnedMesh,
            Property::Material(_) => PropertyKind::Material,
            Property::BoneTransforms(_) => PropertyKind::BoneTransforms,
            Property::PointLight(_) => PropertyKind::PointLight,
            Property::DirectionalLight(_) => PropertyKind::DirectionalLight,
            Property::SpotLight(_) => PropertyKind::SpotLight,
            Property::Skybox(_) => PropertyKind::Skybox,
            Property::Camera(_) => PropertyKind::Camera,
            Property::Wireframe(_) => PropertyKind::Wireframe,
        }
    }
}

/// One node in the scene tree: a name, its typed properties, and its children.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: String,
    properties: BTreeMap<PropertyKind, Property>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Node {
        Node {
            name: name.into(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: Property) -> Node {
        self.properties.insert(property.kind(), property);
        self
    }

    pub fn property(&self, kind: PropertyKind) -> Option<&Property> {
        self.properties.get(&kind)
    }

    /// Walks this node and every descendant, depth-first, calling `f` on each.
    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// The scene consumed by frame-graph passes: an immutable, acyclic node tree.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub root: Node,
}

impl Scene {
    pub fn new(root: Node) -> Scene {
        Scene { root }
    }

    pub fn walk(&self, mut f: impl FnMut(&Node)) {
        self.root.walk(&mut f);
    }
}
