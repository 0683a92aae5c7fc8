//! Handles and enums shared by the backend, the state cache and the wgpu
//! translation.

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);
    };
}

handle!(
    /// Backend buffer object.
    BufferId
);
handle!(
    /// Backend texture object.
    TextureId
);
handle!(
    /// Linked program object.
    ProgramId
);
handle!(
    /// Framebuffer object. The default framebuffer is [`FramebufferId::DEFAULT`].
    FramebufferId
);
handle!(UniformLocation);
handle!(AttributeLocation);

impl FramebufferId {
    pub const DEFAULT: FramebufferId = FramebufferId(0);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Increment,
    IncrementWrap,
    Decrement,
    DecrementWrap,
    Invert,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
    LineStrip,
}

impl Primitive {
    /// Indices consumed per primitive in an index buffer segment.
    #[inline]
    pub fn vertices_per_primitive(self) -> u32 {
        match self {
            Primitive::Triangles => 3,
            Primitive::Lines => 2,
            Primitive::LineStrip => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureWrap {
    Clamp,
    Repeat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    Rgba8,
    Alpha8,
}

impl TextureFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8 => 4,
            TextureFormat::Alpha8 => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeType {
    I8,
    U8,
    I16,
    U16,
    F32,
}

impl AttributeType {
    #[inline]
    pub fn size(self) -> u32 {
        match self {
            AttributeType::I8 | AttributeType::U8 => 1,
            AttributeType::I16 | AttributeType::U16 => 2,
            AttributeType::F32 => 4,
        }
    }
}

/// One attribute inside an interleaved vertex layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub components: u32,
    pub ty: AttributeType,
    /// Byte offset inside one vertex.
    pub offset: u32,
}

/// Resolved attribute pointer for one draw segment.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBinding {
    pub location: AttributeLocation,
    pub buffer: BufferId,
    pub components: u32,
    pub ty: AttributeType,
    pub stride: u32,
    /// Byte offset including the segment's vertex offset.
    pub offset: u32,
}
