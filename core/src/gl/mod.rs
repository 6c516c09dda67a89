//! Graphics backend abstraction
//!
//! The module issues WebGL-style calls through its imports. The proxy in
//! [`crate::ffi`] decodes arguments and resolves handles, then forwards the
//! decoded call to a [`GraphicsBackend`]. Backends own the native objects;
//! the proxy only stores them in [`GlState`] handle tables.
//!
//! # Key Types
//!
//! - [`GraphicsBackend`] - native graphics API port
//! - [`GlState`] - backend plus one handle table per resource kind
//! - [`HeadlessGl`] - recording backend used by the headless player and tests

mod headless;
mod state;

pub use headless::{GlCall, GlObject, HeadlessGl};
pub use state::GlState;

/// WebGL enum values the proxy interprets itself
pub mod consts {
    pub const NO_ERROR: u32 = 0;
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
    pub const UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
    pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;
    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const VERTEX_SHADER: u32 = 0x8B31;
    pub const SHADER_TYPE: u32 = 0x8B4F;
    pub const DELETE_STATUS: u32 = 0x8B80;
    pub const COMPILE_STATUS: u32 = 0x8B81;
    pub const LINK_STATUS: u32 = 0x8B82;
    pub const VALIDATE_STATUS: u32 = 0x8B83;
    pub const ATTACHED_SHADERS: u32 = 0x8B85;
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const FRAMEBUFFER_COMPLETE: u32 = 0x8CD5;
    pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8CD6;
}

/// Result of a shader/program parameter query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i32),
}

impl ParamValue {
    /// Encode for the module: null and false are 0, true is 1, numbers pass through
    pub fn encode(self) -> i32 {
        match self {
            ParamValue::Null => 0,
            ParamValue::Bool(false) => 0,
            ParamValue::Bool(true) => 1,
            ParamValue::Int(value) => value,
        }
    }
}

/// Contents for `bufferData`
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    /// Reserve storage without initial contents
    Reserve(u32),
    /// Bytes copied out of linear memory
    Bytes(Vec<u8>),
}

/// Pixel buffer for `texImage2D`, at the element stride the pixel type declares
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl PixelData {
    /// Reinterpret raw bytes according to the declared pixel component type
    pub fn from_bytes(pixel_type: u32, bytes: Vec<u8>) -> Self {
        if pixel_type == consts::UNSIGNED_BYTE {
            PixelData::U8(bytes)
        } else {
            PixelData::U16(crate::memory::le_u16s(&bytes))
        }
    }

    /// Number of elements at the declared stride
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(data) => data.len(),
            PixelData::U16(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Arguments of `texImage2D`
#[derive(Debug, Clone, PartialEq)]
pub struct TexImage2D {
    pub target: u32,
    pub level: i32,
    pub internal_format: i32,
    pub width: i32,
    pub height: i32,
    pub border: i32,
    pub format: u32,
    pub pixel_type: u32,
    /// `None` allocates the level without contents
    pub pixels: Option<PixelData>,
}

/// Arguments of `vertexAttribPointer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribPointer {
    pub index: u32,
    pub size: i32,
    pub component_type: u32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

/// Uniform value set through a location
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float1(f32),
    Float2(f32, f32),
    Float4(f32, f32, f32, f32),
    Int1(i32),
    Mat4 { transpose: bool, data: Vec<f32> },
}

/// Native graphics API port
///
/// Object types are opaque to the proxy; it never inspects them, only stores
/// them in handle tables and hands them back. Functions taking `Option<&T>`
/// accept the null object exactly where the graphics API does.
pub trait GraphicsBackend: 'static {
    type Shader;
    type Program;
    type Buffer;
    type Texture;
    type Framebuffer;
    type VertexArray;
    type UniformLocation;

    // Shaders
    fn create_shader(&mut self, kind: u32) -> Self::Shader;
    fn delete_shader(&mut self, shader: Self::Shader);
    fn shader_source(&mut self, shader: &Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: &Self::Shader);
    fn shader_parameter(&mut self, shader: &Self::Shader, pname: u32) -> ParamValue;
    fn shader_info_log(&mut self, shader: &Self::Shader) -> Option<String>;

    // Programs
    fn create_program(&mut self) -> Self::Program;
    fn delete_program(&mut self, program: Self::Program);
    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);
    fn detach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&mut self, program: &Self::Program);
    fn use_program(&mut self, program: Option<&Self::Program>);
    fn program_parameter(&mut self, program: &Self::Program, pname: u32) -> ParamValue;
    fn program_info_log(&mut self, program: &Self::Program) -> Option<String>;
    fn attrib_location(&mut self, program: &Self::Program, name: &str) -> i32;
    fn uniform_location(
        &mut self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn uniform(&mut self, location: &Self::UniformLocation, value: UniformValue);

    // Buffers
    fn create_buffer(&mut self) -> Self::Buffer;
    fn delete_buffer(&mut self, buffer: Self::Buffer);
    fn bind_buffer(&mut self, target: u32, buffer: Option<&Self::Buffer>);
    fn buffer_data(&mut self, target: u32, data: BufferData, usage: u32);
    fn buffer_sub_data(&mut self, target: u32, offset: u32, data: Vec<u8>);

    // Textures
    fn create_texture(&mut self) -> Self::Texture;
    fn delete_texture(&mut self, texture: Self::Texture);
    fn bind_texture(&mut self, target: u32, texture: Option<&Self::Texture>);
    fn active_texture(&mut self, unit: u32);
    fn tex_image_2d(&mut self, image: TexImage2D);
    fn tex_parameter_i(&mut self, target: u32, pname: u32, param: i32);
    fn tex_parameter_f(&mut self, target: u32, pname: u32, param: f32);
    fn pixel_store_i(&mut self, pname: u32, param: i32);

    // Framebuffers
    fn create_framebuffer(&mut self) -> Self::Framebuffer;
    fn delete_framebuffer(&mut self, framebuffer: Self::Framebuffer);
    fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<&Self::Framebuffer>);
    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Option<&Self::Texture>,
        level: i32,
    );
    fn check_framebuffer_status(&mut self, target: u32) -> u32;

    // Vertex arrays
    fn create_vertex_array(&mut self) -> Self::VertexArray;
    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);
    fn bind_vertex_array(&mut self, vertex_array: Option<&Self::VertexArray>);

    // Vertex attributes and drawing
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);
    fn vertex_attrib_pointer(&mut self, pointer: VertexAttribPointer);
    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32);
    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32);

    // Fixed-function state
    fn enable(&mut self, cap: u32);
    fn disable(&mut self, cap: u32);
    fn blend_func(&mut self, src: u32, dst: u32);
    fn depth_func(&mut self, func: u32);
    fn depth_mask(&mut self, flag: bool);
    fn cull_face(&mut self, mode: u32);
    fn front_face(&mut self, mode: u32);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear(&mut self, mask: u32);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&mut self, depth: f32);
    fn get_error(&mut self) -> u32;
}
