//! Graphics call proxy
//!
//! One host function per imported graphics call. Each decodes its arguments,
//! resolves handles through the matching table in [`GlState`], and forwards
//! to the backend. Handle and memory failures are returned as errors, which
//! wasmtime turns into a trap that aborts the module call.
//!
//! [`GlState`]: crate::gl::GlState

use anyhow::Result;
use wasmtime::{Caller, Linker};

use super::helpers::{read_wasm_bytes, read_wasm_floats, read_wasm_str, write_wasm_bytes};
use crate::gl::{
    BufferData, GraphicsBackend, PixelData, TexImage2D, UniformValue, VertexAttribPointer,
};
use crate::wasm::HostContext;

type Ctx<'a, B> = Caller<'a, HostContext<B>>;

/// Register every graphics import under module `env`
pub fn register_gl_ffi<B: GraphicsBackend>(linker: &mut Linker<HostContext<B>>) -> Result<()> {
    // Shaders
    linker.func_wrap("env", "glCreateShader", create_shader)?;
    linker.func_wrap("env", "glDeleteShader", delete_shader)?;
    linker.func_wrap("env", "glShaderSource_api_", shader_source)?;
    linker.func_wrap("env", "glCompileShader", compile_shader)?;
    linker.func_wrap("env", "glGetShaderParameter", get_shader_parameter)?;
    linker.func_wrap("env", "getShaderInfoLogLength", shader_info_log_length)?;
    linker.func_wrap("env", "glGetShaderInfoLog_api", get_shader_info_log)?;

    // Programs
    linker.func_wrap("env", "glCreateProgram", create_program)?;
    linker.func_wrap("env", "glDeleteProgram", delete_program)?;
    linker.func_wrap("env", "glAttachShader", attach_shader)?;
    linker.func_wrap("env", "glDetachShader", detach_shader)?;
    linker.func_wrap("env", "glLinkProgram", link_program)?;
    linker.func_wrap("env", "glUseProgram", use_program)?;
    linker.func_wrap("env", "glGetProgramParameter", get_program_parameter)?;
    linker.func_wrap("env", "getProgramInfoLogLength", program_info_log_length)?;
    linker.func_wrap("env", "glGetProgramInfoLog_api", get_program_info_log)?;
    linker.func_wrap("env", "glGetAttribLocation_", get_attrib_location)?;
    linker.func_wrap("env", "glGetUniformLocation_", get_uniform_location)?;

    // Uniforms
    linker.func_wrap("env", "glUniform1f", uniform_1f)?;
    linker.func_wrap("env", "glUniform2f", uniform_2f)?;
    linker.func_wrap("env", "glUniform4f", uniform_4f)?;
    linker.func_wrap("env", "glUniform1i", uniform_1i)?;
    linker.func_wrap("env", "glUniformMatrix4fv", uniform_matrix_4fv)?;

    // Buffers
    linker.func_wrap("env", "glCreateBuffer", create_buffer)?;
    linker.func_wrap("env", "glDeleteBuffer", delete_buffer)?;
    linker.func_wrap("env", "glBindBuffer", bind_buffer)?;
    linker.func_wrap("env", "glBufferData", buffer_data)?;
    linker.func_wrap("env", "glBufferSubData", buffer_sub_data)?;

    // Textures
    linker.func_wrap("env", "glCreateTexture", create_texture)?;
    linker.func_wrap("env", "glDeleteTexture", delete_texture)?;
    linker.func_wrap("env", "glBindTexture", bind_texture)?;
    linker.func_wrap("env", "glActiveTexture", active_texture)?;
    linker.func_wrap("env", "glTexImage2D_api", tex_image_2d)?;
    linker.func_wrap("env", "glTexParameteri", tex_parameter_i)?;
    linker.func_wrap("env", "glTexParameterf", tex_parameter_f)?;
    linker.func_wrap("env", "glPixelStorei", pixel_store_i)?;

    // Framebuffers
    linker.func_wrap("env", "glCreateFramebuffer", create_framebuffer)?;
    linker.func_wrap("env", "glDeleteFramebuffer", delete_framebuffer)?;
    linker.func_wrap("env", "glBindFramebuffer", bind_framebuffer)?;
    linker.func_wrap("env", "glFramebufferTexture2D", framebuffer_texture_2d)?;
    linker.func_wrap("env", "glCheckFramebufferStatus", check_framebuffer_status)?;

    // Vertex arrays
    linker.func_wrap("env", "glCreateVertexArray", create_vertex_array)?;
    linker.func_wrap("env", "glDeleteVertexArray", delete_vertex_array)?;
    linker.func_wrap("env", "glBindVertexArray", bind_vertex_array)?;

    // Attributes and drawing
    linker.func_wrap("env", "glEnableVertexAttribArray", enable_vertex_attrib_array)?;
    linker.func_wrap("env", "glDisableVertexAttribArray", disable_vertex_attrib_array)?;
    linker.func_wrap("env", "glVertexAttribPointer", vertex_attrib_pointer)?;
    linker.func_wrap("env", "glDrawArrays", draw_arrays)?;
    linker.func_wrap("env", "glDrawElements", draw_elements)?;

    // Fixed-function state
    linker.func_wrap("env", "glEnable", enable)?;
    linker.func_wrap("env", "glDisable", disable)?;
    linker.func_wrap("env", "glBlendFunc", blend_func)?;
    linker.func_wrap("env", "glDepthFunc", depth_func)?;
    linker.func_wrap("env", "glDepthMask", depth_mask)?;
    linker.func_wrap("env", "glCullFace", cull_face)?;
    linker.func_wrap("env", "glFrontFace", front_face)?;
    linker.func_wrap("env", "glViewport", viewport)?;
    linker.func_wrap("env", "glScissor", scissor)?;
    linker.func_wrap("env", "glClear", clear)?;
    linker.func_wrap("env", "glClearColor", clear_color)?;
    linker.func_wrap("env", "glClearDepth", clear_depth)?;
    linker.func_wrap("env", "glGetError", get_error)?;

    Ok(())
}

/// Copy as much of `log` as fits in `cap` bytes at `ptr`; returns the count written
fn write_info_log<B: GraphicsBackend>(
    caller: &mut Ctx<'_, B>,
    log: Option<String>,
    ptr: u32,
    cap: u32,
    fn_name: &str,
) -> Result<u32> {
    let Some(log) = log else {
        return Ok(0);
    };
    let bytes = log.as_bytes();
    let written = bytes.len().min(cap as usize);
    write_wasm_bytes(caller, ptr, &bytes[..written], fn_name)?;
    Ok(written as u32)
}

// ============================================================================
// Shaders
// ============================================================================

fn create_shader<B: GraphicsBackend>(mut caller: Ctx<'_, B>, kind: u32) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let shader = gl.backend.create_shader(kind);
    gl.shaders.insert(shader)
}

fn delete_shader<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let shader = gl.shaders.remove(handle)?;
    gl.backend.delete_shader(shader);
    Ok(())
}

fn shader_source<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
    src_ptr: u32,
    src_len: u32,
) -> Result<()> {
    let source = read_wasm_str(&caller, src_ptr, src_len, "glShaderSource")?;
    let gl = &mut caller.data_mut().gl;
    let shader = gl.shaders.get(handle)?;
    gl.backend.shader_source(shader, &source);
    Ok(())
}

fn compile_shader<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let shader = gl.shaders.get(handle)?;
    gl.backend.compile_shader(shader);
    Ok(())
}

fn get_shader_parameter<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
    pname: u32,
) -> Result<i32> {
    let gl = &mut caller.data_mut().gl;
    let shader = gl.shaders.get(handle)?;
    Ok(gl.backend.shader_parameter(shader, pname).encode())
}

fn shader_info_log_length<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<u32> {
    let gl = &mut caller.data_mut().gl;
    let shader = gl.shaders.get(handle)?;
    Ok(gl
        .backend
        .shader_info_log(shader)
        .map_or(0, |log| log.len() as u32))
}

fn get_shader_info_log<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
    ptr: u32,
    cap: u32,
) -> Result<u32> {
    let log = {
        let gl = &mut caller.data_mut().gl;
        let shader = gl.shaders.get(handle)?;
        gl.backend.shader_info_log(shader)
    };
    write_info_log(&mut caller, log, ptr, cap, "glGetShaderInfoLog")
}

// ============================================================================
// Programs
// ============================================================================

fn create_program<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let program = gl.backend.create_program();
    gl.programs.insert(program)
}

fn delete_program<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.remove(handle)?;
    gl.backend.delete_program(program);
    Ok(())
}

fn attach_shader<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    program: u32,
    shader: u32,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(program)?;
    let shader = gl.shaders.get(shader)?;
    gl.backend.attach_shader(program, shader);
    Ok(())
}

fn detach_shader<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    program: u32,
    shader: u32,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(program)?;
    let shader = gl.shaders.get(shader)?;
    gl.backend.detach_shader(program, shader);
    Ok(())
}

fn link_program<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(handle)?;
    gl.backend.link_program(program);
    Ok(())
}

fn use_program<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get_nullable(handle)?;
    gl.backend.use_program(program);
    Ok(())
}

fn get_program_parameter<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
    pname: u32,
) -> Result<i32> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(handle)?;
    Ok(gl.backend.program_parameter(program, pname).encode())
}

fn program_info_log_length<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
) -> Result<u32> {
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(handle)?;
    Ok(gl
        .backend
        .program_info_log(program)
        .map_or(0, |log| log.len() as u32))
}

fn get_program_info_log<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    handle: u32,
    ptr: u32,
    cap: u32,
) -> Result<u32> {
    let log = {
        let gl = &mut caller.data_mut().gl;
        let program = gl.programs.get(handle)?;
        gl.backend.program_info_log(program)
    };
    write_info_log(&mut caller, log, ptr, cap, "glGetProgramInfoLog")
}

fn get_attrib_location<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    program: u32,
    name_ptr: u32,
    name_len: u32,
) -> Result<i32> {
    let name = read_wasm_str(&caller, name_ptr, name_len, "glGetAttribLocation")?;
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(program)?;
    Ok(gl.backend.attrib_location(program, &name))
}

/// Always allocates a handle; an unknown uniform gets a handle to `None`
fn get_uniform_location<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    program: u32,
    name_ptr: u32,
    name_len: u32,
) -> Result<u32> {
    let name = read_wasm_str(&caller, name_ptr, name_len, "glGetUniformLocation")?;
    let gl = &mut caller.data_mut().gl;
    let program = gl.programs.get(program)?;
    let location = gl.backend.uniform_location(program, &name);
    if location.is_none() {
        tracing::debug!(uniform = %name, "glGetUniformLocation: uniform not found");
    }
    Ok(gl.uniform_locations.insert(location))
}

// ============================================================================
// Uniforms
// ============================================================================

fn set_uniform<B: GraphicsBackend>(
    caller: &mut Ctx<'_, B>,
    handle: u32,
    value: UniformValue,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    if let Some(location) = gl.uniform_locations.get(handle)? {
        gl.backend.uniform(location, value);
    }
    Ok(())
}

fn uniform_1f<B: GraphicsBackend>(mut caller: Ctx<'_, B>, location: u32, x: f32) -> Result<()> {
    set_uniform(&mut caller, location, UniformValue::Float1(x))
}

fn uniform_2f<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    location: u32,
    x: f32,
    y: f32,
) -> Result<()> {
    set_uniform(&mut caller, location, UniformValue::Float2(x, y))
}

fn uniform_4f<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    location: u32,
    x: f32,
    y: f32,
    z: f32,
    w: f32,
) -> Result<()> {
    set_uniform(&mut caller, location, UniformValue::Float4(x, y, z, w))
}

fn uniform_1i<B: GraphicsBackend>(mut caller: Ctx<'_, B>, location: u32, x: i32) -> Result<()> {
    set_uniform(&mut caller, location, UniformValue::Int1(x))
}

/// `count` is the number of 4x4 matrices at `data_ptr`
fn uniform_matrix_4fv<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    location: u32,
    count: u32,
    transpose: u32,
    data_ptr: u32,
) -> Result<()> {
    let float_count = count
        .checked_mul(16)
        .ok_or_else(|| anyhow::anyhow!("glUniformMatrix4fv: matrix count {count} too large"))?;
    let data = read_wasm_floats(&caller, data_ptr, float_count, "glUniformMatrix4fv")?;
    set_uniform(
        &mut caller,
        location,
        UniformValue::Mat4 {
            transpose: transpose != 0,
            data,
        },
    )
}

// ============================================================================
// Buffers
// ============================================================================

fn create_buffer<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let buffer = gl.backend.create_buffer();
    gl.buffers.insert(buffer)
}

fn delete_buffer<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let buffer = gl.buffers.remove(handle)?;
    gl.backend.delete_buffer(buffer);
    Ok(())
}

fn bind_buffer<B: GraphicsBackend>(mut caller: Ctx<'_, B>, target: u32, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let buffer = gl.buffers.get_nullable(handle)?;
    gl.backend.bind_buffer(target, buffer);
    Ok(())
}

/// A null `data_ptr` reserves `size` bytes without contents
fn buffer_data<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    size: u32,
    data_ptr: u32,
    usage: u32,
) -> Result<()> {
    let data = if data_ptr == 0 {
        BufferData::Reserve(size)
    } else {
        BufferData::Bytes(read_wasm_bytes(&caller, data_ptr, size, "glBufferData")?)
    };
    caller.data_mut().gl.backend.buffer_data(target, data, usage);
    Ok(())
}

fn buffer_sub_data<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    offset: u32,
    size: u32,
    data_ptr: u32,
) -> Result<()> {
    let data = read_wasm_bytes(&caller, data_ptr, size, "glBufferSubData")?;
    caller
        .data_mut()
        .gl
        .backend
        .buffer_sub_data(target, offset, data);
    Ok(())
}

// ============================================================================
// Textures
// ============================================================================

fn create_texture<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let texture = gl.backend.create_texture();
    gl.textures.insert(texture)
}

fn delete_texture<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let texture = gl.textures.remove(handle)?;
    gl.backend.delete_texture(texture);
    Ok(())
}

fn bind_texture<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    handle: u32,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let texture = gl.textures.get_nullable(handle)?;
    gl.backend.bind_texture(target, texture);
    Ok(())
}

fn active_texture<B: GraphicsBackend>(mut caller: Ctx<'_, B>, unit: u32) {
    caller.data_mut().gl.backend.active_texture(unit);
}

/// Pixels are reinterpreted at the stride `pixel_type` declares; a null
/// pointer allocates the level without contents
#[allow(clippy::too_many_arguments)]
fn tex_image_2d<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    level: i32,
    internal_format: i32,
    width: i32,
    height: i32,
    border: i32,
    format: u32,
    pixel_type: u32,
    pixels_ptr: u32,
    pixels_len: u32,
) -> Result<()> {
    let pixels = if pixels_ptr == 0 {
        None
    } else {
        let bytes = read_wasm_bytes(&caller, pixels_ptr, pixels_len, "glTexImage2D")?;
        Some(PixelData::from_bytes(pixel_type, bytes))
    };
    caller.data_mut().gl.backend.tex_image_2d(TexImage2D {
        target,
        level,
        internal_format,
        width,
        height,
        border,
        format,
        pixel_type,
        pixels,
    });
    Ok(())
}

fn tex_parameter_i<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    pname: u32,
    param: i32,
) {
    caller
        .data_mut()
        .gl
        .backend
        .tex_parameter_i(target, pname, param);
}

fn tex_parameter_f<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    pname: u32,
    param: f32,
) {
    caller
        .data_mut()
        .gl
        .backend
        .tex_parameter_f(target, pname, param);
}

fn pixel_store_i<B: GraphicsBackend>(mut caller: Ctx<'_, B>, pname: u32, param: i32) {
    caller.data_mut().gl.backend.pixel_store_i(pname, param);
}

// ============================================================================
// Framebuffers
// ============================================================================

fn create_framebuffer<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let framebuffer = gl.backend.create_framebuffer();
    gl.framebuffers.insert(framebuffer)
}

fn delete_framebuffer<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let framebuffer = gl.framebuffers.remove(handle)?;
    gl.backend.delete_framebuffer(framebuffer);
    Ok(())
}

fn bind_framebuffer<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    handle: u32,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let framebuffer = gl.framebuffers.get_nullable(handle)?;
    gl.backend.bind_framebuffer(target, framebuffer);
    Ok(())
}

fn framebuffer_texture_2d<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    target: u32,
    attachment: u32,
    texture_target: u32,
    texture: u32,
    level: i32,
) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let texture = gl.textures.get_nullable(texture)?;
    gl.backend
        .framebuffer_texture_2d(target, attachment, texture_target, texture, level);
    Ok(())
}

fn check_framebuffer_status<B: GraphicsBackend>(mut caller: Ctx<'_, B>, target: u32) -> u32 {
    caller.data_mut().gl.backend.check_framebuffer_status(target)
}

// ============================================================================
// Vertex arrays
// ============================================================================

fn create_vertex_array<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    let gl = &mut caller.data_mut().gl;
    let vertex_array = gl.backend.create_vertex_array();
    gl.vertex_arrays.insert(vertex_array)
}

fn delete_vertex_array<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let vertex_array = gl.vertex_arrays.remove(handle)?;
    gl.backend.delete_vertex_array(vertex_array);
    Ok(())
}

fn bind_vertex_array<B: GraphicsBackend>(mut caller: Ctx<'_, B>, handle: u32) -> Result<()> {
    let gl = &mut caller.data_mut().gl;
    let vertex_array = gl.vertex_arrays.get_nullable(handle)?;
    gl.backend.bind_vertex_array(vertex_array);
    Ok(())
}

// ============================================================================
// Attributes and drawing
// ============================================================================

fn enable_vertex_attrib_array<B: GraphicsBackend>(mut caller: Ctx<'_, B>, index: u32) {
    caller.data_mut().gl.backend.enable_vertex_attrib_array(index);
}

fn disable_vertex_attrib_array<B: GraphicsBackend>(mut caller: Ctx<'_, B>, index: u32) {
    caller
        .data_mut()
        .gl
        .backend
        .disable_vertex_attrib_array(index);
}

fn vertex_attrib_pointer<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    index: u32,
    size: i32,
    component_type: u32,
    normalized: u32,
    stride: i32,
    offset: i32,
) {
    caller
        .data_mut()
        .gl
        .backend
        .vertex_attrib_pointer(VertexAttribPointer {
            index,
            size,
            component_type,
            normalized: normalized != 0,
            stride,
            offset,
        });
}

fn draw_arrays<B: GraphicsBackend>(mut caller: Ctx<'_, B>, mode: u32, first: i32, count: i32) {
    caller.data_mut().gl.backend.draw_arrays(mode, first, count);
}

fn draw_elements<B: GraphicsBackend>(
    mut caller: Ctx<'_, B>,
    mode: u32,
    count: i32,
    index_type: u32,
    offset: i32,
) {
    caller
        .data_mut()
        .gl
        .backend
        .draw_elements(mode, count, index_type, offset);
}

// ============================================================================
// Fixed-function state
// ============================================================================

fn enable<B: GraphicsBackend>(mut caller: Ctx<'_, B>, cap: u32) {
    caller.data_mut().gl.backend.enable(cap);
}

fn disable<B: GraphicsBackend>(mut caller: Ctx<'_, B>, cap: u32) {
    caller.data_mut().gl.backend.disable(cap);
}

fn blend_func<B: GraphicsBackend>(mut caller: Ctx<'_, B>, src: u32, dst: u32) {
    caller.data_mut().gl.backend.blend_func(src, dst);
}

fn depth_func<B: GraphicsBackend>(mut caller: Ctx<'_, B>, func: u32) {
    caller.data_mut().gl.backend.depth_func(func);
}

fn depth_mask<B: GraphicsBackend>(mut caller: Ctx<'_, B>, flag: u32) {
    caller.data_mut().gl.backend.depth_mask(flag != 0);
}

fn cull_face<B: GraphicsBackend>(mut caller: Ctx<'_, B>, mode: u32) {
    caller.data_mut().gl.backend.cull_face(mode);
}

fn front_face<B: GraphicsBackend>(mut caller: Ctx<'_, B>, mode: u32) {
    caller.data_mut().gl.backend.front_face(mode);
}

fn viewport<B: GraphicsBackend>(mut caller: Ctx<'_, B>, x: i32, y: i32, width: i32, height: i32) {
    caller.data_mut().gl.backend.viewport(x, y, width, height);
}

fn scissor<B: GraphicsBackend>(mut caller: Ctx<'_, B>, x: i32, y: i32, width: i32, height: i32) {
    caller.data_mut().gl.backend.scissor(x, y, width, height);
}

fn clear<B: GraphicsBackend>(mut caller: Ctx<'_, B>, mask: u32) {
    caller.data_mut().gl.backend.clear(mask);
}

fn clear_color<B: GraphicsBackend>(mut caller: Ctx<'_, B>, r: f32, g: f32, b: f32, a: f32) {
    caller.data_mut().gl.backend.clear_color(r, g, b, a);
}

fn clear_depth<B: GraphicsBackend>(mut caller: Ctx<'_, B>, depth: f32) {
    caller.data_mut().gl.backend.clear_depth(depth);
}

fn get_error<B: GraphicsBackend>(mut caller: Ctx<'_, B>) -> u32 {
    caller.data_mut().gl.backend.get_error()
}
