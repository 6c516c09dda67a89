//! Recording graphics backend
//!
//! Runs the full proxy contract without a GPU: objects are numbered, shader
//! compilation and program linking are simulated from the GLSL declarations,
//! and every state-changing call is appended to a call log.

use hashbrown::HashMap;

use super::consts::*;
use super::{
    BufferData, GraphicsBackend, ParamValue, TexImage2D, UniformValue, VertexAttribPointer,
};

/// Opaque object id handed out by [`HeadlessGl`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlObject(pub u32);

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Create {
        kind: &'static str,
        id: u32,
    },
    Delete {
        kind: &'static str,
        id: u32,
    },
    Bind {
        kind: &'static str,
        target: u32,
        id: Option<u32>,
    },
    BufferData {
        target: u32,
        data: BufferData,
        usage: u32,
    },
    BufferSubData {
        target: u32,
        offset: u32,
        data: Vec<u8>,
    },
    TexImage2D(TexImage2D),
    FramebufferTexture2D {
        attachment: u32,
        texture: Option<u32>,
        level: i32,
    },
    Uniform {
        location: u32,
        value: UniformValue,
    },
    VertexAttribPointer(VertexAttribPointer),
    DrawArrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    DrawElements {
        mode: u32,
        count: i32,
        index_type: u32,
        offset: i32,
    },
    /// Any other fixed-function state change, with its numeric arguments
    State {
        name: &'static str,
        args: Vec<f64>,
    },
}

#[derive(Debug, Default)]
struct ShaderInfo {
    kind: u32,
    source: String,
    compiled: bool,
    log: Option<String>,
}

#[derive(Debug, Default)]
struct ProgramInfo {
    shaders: Vec<u32>,
    linked: bool,
    log: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// Headless [`GraphicsBackend`] that records what the module asked for
#[derive(Debug, Default)]
pub struct HeadlessGl {
    next_id: u32,
    calls: Vec<GlCall>,
    log_disabled: bool,
    shaders: HashMap<u32, ShaderInfo>,
    programs: HashMap<u32, ProgramInfo>,
    attachments: HashMap<u32, u32>,
    bound_framebuffer: Option<u32>,
    errors: Vec<u32>,
    draw_calls: u64,
}

/// Declared names for a storage qualifier (`attribute`, `in`, `uniform`)
fn declared_names(source: &str, qualifiers: &[&str]) -> Vec<String> {
    let body: Vec<&str> = source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    body.join("\n")
        .split(';')
        .filter_map(|statement| {
            let mut tokens = statement
                .split_whitespace()
                .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp"));
            let qualifier = tokens.next()?;
            if !qualifiers.contains(&qualifier) {
                return None;
            }
            let _ty = tokens.next()?;
            let name = tokens.next()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that keeps object state but records no calls, for long runs
    pub fn without_log() -> Self {
        Self {
            log_disabled: true,
            ..Self::default()
        }
    }

    fn record(&mut self, call: GlCall) {
        if !self.log_disabled {
            self.calls.push(call);
        }
    }

    fn alloc(&mut self, kind: &'static str) -> GlObject {
        self.next_id += 1;
        let id = self.next_id;
        self.record(GlCall::Create { kind, id });
        GlObject(id)
    }

    fn state(&mut self, name: &'static str, args: &[f64]) {
        self.record(GlCall::State {
            name,
            args: args.to_vec(),
        });
    }

    /// All calls recorded since the last [`HeadlessGl::take_calls`]
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Total draw calls since creation
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Source last given to a shader
    pub fn shader_source_of(&self, shader: GlObject) -> Option<&str> {
        self.shaders.get(&shader.0).map(|s| s.source.as_str())
    }

    /// Queue an error for the next `getError`
    pub fn push_error(&mut self, code: u32) {
        self.errors.push(code);
    }
}

impl GraphicsBackend for HeadlessGl {
    type Shader = GlObject;
    type Program = GlObject;
    type Buffer = GlObject;
    type Texture = GlObject;
    type Framebuffer = GlObject;
    type VertexArray = GlObject;
    type UniformLocation = GlObject;

    fn create_shader(&mut self, kind: u32) -> GlObject {
        let shader = self.alloc("shader");
        if kind != VERTEX_SHADER && kind != FRAGMENT_SHADER {
            self.errors.push(INVALID_ENUM);
        }
        self.shaders.insert(
            shader.0,
            ShaderInfo {
                kind,
                ..Default::default()
            },
        );
        shader
    }

    fn delete_shader(&mut self, shader: GlObject) {
        self.shaders.remove(&shader.0);
        self.record(GlCall::Delete {
            kind: "shader",
            id: shader.0,
        });
    }

    fn shader_source(&mut self, shader: &GlObject, source: &str) {
        if let Some(info) = self.shaders.get_mut(&shader.0) {
            info.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: &GlObject) {
        if let Some(info) = self.shaders.get_mut(&shader.0) {
            info.compiled = info.source.contains("main");
            info.log = Some(if info.compiled {
                String::new()
            } else {
                "ERROR: 0:1: 'main' : function not defined\n".to_string()
            });
        }
    }

    fn shader_parameter(&mut self, shader: &GlObject, pname: u32) -> ParamValue {
        let Some(info) = self.shaders.get(&shader.0) else {
            self.errors.push(INVALID_OPERATION);
            return ParamValue::Null;
        };
        match pname {
            COMPILE_STATUS => ParamValue::Bool(info.compiled),
            DELETE_STATUS => ParamValue::Bool(false),
            SHADER_TYPE => ParamValue::Int(info.kind as i32),
            _ => {
                self.errors.push(INVALID_ENUM);
                ParamValue::Null
            }
        }
    }

    fn shader_info_log(&mut self, shader: &GlObject) -> Option<String> {
        self.shaders.get(&shader.0).and_then(|s| s.log.clone())
    }

    fn create_program(&mut self) -> GlObject {
        let program = self.alloc("program");
        self.programs.insert(program.0, ProgramInfo::default());
        program
    }

    fn delete_program(&mut self, program: GlObject) {
        self.programs.remove(&program.0);
        self.record(GlCall::Delete {
            kind: "program",
            id: program.0,
        });
    }

    fn attach_shader(&mut self, program: &GlObject, shader: &GlObject) {
        if let Some(info) = self.programs.get_mut(&program.0)
            && !info.shaders.contains(&shader.0)
        {
            info.shaders.push(shader.0);
        }
        self.state("attachShader", &[program.0 as f64, shader.0 as f64]);
    }

    fn detach_shader(&mut self, program: &GlObject, shader: &GlObject) {
        if let Some(info) = self.programs.get_mut(&program.0) {
            info.shaders.retain(|s| *s != shader.0);
        }
        self.state("detachShader", &[program.0 as f64, shader.0 as f64]);
    }

    fn link_program(&mut self, program: &GlObject) {
        let Some(info) = self.programs.get(&program.0) else {
            self.errors.push(INVALID_OPERATION);
            return;
        };
        let attached: Vec<&ShaderInfo> = info
            .shaders
            .iter()
            .filter_map(|id| self.shaders.get(id))
            .collect();
        let has_vertex = attached
            .iter()
            .any(|s| s.kind == VERTEX_SHADER && s.compiled);
        let has_fragment = attached
            .iter()
            .any(|s| s.kind == FRAGMENT_SHADER && s.compiled);
        let linked = has_vertex && has_fragment;
        let attributes = attached
            .iter()
            .filter(|s| s.kind == VERTEX_SHADER)
            .flat_map(|s| declared_names(&s.source, &["attribute", "in"]))
            .collect();
        let uniforms = attached
            .iter()
            .flat_map(|s| declared_names(&s.source, &["uniform"]))
            .collect();

        if let Some(info) = self.programs.get_mut(&program.0) {
            info.linked = linked;
            info.attributes = attributes;
            info.uniforms = uniforms;
            info.log = Some(if linked {
                String::new()
            } else {
                "error: program requires a compiled vertex and fragment shader\n".to_string()
            });
        }
    }

    fn use_program(&mut self, program: Option<&GlObject>) {
        self.record(GlCall::Bind {
            kind: "program",
            target: 0,
            id: program.map(|p| p.0),
        });
    }

    fn program_parameter(&mut self, program: &GlObject, pname: u32) -> ParamValue {
        let Some(info) = self.programs.get(&program.0) else {
            self.errors.push(INVALID_OPERATION);
            return ParamValue::Null;
        };
        match pname {
            LINK_STATUS | VALIDATE_STATUS => ParamValue::Bool(info.linked),
            DELETE_STATUS => ParamValue::Bool(false),
            ATTACHED_SHADERS => ParamValue::Int(info.shaders.len() as i32),
            _ => {
                self.errors.push(INVALID_ENUM);
                ParamValue::Null
            }
        }
    }

    fn program_info_log(&mut self, program: &GlObject) -> Option<String> {
        self.programs.get(&program.0).and_then(|p| p.log.clone())
    }

    fn attrib_location(&mut self, program: &GlObject, name: &str) -> i32 {
        self.programs
            .get(&program.0)
            .filter(|p| p.linked)
            .and_then(|p| p.attributes.iter().position(|a| a == name))
            .map_or(-1, |index| index as i32)
    }

    fn uniform_location(&mut self, program: &GlObject, name: &str) -> Option<GlObject> {
        let found = self
            .programs
            .get(&program.0)
            .is_some_and(|p| p.linked && p.uniforms.iter().any(|u| u == name));
        found.then(|| self.alloc("uniform location"))
    }

    fn uniform(&mut self, location: &GlObject, value: UniformValue) {
        self.record(GlCall::Uniform {
            location: location.0,
            value,
        });
    }

    fn create_buffer(&mut self) -> GlObject {
        self.alloc("buffer")
    }

    fn delete_buffer(&mut self, buffer: GlObject) {
        self.record(GlCall::Delete {
            kind: "buffer",
            id: buffer.0,
        });
    }

    fn bind_buffer(&mut self, target: u32, buffer: Option<&GlObject>) {
        self.record(GlCall::Bind {
            kind: "buffer",
            target,
            id: buffer.map(|b| b.0),
        });
    }

    fn buffer_data(&mut self, target: u32, data: BufferData, usage: u32) {
        self.record(GlCall::BufferData {
            target,
            data,
            usage,
        });
    }

    fn buffer_sub_data(&mut self, target: u32, offset: u32, data: Vec<u8>) {
        self.record(GlCall::BufferSubData {
            target,
            offset,
            data,
        });
    }

    fn create_texture(&mut self) -> GlObject {
        self.alloc("texture")
    }

    fn delete_texture(&mut self, texture: GlObject) {
        self.record(GlCall::Delete {
            kind: "texture",
            id: texture.0,
        });
    }

    fn bind_texture(&mut self, target: u32, texture: Option<&GlObject>) {
        self.record(GlCall::Bind {
            kind: "texture",
            target,
            id: texture.map(|t| t.0),
        });
    }

    fn active_texture(&mut self, unit: u32) {
        self.state("activeTexture", &[unit as f64]);
    }

    fn tex_image_2d(&mut self, image: TexImage2D) {
        self.record(GlCall::TexImage2D(image));
    }

    fn tex_parameter_i(&mut self, target: u32, pname: u32, param: i32) {
        self.state("texParameteri", &[target as f64, pname as f64, param as f64]);
    }

    fn tex_parameter_f(&mut self, target: u32, pname: u32, param: f32) {
        self.state("texParameterf", &[target as f64, pname as f64, param as f64]);
    }

    fn pixel_store_i(&mut self, pname: u32, param: i32) {
        self.state("pixelStorei", &[pname as f64, param as f64]);
    }

    fn create_framebuffer(&mut self) -> GlObject {
        self.alloc("framebuffer")
    }

    fn delete_framebuffer(&mut self, framebuffer: GlObject) {
        self.attachments.remove(&framebuffer.0);
        if self.bound_framebuffer == Some(framebuffer.0) {
            self.bound_framebuffer = None;
        }
        self.record(GlCall::Delete {
            kind: "framebuffer",
            id: framebuffer.0,
        });
    }

    fn bind_framebuffer(&mut self, target: u32, framebuffer: Option<&GlObject>) {
        self.bound_framebuffer = framebuffer.map(|f| f.0);
        self.record(GlCall::Bind {
            kind: "framebuffer",
            target,
            id: self.bound_framebuffer,
        });
    }

    fn framebuffer_texture_2d(
        &mut self,
        _target: u32,
        attachment: u32,
        _texture_target: u32,
        texture: Option<&GlObject>,
        level: i32,
    ) {
        match (self.bound_framebuffer, texture) {
            (Some(fb), Some(tex)) => {
                self.attachments.insert(fb, tex.0);
            }
            (Some(fb), None) => {
                self.attachments.remove(&fb);
            }
            (None, _) => self.errors.push(INVALID_OPERATION),
        }
        self.record(GlCall::FramebufferTexture2D {
            attachment,
            texture: texture.map(|t| t.0),
            level,
        });
    }

    fn check_framebuffer_status(&mut self, _target: u32) -> u32 {
        match self.bound_framebuffer {
            None => FRAMEBUFFER_COMPLETE,
            Some(fb) if self.attachments.contains_key(&fb) => FRAMEBUFFER_COMPLETE,
            Some(_) => FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
        }
    }

    fn create_vertex_array(&mut self) -> GlObject {
        self.alloc("vertex array")
    }

    fn delete_vertex_array(&mut self, vertex_array: GlObject) {
        self.record(GlCall::Delete {
            kind: "vertex array",
            id: vertex_array.0,
        });
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<&GlObject>) {
        self.record(GlCall::Bind {
            kind: "vertex array",
            target: 0,
            id: vertex_array.map(|v| v.0),
        });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.state("enableVertexAttribArray", &[index as f64]);
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.state("disableVertexAttribArray", &[index as f64]);
    }

    fn vertex_attrib_pointer(&mut self, pointer: VertexAttribPointer) {
        self.record(GlCall::VertexAttribPointer(pointer));
    }

    fn draw_arrays(&mut self, mode: u32, first: i32, count: i32) {
        self.draw_calls += 1;
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: u32, count: i32, index_type: u32, offset: i32) {
        self.draw_calls += 1;
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }

    fn enable(&mut self, cap: u32) {
        self.state("enable", &[cap as f64]);
    }

    fn disable(&mut self, cap: u32) {
        self.state("disable", &[cap as f64]);
    }

    fn blend_func(&mut self, src: u32, dst: u32) {
        self.state("blendFunc", &[src as f64, dst as f64]);
    }

    fn depth_func(&mut self, func: u32) {
        self.state("depthFunc", &[func as f64]);
    }

    fn depth_mask(&mut self, flag: bool) {
        self.state("depthMask", &[flag as u8 as f64]);
    }

    fn cull_face(&mut self, mode: u32) {
        self.state("cullFace", &[mode as f64]);
    }

    fn front_face(&mut self, mode: u32) {
        self.state("frontFace", &[mode as f64]);
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state(
            "viewport",
            &[x as f64, y as f64, width as f64, height as f64],
        );
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state("scissor", &[x as f64, y as f64, width as f64, height as f64]);
    }

    fn clear(&mut self, mask: u32) {
        self.state("clear", &[mask as f64]);
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state("clearColor", &[r as f64, g as f64, b as f64, a as f64]);
    }

    fn clear_depth(&mut self, depth: f32) {
        self.state("clearDepth", &[depth as f64]);
    }

    fn get_error(&mut self) -> u32 {
        if self.errors.is_empty() {
            NO_ERROR
        } else {
            self.errors.remove(0)
        }
    }
}
