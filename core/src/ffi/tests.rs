//! Tests for FFI functions
//!
//! Each test instantiates a module that imports host functions and re-exports
//! them, so the host can call an import exactly as the module would.

use super::*;
use crate::assets::install_assets;
use crate::gl::consts::*;
use crate::gl::{BufferData, GlCall, GlState, HeadlessGl, PixelData, UniformValue};
use crate::handles::NULL_HANDLE;
use crate::memory::LinearMemory;
use crate::storage::StorageBridge;
use wasmtime::{Engine, Instance, Linker, Module, Store, WasmParams, WasmResults};

/// Every import the module may use, with its wasm signature
const SURFACE: &[(&str, &str)] = &[
    ("glActiveTexture", "(param i32)"),
    ("glAttachShader", "(param i32 i32)"),
    ("glDetachShader", "(param i32 i32)"),
    ("glBindBuffer", "(param i32 i32)"),
    ("glBindFramebuffer", "(param i32 i32)"),
    ("glBindTexture", "(param i32 i32)"),
    ("glBindVertexArray", "(param i32)"),
    ("glBlendFunc", "(param i32 i32)"),
    ("glBufferData", "(param i32 i32 i32 i32)"),
    ("glBufferSubData", "(param i32 i32 i32 i32)"),
    ("glCheckFramebufferStatus", "(param i32) (result i32)"),
    ("glClear", "(param i32)"),
    ("glClearColor", "(param f32 f32 f32 f32)"),
    ("glClearDepth", "(param f32)"),
    ("glCompileShader", "(param i32)"),
    ("glCreateBuffer", "(result i32)"),
    ("glCreateFramebuffer", "(result i32)"),
    ("glCreateProgram", "(result i32)"),
    ("glCreateShader", "(param i32) (result i32)"),
    ("glCreateTexture", "(result i32)"),
    ("glCreateVertexArray", "(result i32)"),
    ("glCullFace", "(param i32)"),
    ("glDeleteBuffer", "(param i32)"),
    ("glDeleteFramebuffer", "(param i32)"),
    ("glDeleteProgram", "(param i32)"),
    ("glDeleteShader", "(param i32)"),
    ("glDeleteTexture", "(param i32)"),
    ("glDeleteVertexArray", "(param i32)"),
    ("glDepthFunc", "(param i32)"),
    ("glDepthMask", "(param i32)"),
    ("glDisable", "(param i32)"),
    ("glDisableVertexAttribArray", "(param i32)"),
    ("glDrawArrays", "(param i32 i32 i32)"),
    ("glDrawElements", "(param i32 i32 i32 i32)"),
    ("glEnable", "(param i32)"),
    ("glEnableVertexAttribArray", "(param i32)"),
    ("glFramebufferTexture2D", "(param i32 i32 i32 i32 i32)"),
    ("glFrontFace", "(param i32)"),
    ("glGetAttribLocation_", "(param i32 i32 i32) (result i32)"),
    ("glGetError", "(result i32)"),
    ("glGetProgramParameter", "(param i32 i32) (result i32)"),
    ("glGetShaderParameter", "(param i32 i32) (result i32)"),
    ("glGetUniformLocation_", "(param i32 i32 i32) (result i32)"),
    ("glGetProgramInfoLog_api", "(param i32 i32 i32) (result i32)"),
    ("glGetShaderInfoLog_api", "(param i32 i32 i32) (result i32)"),
    ("getProgramInfoLogLength", "(param i32) (result i32)"),
    ("getShaderInfoLogLength", "(param i32) (result i32)"),
    ("glLinkProgram", "(param i32)"),
    ("glPixelStorei", "(param i32 i32)"),
    ("glScissor", "(param i32 i32 i32 i32)"),
    ("glShaderSource_api_", "(param i32 i32 i32)"),
    (
        "glTexImage2D_api",
        "(param i32 i32 i32 i32 i32 i32 i32 i32 i32 i32)",
    ),
    ("glTexParameterf", "(param i32 i32 f32)"),
    ("glTexParameteri", "(param i32 i32 i32)"),
    ("glUniform1f", "(param i32 f32)"),
    ("glUniform1i", "(param i32 i32)"),
    ("glUniform2f", "(param i32 f32 f32)"),
    ("glUniform4f", "(param i32 f32 f32 f32 f32)"),
    ("glUniformMatrix4fv", "(param i32 i32 i32 i32)"),
    ("glUseProgram", "(param i32)"),
    ("glVertexAttribPointer", "(param i32 i32 i32 i32 i32 i32)"),
    ("glViewport", "(param i32 i32 i32 i32)"),
    ("getRandomSeed", "(result i32)"),
    ("consoleLog", "(param i32 i32)"),
    ("consoleLog_", "(param i32 i32)"),
    ("setLocalStorage", "(param i32 i32 i32 i32)"),
    ("getLocalStorage", "(param i32 i32 i32 i32) (result i32)"),
    ("setLocalStorage_", "(param i32 i32 i32 i32)"),
    ("getLocalStorage_", "(param i32 i32 i32 i32) (result i32)"),
    ("getAsset", "(param i32 i32 i32 i32) (result i32)"),
    ("getAssetPtr_", "(param i32 i32) (result i32)"),
    ("getAssetLen_", "(param i32 i32) (result i32)"),
];

const ARRAY_BUFFER: u32 = 0x8892;
const STATIC_DRAW: u32 = 0x88E4;
const TEXTURE_2D: u32 = 0x0DE1;
const FRAMEBUFFER: u32 = 0x8D40;
const COLOR_ATTACHMENT0: u32 = 0x8CE0;
const RGBA: u32 = 0x1908;

/// Module importing every `SURFACE` function and exporting it under the same name
fn reexport_module() -> String {
    let mut wat = String::from("(module\n");
    for (i, (name, sig)) in SURFACE.iter().enumerate() {
        wat.push_str(&format!(
            "  (import \"env\" \"{name}\" (func $f{i} {sig}))\n  (export \"{name}\" (func $f{i}))\n"
        ));
    }
    wat.push_str("  (memory (export \"memory\") 1)\n)\n");
    wat
}

struct Harness {
    store: Store<HostContext<HeadlessGl>>,
    instance: Instance,
    memory: LinearMemory,
}

impl Harness {
    fn new() -> Self {
        let engine = Engine::default();
        let mut linker = Linker::new(&engine);
        register_host_ffi(&mut linker).unwrap();

        let wasm = wat::parse_str(reexport_module()).unwrap();
        let module = Module::new(&engine, wasm).unwrap();
        let context = HostContext::new(HeadlessGl::new(), StorageBridge::default());
        let mut store = Store::new(&engine, context);
        let instance = linker.instantiate(&mut store, &module).unwrap();
        let memory = LinearMemory::new(instance.get_memory(&mut store, "memory").unwrap());
        store.data_mut().memory = Some(memory);
        Self {
            store,
            instance,
            memory,
        }
    }

    fn call<P: WasmParams, R: WasmResults>(&mut self, name: &str, params: P) -> anyhow::Result<R> {
        let func = self
            .instance
            .get_typed_func::<P, R>(&mut self.store, name)
            .unwrap();
        func.call(&mut self.store, params)
    }

    fn write(&mut self, ptr: u32, bytes: &[u8]) {
        self.memory.write_bytes(&mut self.store, ptr, bytes).unwrap();
    }

    fn read(&self, ptr: u32, len: u32) -> Vec<u8> {
        self.memory.read_bytes(&self.store, ptr, len).unwrap()
    }

    /// Write `s` at `ptr` and return `(ptr, len)`
    fn string(&mut self, ptr: u32, s: &str) -> (u32, u32) {
        self.write(ptr, s.as_bytes());
        (ptr, s.len() as u32)
    }

    fn gl(&self) -> &GlState<HeadlessGl> {
        &self.store.data().gl
    }

    fn take_calls(&mut self) -> Vec<GlCall> {
        self.store.data_mut().gl.backend.take_calls()
    }

    fn shader(&mut self, kind: u32, source: &str) -> u32 {
        let shader: u32 = self.call("glCreateShader", kind).unwrap();
        let (ptr, len) = self.string(4096, source);
        self.call::<_, ()>("glShaderSource_api_", (shader, ptr, len))
            .unwrap();
        self.call::<_, ()>("glCompileShader", shader).unwrap();
        shader
    }

    fn linked_program(&mut self, vs: &str, fs: &str) -> u32 {
        let vs = self.shader(VERTEX_SHADER, vs);
        let fs = self.shader(FRAGMENT_SHADER, fs);
        let program: u32 = self.call("glCreateProgram", ()).unwrap();
        self.call::<_, ()>("glAttachShader", (program, vs)).unwrap();
        self.call::<_, ()>("glAttachShader", (program, fs)).unwrap();
        self.call::<_, ()>("glLinkProgram", program).unwrap();
        program
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_every_import_resolves() {
    let harness = Harness::new();
    assert_eq!(harness.memory.byte_len(&harness.store), 65536);
}

#[test]
fn test_unknown_import_fails_instantiation() {
    let engine = Engine::default();
    let mut linker: Linker<HostContext<HeadlessGl>> = Linker::new(&engine);
    register_host_ffi(&mut linker).unwrap();
    let wasm = wat::parse_str(
        r#"(module
            (import "env" "glGenBuffers" (func (param i32 i32)))
            (memory (export "memory") 1))"#,
    )
    .unwrap();
    let module = Module::new(&engine, wasm).unwrap();
    let mut store = Store::new(
        &engine,
        HostContext::new(HeadlessGl::new(), StorageBridge::default()),
    );
    assert!(linker.instantiate(&mut store, &module).is_err());
}

// ============================================================================
// Buffer and texture uploads
// ============================================================================

#[test]
fn test_buffer_data_null_pointer_reserves() {
    let mut h = Harness::new();
    let buffer: u32 = h.call("glCreateBuffer", ()).unwrap();
    h.call::<_, ()>("glBindBuffer", (ARRAY_BUFFER, buffer))
        .unwrap();
    h.take_calls();

    h.call::<_, ()>("glBufferData", (ARRAY_BUFFER, 256u32, 0u32, STATIC_DRAW))
        .unwrap();
    assert_eq!(
        h.take_calls(),
        vec![GlCall::BufferData {
            target: ARRAY_BUFFER,
            data: BufferData::Reserve(256),
            usage: STATIC_DRAW,
        }]
    );
}

#[test]
fn test_buffer_data_copies_exact_range() {
    let mut h = Harness::new();
    h.write(100, &[9, 1, 2, 3, 4, 9]);
    h.call::<_, ()>("glBufferData", (ARRAY_BUFFER, 4u32, 101u32, STATIC_DRAW))
        .unwrap();
    h.call::<_, ()>("glBufferSubData", (ARRAY_BUFFER, 8u32, 2u32, 102u32))
        .unwrap();
    assert_eq!(
        h.take_calls(),
        vec![
            GlCall::BufferData {
                target: ARRAY_BUFFER,
                data: BufferData::Bytes(vec![1, 2, 3, 4]),
                usage: STATIC_DRAW,
            },
            GlCall::BufferSubData {
                target: ARRAY_BUFFER,
                offset: 8,
                data: vec![2, 3],
            },
        ]
    );
}

#[test]
fn test_buffer_data_out_of_bounds_traps() {
    let mut h = Harness::new();
    let err = h
        .call::<_, ()>("glBufferData", (ARRAY_BUFFER, 16u32, 65530u32, STATIC_DRAW))
        .unwrap_err();
    assert!(format!("{err:?}").contains("glBufferData"));
    assert!(h.take_calls().is_empty());
}

fn tex_image(h: &mut Harness, pixel_type: u32, ptr: u32, len: u32) -> Option<PixelData> {
    h.take_calls();
    h.call::<_, ()>(
        "glTexImage2D_api",
        (
            TEXTURE_2D, 0i32, RGBA as i32, 1i32, 1i32, 0i32, RGBA, pixel_type, ptr, len,
        ),
    )
    .unwrap();
    match h.take_calls().as_slice() {
        [GlCall::TexImage2D(image)] => image.pixels.clone(),
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[test]
fn test_tex_image_pixel_type_dispatch() {
    let mut h = Harness::new();
    h.write(200, &[0x1F, 0xF8, 0xE0, 0x07]);

    assert_eq!(
        tex_image(&mut h, UNSIGNED_BYTE, 200, 4),
        Some(PixelData::U8(vec![0x1F, 0xF8, 0xE0, 0x07]))
    );
    for packed in [
        UNSIGNED_SHORT_5_6_5,
        UNSIGNED_SHORT_4_4_4_4,
        UNSIGNED_SHORT_5_5_5_1,
        UNSIGNED_SHORT,
    ] {
        assert_eq!(
            tex_image(&mut h, packed, 200, 4),
            Some(PixelData::U16(vec![0xF81F, 0x07E0]))
        );
    }
}

#[test]
fn test_tex_image_null_pointer_allocates_empty_level() {
    let mut h = Harness::new();
    assert_eq!(tex_image(&mut h, UNSIGNED_BYTE, 0, 64), None);
}

// ============================================================================
// Shaders, programs and info logs
// ============================================================================

const VS: &str = "attribute vec2 a_pos;\nuniform mat4 u_mvp;\nvoid main() { gl_Position = u_mvp * vec4(a_pos, 0.0, 1.0); }";
const FS: &str = "precision mediump float;\nuniform lowp vec4 u_tint;\nvoid main() { gl_FragColor = u_tint; }";
const COMPILE_ERROR: &str = "ERROR: 0:1: 'main' : function not defined\n";

#[test]
fn test_info_log_two_phase_retrieval() {
    let mut h = Harness::new();
    let shader: u32 = h.call("glCreateShader", VERTEX_SHADER).unwrap();
    // No log before compiling
    assert_eq!(h.call::<_, u32>("getShaderInfoLogLength", shader).unwrap(), 0);

    let (ptr, len) = h.string(4096, "void broken() {}");
    h.call::<_, ()>("glShaderSource_api_", (shader, ptr, len))
        .unwrap();
    h.call::<_, ()>("glCompileShader", shader).unwrap();

    let full = COMPILE_ERROR.len() as u32;
    assert_eq!(
        h.call::<_, u32>("getShaderInfoLogLength", shader).unwrap(),
        full
    );

    // Truncated to capacity
    let written: u32 = h
        .call("glGetShaderInfoLog_api", (shader, 300u32, 10u32))
        .unwrap();
    assert_eq!(written, 10);
    assert_eq!(h.read(300, 10), &COMPILE_ERROR.as_bytes()[..10]);

    let written: u32 = h
        .call("glGetShaderInfoLog_api", (shader, 300u32, 1000u32))
        .unwrap();
    assert_eq!(written, full);
    assert_eq!(h.read(300, full), COMPILE_ERROR.as_bytes());
}

#[test]
fn test_program_info_log_after_failed_link() {
    let mut h = Harness::new();
    let vs = h.shader(VERTEX_SHADER, VS);
    let program: u32 = h.call("glCreateProgram", ()).unwrap();
    h.call::<_, ()>("glAttachShader", (program, vs)).unwrap();
    h.call::<_, ()>("glLinkProgram", program).unwrap();

    assert_eq!(
        h.call::<_, i32>("glGetProgramParameter", (program, LINK_STATUS))
            .unwrap(),
        0
    );
    let len: u32 = h.call("getProgramInfoLogLength", program).unwrap();
    assert!(len > 0);
    let written: u32 = h
        .call("glGetProgramInfoLog_api", (program, 500u32, len))
        .unwrap();
    assert_eq!(written, len);
    let log = String::from_utf8(h.read(500, len)).unwrap();
    assert!(log.contains("fragment"));
}

#[test]
fn test_parameter_encoding() {
    let mut h = Harness::new();
    let good = h.shader(VERTEX_SHADER, VS);
    let bad = h.shader(FRAGMENT_SHADER, "void oops() {}");

    let status = |h: &mut Harness, shader: u32, pname: u32| -> i32 {
        h.call("glGetShaderParameter", (shader, pname)).unwrap()
    };
    assert_eq!(status(&mut h, good, COMPILE_STATUS), 1);
    assert_eq!(status(&mut h, bad, COMPILE_STATUS), 0);
    assert_eq!(status(&mut h, good, SHADER_TYPE), VERTEX_SHADER as i32);

    // Unknown parameter: null result plus a queued error
    assert_eq!(status(&mut h, good, 0x1234), 0);
    assert_eq!(h.call::<_, u32>("glGetError", ()).unwrap(), INVALID_ENUM);
    assert_eq!(h.call::<_, u32>("glGetError", ()).unwrap(), NO_ERROR);
}

#[test]
fn test_attrib_and_uniform_locations() {
    let mut h = Harness::new();
    let program = h.linked_program(VS, FS);
    assert_eq!(
        h.call::<_, i32>("glGetProgramParameter", (program, LINK_STATUS))
            .unwrap(),
        1
    );

    let (ptr, len) = h.string(1000, "a_pos");
    assert_eq!(
        h.call::<_, i32>("glGetAttribLocation_", (program, ptr, len))
            .unwrap(),
        0
    );
    let (ptr, len) = h.string(1000, "a_missing");
    assert_eq!(
        h.call::<_, i32>("glGetAttribLocation_", (program, ptr, len))
            .unwrap(),
        -1
    );

    let (ptr, len) = h.string(1000, "u_tint");
    let tint: u32 = h
        .call("glGetUniformLocation_", (program, ptr, len))
        .unwrap();
    let (ptr, len) = h.string(1000, "u_missing");
    let missing: u32 = h
        .call("glGetUniformLocation_", (program, ptr, len))
        .unwrap();
    // Unknown uniforms still get their own handle
    assert_eq!((tint, missing), (0, 1));
    assert_eq!(h.gl().uniform_locations.allocated(), 2);

    h.take_calls();
    h.call::<_, ()>("glUniform4f", (missing, 1.0f32, 0.0f32, 0.0f32, 1.0f32))
        .unwrap();
    assert!(h.take_calls().is_empty());

    h.call::<_, ()>("glUniform4f", (tint, 1.0f32, 0.5f32, 0.25f32, 1.0f32))
        .unwrap();
    let location = uniform_object(&h, tint);
    assert_eq!(
        h.take_calls(),
        vec![GlCall::Uniform {
            location,
            value: UniformValue::Float4(1.0, 0.5, 0.25, 1.0),
        }]
    );
}

/// Backend object behind a uniform location handle
fn uniform_object(h: &Harness, handle: u32) -> u32 {
    let location = h.gl().uniform_locations.get(handle).unwrap();
    location.expect("uniform was resolved").0
}

#[test]
fn test_uniform_matrix_reads_sixteen_floats() {
    let mut h = Harness::new();
    let program = h.linked_program(VS, FS);
    let (ptr, len) = h.string(1000, "u_mvp");
    let mvp: u32 = h
        .call("glGetUniformLocation_", (program, ptr, len))
        .unwrap();

    let identity: Vec<f32> = (0..16)
        .map(|i| if i % 5 == 0 { 1.0 } else { 0.0 })
        .collect();
    let bytes: Vec<u8> = identity.iter().flat_map(|f| f.to_le_bytes()).collect();
    h.write(2048, &bytes);
    h.take_calls();

    h.call::<_, ()>("glUniformMatrix4fv", (mvp, 1u32, 0u32, 2048u32))
        .unwrap();
    let location = uniform_object(&h, mvp);
    assert_eq!(
        h.take_calls(),
        vec![GlCall::Uniform {
            location,
            value: UniformValue::Mat4 {
                transpose: false,
                data: identity,
            },
        }]
    );
}

#[test]
fn test_unknown_uniform_handle_traps() {
    let mut h = Harness::new();
    assert!(h.call::<_, ()>("glUniform1f", (7u32, 1.0f32)).is_err());
    assert!(h.call::<_, ()>("glUniform1i", (NULL_HANDLE, 1i32)).is_err());
}

// ============================================================================
// Handle tables
// ============================================================================

#[test]
fn test_handles_are_never_reused() {
    let mut h = Harness::new();
    let a: u32 = h.call("glCreateBuffer", ()).unwrap();
    let b: u32 = h.call("glCreateBuffer", ()).unwrap();
    h.call::<_, ()>("glDeleteBuffer", a).unwrap();
    let c: u32 = h.call("glCreateBuffer", ()).unwrap();
    assert_eq!((a, b, c), (0, 1, 2));
    assert_eq!(h.gl().buffers.live(), 2);
}

#[test]
fn test_deleted_handle_traps() {
    let mut h = Harness::new();
    let texture: u32 = h.call("glCreateTexture", ()).unwrap();
    h.call::<_, ()>("glDeleteTexture", texture).unwrap();

    let err = h
        .call::<_, ()>("glBindTexture", (TEXTURE_2D, texture))
        .unwrap_err();
    assert!(format!("{err:?}").contains("deleted"));
    assert!(h.call::<_, ()>("glDeleteTexture", texture).is_err());
    assert!(h.call::<_, ()>("glBindTexture", (TEXTURE_2D, 99u32)).is_err());
}

#[test]
fn test_delete_only_touches_its_own_kind() {
    let mut h = Harness::new();
    let shader = h.shader(VERTEX_SHADER, VS);
    let texture: u32 = h.call("glCreateTexture", ()).unwrap();
    let program: u32 = h.call("glCreateProgram", ()).unwrap();
    let framebuffer: u32 = h.call("glCreateFramebuffer", ()).unwrap();
    let vertex_array: u32 = h.call("glCreateVertexArray", ()).unwrap();
    assert_eq!((shader, texture, program, framebuffer, vertex_array), (0, 0, 0, 0, 0));

    h.take_calls();
    h.call::<_, ()>("glDeleteTexture", texture).unwrap();
    assert!(matches!(
        h.take_calls().as_slice(),
        [GlCall::Delete { kind: "texture", .. }]
    ));

    // Handle 0 of every other kind is untouched
    h.call::<_, ()>("glCompileShader", shader).unwrap();
    h.call::<_, ()>("glLinkProgram", program).unwrap();
    h.call::<_, ()>("glBindFramebuffer", (FRAMEBUFFER, framebuffer))
        .unwrap();
    h.call::<_, ()>("glBindVertexArray", vertex_array).unwrap();

    h.call::<_, ()>("glDeleteShader", shader).unwrap();
    h.call::<_, ()>("glDeleteProgram", program).unwrap();
    h.call::<_, ()>("glDeleteFramebuffer", framebuffer).unwrap();
    h.call::<_, ()>("glDeleteVertexArray", vertex_array).unwrap();
    let live: Vec<usize> = h.gl().live_counts().iter().map(|(_, n)| *n).collect();
    assert_eq!(live, vec![0; 7]);
}

#[test]
fn test_null_handle_binds_no_object() {
    let mut h = Harness::new();
    let framebuffer: u32 = h.call("glCreateFramebuffer", ()).unwrap();
    let texture: u32 = h.call("glCreateTexture", ()).unwrap();
    h.call::<_, ()>("glBindFramebuffer", (FRAMEBUFFER, framebuffer))
        .unwrap();
    assert_eq!(
        h.call::<_, u32>("glCheckFramebufferStatus", FRAMEBUFFER)
            .unwrap(),
        FRAMEBUFFER_INCOMPLETE_ATTACHMENT
    );
    h.call::<_, ()>(
        "glFramebufferTexture2D",
        (FRAMEBUFFER, COLOR_ATTACHMENT0, TEXTURE_2D, texture, 0i32),
    )
    .unwrap();
    assert_eq!(
        h.call::<_, u32>("glCheckFramebufferStatus", FRAMEBUFFER)
            .unwrap(),
        FRAMEBUFFER_COMPLETE
    );
    h.call::<_, ()>(
        "glFramebufferTexture2D",
        (FRAMEBUFFER, COLOR_ATTACHMENT0, TEXTURE_2D, NULL_HANDLE, 0i32),
    )
    .unwrap();
    h.take_calls();

    h.call::<_, ()>("glBindFramebuffer", (FRAMEBUFFER, NULL_HANDLE))
        .unwrap();
    h.call::<_, ()>("glBindBuffer", (ARRAY_BUFFER, NULL_HANDLE))
        .unwrap();
    h.call::<_, ()>("glBindTexture", (TEXTURE_2D, NULL_HANDLE))
        .unwrap();
    h.call::<_, ()>("glBindVertexArray", NULL_HANDLE).unwrap();
    h.call::<_, ()>("glUseProgram", NULL_HANDLE).unwrap();
    assert!(
        h.take_calls()
            .iter()
            .all(|call| matches!(call, GlCall::Bind { id: None, .. }))
    );

    // Only binds accept the null handle
    assert!(h.call::<_, ()>("glCompileShader", NULL_HANDLE).is_err());
    assert!(h.call::<_, ()>("glDeleteBuffer", NULL_HANDLE).is_err());
}

#[test]
fn test_state_calls_reach_backend() {
    let mut h = Harness::new();
    h.call::<_, ()>("glViewport", (0i32, 0i32, 320i32, 240i32))
        .unwrap();
    h.call::<_, ()>("glClearColor", (0.0f32, 0.0f32, 0.0f32, 1.0f32))
        .unwrap();
    h.call::<_, ()>("glDepthMask", 0u32).unwrap();
    h.call::<_, ()>("glDrawArrays", (4u32, 0i32, 6i32)).unwrap();
    h.call::<_, ()>("glDrawElements", (4u32, 6i32, UNSIGNED_SHORT, 0i32))
        .unwrap();

    assert_eq!(h.gl().backend.draw_calls(), 2);
    assert_eq!(
        h.gl().backend.calls()[..3],
        [
            GlCall::State {
                name: "viewport",
                args: vec![0.0, 0.0, 320.0, 240.0],
            },
            GlCall::State {
                name: "clearColor",
                args: vec![0.0, 0.0, 0.0, 1.0],
            },
            GlCall::State {
                name: "depthMask",
                args: vec![0.0],
            },
        ]
    );
}

// ============================================================================
// Storage
// ============================================================================

fn set_item(h: &mut Harness, import: &str, name: &str, value: &[u8]) {
    let (name_ptr, name_len) = h.string(0, name);
    h.write(256, value);
    h.call::<_, ()>(import, (name_ptr, name_len, 256u32, value.len() as u32))
        .unwrap();
}

fn get_item(h: &mut Harness, import: &str, name: &str, dest: u32, cap: u32) -> i32 {
    let (name_ptr, name_len) = h.string(0, name);
    h.call(import, (name_ptr, name_len, dest, cap)).unwrap()
}

#[test]
fn test_storage_round_trip_with_embedded_zeros() {
    let mut h = Harness::new();
    set_item(&mut h, "setLocalStorage", "hiscore", &[7, 0, 0, 3, 0]);
    assert_eq!(get_item(&mut h, "getLocalStorage", "hiscore", 1024, 16), 5);
    assert_eq!(h.read(1024, 5), [7, 0, 0, 3, 0]);
}

#[test]
fn test_storage_get_is_three_way() {
    let mut h = Harness::new();
    set_item(&mut h, "setLocalStorage", "save", &[1, 2, 3, 4]);

    assert_eq!(get_item(&mut h, "getLocalStorage", "absent", 1024, 16), 0);
    assert_eq!(get_item(&mut h, "getLocalStorage", "save", 1024, 4), 4);
    assert_eq!(get_item(&mut h, "getLocalStorage", "save", 1024, 3), -1);
    // Destination past the end of memory is a -1, not a trap
    assert_eq!(get_item(&mut h, "getLocalStorage", "save", 65534, 16), -1);
}

#[test]
fn test_storage_get_checks_whole_destination() {
    let mut h = Harness::new();
    set_item(&mut h, "setLocalStorage", "save", &[1, 2, 3, 4]);

    // The value fits in memory but the declared capacity runs past the end
    assert_eq!(get_item(&mut h, "getLocalStorage", "save", 65530, 16), -1);
    assert_eq!(h.read(65530, 4), [0, 0, 0, 0]);
    assert_eq!(get_item(&mut h, "getLocalStorage", "absent", 65530, 16), -1);

    // A destination ending exactly at the end of memory is fine
    assert_eq!(get_item(&mut h, "getLocalStorage", "save", 65530, 6), 4);
    assert_eq!(h.read(65530, 4), [1, 2, 3, 4]);
}

#[test]
fn test_storage_empty_value_reads_as_zero_length() {
    let mut h = Harness::new();
    set_item(&mut h, "setLocalStorage", "empty", &[]);
    assert_eq!(get_item(&mut h, "getLocalStorage", "empty", 1024, 16), 0);
    assert_eq!(h.store.data().storage.get_item("empty"), Some(Vec::new()));
}

#[test]
fn test_storage_legacy_aliases_share_entries() {
    let mut h = Harness::new();
    set_item(&mut h, "setLocalStorage_", "legacy", b"abc");
    assert_eq!(get_item(&mut h, "getLocalStorage", "legacy", 1024, 16), 3);
    set_item(&mut h, "setLocalStorage", "current", b"de");
    assert_eq!(get_item(&mut h, "getLocalStorage_", "current", 1024, 16), 2);
    assert_eq!(h.read(1024, 2), b"de");
}

#[test]
fn test_storage_name_must_be_utf8() {
    let mut h = Harness::new();
    h.write(0, &[0xFF, 0xFE]);
    assert!(
        h.call::<_, i32>("getLocalStorage", (0u32, 2u32, 1024u32, 16u32))
            .is_err()
    );
}

// ============================================================================
// Assets
// ============================================================================

fn with_assets(h: &mut Harness) {
    let assets = vec![
        ("assets/a.wav".to_string(), vec![1u8; 100]),
        ("assets/b.wav".to_string(), vec![2u8; 300]),
    ];
    let table = install_assets(&mut h.store, h.memory, &assets).unwrap();
    h.store.data_mut().assets = table;
}

#[test]
fn test_get_asset_writes_out_params() {
    let mut h = Harness::new();
    with_assets(&mut h);

    let (ptr, len) = h.string(0, "assets/b.wav");
    let found: u32 = h.call("getAsset", (ptr, len, 64u32, 68u32)).unwrap();
    assert_eq!(found, 1);
    assert_eq!(h.read(64, 4), 65636u32.to_le_bytes());
    assert_eq!(h.read(68, 4), 300u32.to_le_bytes());
    assert_eq!(h.read(65636, 3), [2, 2, 2]);
}

#[test]
fn test_get_asset_missing_returns_zero() {
    let mut h = Harness::new();
    with_assets(&mut h);
    let (ptr, len) = h.string(0, "assets/c.wav");
    let found: u32 = h.call("getAsset", (ptr, len, 64u32, 68u32)).unwrap();
    assert_eq!(found, 0);
}

#[test]
fn test_legacy_asset_lookups() {
    let mut h = Harness::new();
    with_assets(&mut h);

    let (ptr, len) = h.string(0, "assets/a.wav");
    assert_eq!(h.call::<_, u32>("getAssetPtr_", (ptr, len)).unwrap(), 65536);
    assert_eq!(h.call::<_, u32>("getAssetLen_", (ptr, len)).unwrap(), 100);

    let (ptr, len) = h.string(0, "assets/zzz.wav");
    let err = h.call::<_, u32>("getAssetPtr_", (ptr, len)).unwrap_err();
    assert!(format!("{err:?}").contains("assets/zzz.wav"));
    assert!(h.call::<_, u32>("getAssetLen_", (ptr, len)).is_err());
}

// ============================================================================
// System
// ============================================================================

#[test]
fn test_random_seed_range() {
    let mut h = Harness::new();
    for _ in 0..200 {
        let seed: i32 = h.call("getRandomSeed", ()).unwrap();
        assert!((0..i32::MAX).contains(&seed));
    }
}

#[test]
fn test_console_log_never_traps() {
    let mut h = Harness::new();
    let (ptr, len) = h.string(0, "hello from the game");
    h.call::<_, ()>("consoleLog", (ptr, len)).unwrap();
    h.call::<_, ()>("consoleLog_", (ptr, len)).unwrap();

    h.write(0, &[b'o', 0xFF, b'k']);
    h.call::<_, ()>("consoleLog", (0u32, 3u32)).unwrap();
    // Out of range is dropped with a warning
    h.call::<_, ()>("consoleLog", (65530u32, 100u32)).unwrap();
}
