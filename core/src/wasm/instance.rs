//! Game instance implementation for loaded WASM modules

use anyhow::{Context, Result, bail};
use wasmtime::{Func, Instance, Linker, Module, Store, Val, ValType};

use super::engine::WasmEngine;
use super::state::HostContext;
use super::GameExports;
use crate::gl::GraphicsBackend;
use crate::memory::LinearMemory;

/// Convert a host number to whatever numeric type the export declares
fn coerce_param(ty: &ValType, value: f64) -> Result<Val> {
    Ok(match ty {
        // Wrapping like a JS ToInt32 conversion
        ValType::I32 => Val::I32(value as i64 as i32),
        ValType::I64 => Val::I64(value as i64),
        ValType::F32 => Val::F32((value as f32).to_bits()),
        ValType::F64 => Val::F64(value.to_bits()),
        other => bail!("unsupported export parameter type {other:?}"),
    })
}

fn result_as_i64(value: &Val) -> Option<i64> {
    match value {
        Val::I32(v) => Some(*v as i64),
        Val::I64(v) => Some(*v),
        Val::F32(bits) => Some(f32::from_bits(*bits) as i64),
        Val::F64(bits) => Some(f64::from_bits(*bits) as i64),
        _ => None,
    }
}

/// Exports the host calls, looked up once after instantiation
struct Exports {
    on_init: Func,
    on_animation_frame: Func,
    on_key_event: Option<Func>,
    on_key_down: Option<Func>,
    on_key_up: Option<Func>,
    on_fullscreen_change: Option<Func>,
    on_canvas_scale_change: Option<Func>,
    on_sound_enabled_change: Option<Func>,
    get_audio_buffer_size: Option<Func>,
    audio_callback: Option<Func>,
}

/// A loaded and instantiated game
pub struct GameInstance<B: GraphicsBackend> {
    store: Store<HostContext<B>>,
    /// The WASM instance.
    /// Not directly used after initialization, but must be kept alive to maintain
    /// the lifetime of exported functions and memory references.
    #[allow(dead_code)]
    instance: Instance,
    memory: LinearMemory,
    exports: Exports,
}

impl<B: GraphicsBackend> GameInstance<B> {
    /// Instantiate `module` with the host imports registered in `linker`
    pub fn new(
        engine: &WasmEngine,
        module: &Module,
        linker: &Linker<HostContext<B>>,
        context: HostContext<B>,
    ) -> Result<Self> {
        let mut store = Store::new(engine.engine(), context);

        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate WASM module")?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .map(LinearMemory::new)
            .context("Module does not export 'memory'")?;
        store.data_mut().memory = Some(memory);

        let mut func = |name: &str| instance.get_func(&mut store, name);
        let on_init = func("onInit").context("Module does not export 'onInit'")?;
        let on_animation_frame =
            func("onAnimationFrame").context("Module does not export 'onAnimationFrame'")?;
        let exports = Exports {
            on_init,
            on_animation_frame,
            on_key_event: func("onKeyEvent"),
            on_key_down: func("onKeyDown"),
            on_key_up: func("onKeyUp"),
            on_fullscreen_change: func("onFullscreenChange"),
            on_canvas_scale_change: func("onCanvasScaleChange"),
            on_sound_enabled_change: func("onSoundEnabledChange"),
            get_audio_buffer_size: func("getAudioBufferSize"),
            audio_callback: func("audioCallback"),
        };

        if exports.on_key_event.is_none()
            && (exports.on_key_down.is_none() || exports.on_key_up.is_none())
        {
            bail!("Module exports neither 'onKeyEvent' nor 'onKeyDown'/'onKeyUp'");
        }
        if exports.on_key_event.is_none() {
            tracing::info!("Module uses legacy onKeyDown/onKeyUp exports");
        }

        Ok(Self {
            store,
            instance,
            memory,
            exports,
        })
    }

    /// The store, for host-side access to the context
    pub fn store(&self) -> &Store<HostContext<B>> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<HostContext<B>> {
        &mut self.store
    }

    pub fn context(&self) -> &HostContext<B> {
        self.store.data()
    }

    pub fn context_mut(&mut self) -> &mut HostContext<B> {
        self.store.data_mut()
    }

    pub fn memory(&self) -> LinearMemory {
        self.memory
    }

    /// Call an export, coercing `args` to its declared parameter types
    fn call(&mut self, func: Func, name: &str, args: &[f64]) -> Result<Option<Val>> {
        let ty = func.ty(&self.store);
        if ty.params().len() != args.len() {
            bail!(
                "WASM {name}() takes {} parameters, host passes {}",
                ty.params().len(),
                args.len()
            );
        }
        let params = ty
            .params()
            .zip(args)
            .map(|(ty, &arg)| coerce_param(&ty, arg))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("WASM {name}() has an incompatible signature"))?;
        let mut results = vec![Val::I32(0); ty.results().len()];

        func.call(&mut self.store, &params, &mut results)
            .map_err(|e| {
                let error_msg = format!("WASM {name}() failed: {e:#}");
                tracing::error!("{}", error_msg);
                anyhow::anyhow!(error_msg)
            })?;
        Ok(results.into_iter().next())
    }

    /// Call an export that returns a number
    fn call_numeric(&mut self, func: Func, name: &str, args: &[f64]) -> Result<i64> {
        self.call(func, name, args)?
            .as_ref()
            .and_then(result_as_i64)
            .with_context(|| format!("WASM {name}() did not return a number"))
    }

    /// Call the game's onInit function; false means the game refused to start
    pub fn init(&mut self) -> Result<bool> {
        let on_init = self.exports.on_init;
        let result = self.call(on_init, "onInit", &[])?;
        Ok(result.as_ref().and_then(result_as_i64).unwrap_or(0) != 0)
    }

    /// Whether the module uses the legacy per-direction key exports
    pub fn has_legacy_key_exports(&self) -> bool {
        self.exports.on_key_event.is_none()
    }

    fn call_optional(&mut self, func: Option<Func>, name: &str, args: &[f64]) -> Result<()> {
        match func {
            Some(func) => self.call(func, name, args).map(|_| ()),
            None => {
                tracing::debug!("Module does not export {name}; skipping");
                Ok(())
            }
        }
    }
}

impl<B: GraphicsBackend> GameExports for GameInstance<B> {
    fn on_key_event(&mut self, code: u32, pressed: bool) -> Result<Option<i32>> {
        if let Some(on_key_event) = self.exports.on_key_event {
            let result = self.call_numeric(
                on_key_event,
                "onKeyEvent",
                &[code as f64, pressed as u8 as f64],
            )?;
            return Ok(Some(result as i32));
        }
        let (func, name) = if pressed {
            (self.exports.on_key_down, "onKeyDown")
        } else {
            (self.exports.on_key_up, "onKeyUp")
        };
        self.call_optional(func, name, &[code as f64])?;
        Ok(None)
    }

    fn on_animation_frame(&mut self, timestamp_ms: f64) -> Result<()> {
        let func = self.exports.on_animation_frame;
        self.call(func, "onAnimationFrame", &[timestamp_ms])
            .map(|_| ())
    }

    fn on_fullscreen_change(&mut self, is_fullscreen: bool) -> Result<()> {
        let func = self.exports.on_fullscreen_change;
        self.call_optional(func, "onFullscreenChange", &[is_fullscreen as u8 as f64])
    }

    fn on_canvas_scale_change(&mut self, scale: u32) -> Result<()> {
        let func = self.exports.on_canvas_scale_change;
        self.call_optional(func, "onCanvasScaleChange", &[scale as f64])
    }

    fn on_sound_enabled_change(&mut self, enabled: bool) -> Result<()> {
        let func = self.exports.on_sound_enabled_change;
        self.call_optional(func, "onSoundEnabledChange", &[enabled as u8 as f64])
    }

    fn audio_buffer_size(&mut self) -> Result<Option<u32>> {
        let Some(func) = self.exports.get_audio_buffer_size else {
            return Ok(None);
        };
        let size = self.call_numeric(func, "getAudioBufferSize", &[])?;
        let size = u32::try_from(size)
            .with_context(|| format!("getAudioBufferSize() returned {size}"))?;
        Ok(Some(size))
    }

    fn audio_callback(&mut self, sample_rate: u32, sample_count: u32) -> Result<Vec<f32>> {
        let func = self
            .exports
            .audio_callback
            .context("Module does not export 'audioCallback'")?;
        let ptr = self.call_numeric(func, "audioCallback", &[sample_rate as f64])?;
        // The callback may have grown memory; read through a fresh view
        let samples = self
            .memory
            .read_f32s(&self.store, ptr as u32, sample_count)
            .context("audioCallback() returned an invalid sample buffer")?;
        Ok(samples)
    }
}
