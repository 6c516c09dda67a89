//! Host orchestration
//!
//! [`Host`] owns the game instance and every port it talks to. The lifecycle
//! is load (compile, instantiate, place assets), init (`onInit`, then the
//! default canvas scale), and then an event loop that feeds key events and
//! animation frames until the embedder stops calling.

use anyhow::{Context, Result, bail};
use wasmtime::Linker;

use crate::assets::install_assets;
use crate::audio::{AudioBridge, AudioPlatform};
use crate::capabilities::PlatformCapabilities;
use crate::config::HostConfig;
use crate::display::Display;
use crate::fetch::Bundle;
use crate::ffi::register_host_ffi;
use crate::gl::GraphicsBackend;
use crate::router::{KeyCommand, Router};
use crate::storage::StorageBridge;
use crate::wasm::{GameInstance, HostContext, WasmEngine};

/// A running (or about to run) game and its platform ports
pub struct Host<B: GraphicsBackend, A: AudioPlatform, D: Display> {
    engine: WasmEngine,
    config: HostConfig,
    capabilities: PlatformCapabilities,
    display: D,
    audio: AudioBridge<A>,
    router: Router,
    /// Store data waiting for the module; taken by [`Host::load`]
    pending: Option<HostContext<B>>,
    game: Option<GameInstance<B>>,
}

impl<B: GraphicsBackend, A: AudioPlatform, D: Display> Host<B, A, D> {
    /// Resolve platform capabilities and log them
    ///
    /// `audio_available` says whether the platform has an output device; the
    /// config can still turn audio off.
    pub fn new(
        config: HostConfig,
        backend: B,
        storage: StorageBridge,
        display: D,
        audio_platform: A,
        audio_available: bool,
    ) -> Result<Self> {
        config.validate().context("Invalid host configuration")?;

        let capabilities = PlatformCapabilities {
            graphics: true,
            audio: audio_available && config.audio.enabled,
            fullscreen: display.supports_fullscreen(),
            durable_storage: storage.is_durable(),
        };
        capabilities.report();

        let router = Router::new(
            config.display.width,
            config.display.height,
            capabilities.fullscreen,
        );

        Ok(Self {
            engine: WasmEngine::new()?,
            audio: AudioBridge::new(audio_platform, capabilities.audio),
            router,
            capabilities,
            display,
            config,
            pending: Some(HostContext::new(backend, storage)),
            game: None,
        })
    }

    /// Compile and instantiate the module, then place the bundle's assets
    pub fn load(&mut self, bundle: &Bundle) -> Result<()> {
        let module = self.engine.load_module(&bundle.module)?;
        WasmEngine::validate_module_memory(&module)?;

        let mut linker = Linker::new(self.engine.engine());
        register_host_ffi(&mut linker)?;

        let context = self.pending.take().context("A game is already loaded")?;
        let mut game = GameInstance::new(&self.engine, &module, &linker, context)?;

        let memory = game.memory();
        let assets = install_assets(game.store_mut(), memory, &bundle.assets)?;
        game.context_mut().assets = assets;

        tracing::info!("Game loaded");
        self.game = Some(game);
        Ok(())
    }

    /// Run `onInit` and apply the default canvas scale
    pub fn init(&mut self) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            bail!("No game loaded");
        };
        if !game.init()? {
            bail!("Failed to initialize game.");
        }
        self.router.set_canvas_scale(
            game,
            &mut self.display,
            self.config.display.default_scale,
        )?;
        tracing::info!("Game initialized");
        Ok(())
    }

    /// Route a key press; returns whether default handling is suppressed
    pub fn key_down(&mut self, code: u32) -> Result<bool> {
        let Some(game) = self.game.as_mut() else {
            bail!("No game loaded");
        };
        let command = self.router.key_down(game, code)?;
        match command {
            KeyCommand::ToggleSound => self.audio.request_toggle(game)?,
            KeyCommand::ToggleFullscreen => self.router.toggle_fullscreen(&mut self.display),
            KeyCommand::SetCanvasScale(scale) => {
                self.router.set_canvas_scale(game, &mut self.display, scale)?
            }
            KeyCommand::NoOp | KeyCommand::NotHandled => {}
        }
        Ok(command.prevents_default())
    }

    /// Route a key release
    pub fn key_up(&mut self, code: u32) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            bail!("No game loaded");
        };
        self.router.key_up(game, code)
    }

    /// Request a sound toggle as if the module had asked for one
    pub fn toggle_sound(&mut self) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            bail!("No game loaded");
        };
        self.audio.request_toggle(game)
    }

    /// One scheduler turn: settle display and audio transitions, draw a
    /// frame, then top up the audio output
    pub fn animation_frame(&mut self, timestamp_ms: f64) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            bail!("No game loaded");
        };
        while let Some(event) = self.display.poll_event() {
            self.router.handle_display_event(game, event)?;
        }
        self.audio.drive(game)?;
        self.router.animation_frame(game, timestamp_ms)?;
        self.audio.pump(game)?;
        Ok(())
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.game.is_some()
    }

    pub fn game(&self) -> Option<&GameInstance<B>> {
        self.game.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn audio(&self) -> &AudioBridge<A> {
        &self.audio
    }

    /// The graphics backend, whether or not a game is loaded
    ///
    /// `None` only after a load that failed past instantiation.
    pub fn backend(&self) -> Option<&B> {
        match (&self.game, &self.pending) {
            (Some(game), _) => Some(&game.context().gl.backend),
            (None, Some(context)) => Some(&context.gl.backend),
            (None, None) => None,
        }
    }
}
