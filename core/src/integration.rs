//! End-to-end tests: a small WAT game driven through [`Host`]

use crate::audio::AudioState;
use crate::config::HostConfig;
use crate::display::HeadlessDisplay;
use crate::fetch::{Bundle, Location, fetch_bundle};
use crate::gl::{GlCall, HeadlessGl};
use crate::host::Host;
use crate::memory::WASM_PAGE_SIZE;
use crate::storage::StorageBridge;
use crate::test_utils::FakeAudioPlatform;

/// Observed state lives at fixed addresses:
/// 0 scale, 4 fullscreen, 8 sound, 12 frame count,
/// 16/20 a.wav ptr/len, 24/28 b.wav ptr/len, 32 run counter
const GAME: &str = r#"
(module
    (import "env" "getAsset" (func $getAsset (param i32 i32 i32 i32) (result i32)))
    (import "env" "consoleLog" (func $log (param i32 i32)))
    (import "env" "setLocalStorage" (func $set (param i32 i32 i32 i32)))
    (import "env" "getLocalStorage" (func $get (param i32 i32 i32 i32) (result i32)))
    (import "env" "glClear" (func $clear (param i32)))
    (memory (export "memory") 1)
    (data (i32.const 64) "assets/a.wav")
    (data (i32.const 80) "assets/b.wav")
    (data (i32.const 96) "booted")
    (data (i32.const 112) "runs")

    (func (export "onInit") (result i32)
        (call $log (i32.const 96) (i32.const 6))
        (if (i32.eqz (call $getAsset (i32.const 64) (i32.const 12) (i32.const 16) (i32.const 20)))
            (then (return (i32.const 0))))
        (if (i32.eqz (call $getAsset (i32.const 80) (i32.const 12) (i32.const 24) (i32.const 28)))
            (then (return (i32.const 0))))
        (drop (call $get (i32.const 112) (i32.const 4) (i32.const 32) (i32.const 4)))
        (i32.store (i32.const 32) (i32.add (i32.load (i32.const 32)) (i32.const 1)))
        (call $set (i32.const 112) (i32.const 4) (i32.const 32) (i32.const 4))
        (i32.const 1))

    (func (export "onKeyEvent") (param $code i32) (param $pressed i32) (result i32)
        (if (i32.eqz (local.get $pressed)) (then (return (i32.const 2))))
        (if (i32.eq (local.get $code) (i32.const 83)) (then (return (i32.const 2))))
        (if (i32.eq (local.get $code) (i32.const 70)) (then (return (i32.const 3))))
        (if (i32.eq (local.get $code) (i32.const 50)) (then (return (i32.const 102))))
        (if (i32.eq (local.get $code) (i32.const 32)) (then (return (i32.const 1))))
        (i32.const 0))

    (func (export "onAnimationFrame") (param f64)
        (call $clear (i32.const 0x4000))
        (i32.store (i32.const 12) (i32.add (i32.load (i32.const 12)) (i32.const 1))))
    (func (export "onFullscreenChange") (param $f i32)
        (i32.store (i32.const 4) (local.get $f)))
    (func (export "onCanvasScaleChange") (param $s i32)
        (i32.store (i32.const 0) (local.get $s)))
    (func (export "onSoundEnabledChange") (param $e i32)
        (i32.store (i32.const 8) (local.get $e)))
    (func (export "getAudioBufferSize") (result i32) (i32.const 256))
    (func (export "audioCallback") (param i32) (result i32) (i32.const 4096))
)
"#;

const KEY_SPACE: u32 = 32;
const KEY_TWO: u32 = 50;
const KEY_A: u32 = 65;
const KEY_F: u32 = 70;
const KEY_S: u32 = 83;

type TestHost = Host<HeadlessGl, FakeAudioPlatform, HeadlessDisplay>;

fn bundle() -> Bundle {
    Bundle {
        module: wat::parse_str(GAME).unwrap(),
        assets: vec![
            ("assets/a.wav".to_string(), vec![1u8; 100]),
            ("assets/b.wav".to_string(), vec![2u8; 70000]),
        ],
    }
}

fn host_with(storage: StorageBridge, audio_available: bool) -> TestHost {
    Host::new(
        HostConfig::default(),
        HeadlessGl::new(),
        storage,
        HeadlessDisplay::new(true),
        FakeAudioPlatform::new(44100),
        audio_available,
    )
    .unwrap()
}

fn running_host() -> TestHost {
    let mut host = host_with(StorageBridge::default(), true);
    host.load(&bundle()).unwrap();
    host.init().unwrap();
    host
}

fn read_u32(host: &TestHost, ptr: u32) -> u32 {
    let game = host.game().unwrap();
    let bytes = game.memory().read_bytes(game.store(), ptr, 4).unwrap();
    u32::from_le_bytes(bytes.try_into().unwrap())
}

#[test]
fn test_assets_land_after_initial_memory() {
    let host = running_host();
    let game = host.game().unwrap();
    assert_eq!(
        game.memory().byte_len(game.store()) as u64,
        3 * WASM_PAGE_SIZE
    );

    assert_eq!(read_u32(&host, 16), 65536);
    assert_eq!(read_u32(&host, 20), 100);
    assert_eq!(read_u32(&host, 24), 65536 + 100);
    assert_eq!(read_u32(&host, 28), 70000);

    let bytes = game.memory().read_bytes(game.store(), 65536 + 99, 2).unwrap();
    assert_eq!(bytes, [1, 2]);
}

#[test]
fn test_init_applies_default_scale() {
    let host = running_host();
    assert_eq!(host.router().scale(), 3);
    assert_eq!(host.display().canvas_size(), (960, 720));
    assert_eq!(read_u32(&host, 0), 3);
}

#[test]
fn test_init_refusal_is_fatal() {
    let mut host = host_with(StorageBridge::default(), true);
    let mut refusing = bundle();
    // b.wav is missing, so the game's getAsset check fails
    refusing.assets.pop();
    host.load(&refusing).unwrap();
    let err = host.init().unwrap_err();
    assert_eq!(err.to_string(), "Failed to initialize game.");
}

#[test]
fn test_key_results_drive_host_actions() {
    let mut host = running_host();

    assert!(host.key_down(KEY_SPACE).unwrap());
    assert!(!host.key_down(KEY_A).unwrap());

    assert!(host.key_down(KEY_TWO).unwrap());
    assert_eq!(host.router().scale(), 2);
    assert_eq!(host.display().canvas_size(), (640, 480));
    assert_eq!(read_u32(&host, 0), 2);

    // The game answers releases with "toggle sound"; releases are never acted on
    host.key_up(KEY_S).unwrap();
    assert_eq!(host.audio().state(), AudioState::Disabled);
}

#[test]
fn test_fullscreen_round_trip() {
    let mut host = running_host();

    assert!(host.key_down(KEY_F).unwrap());
    assert!(host.key_down(KEY_F).unwrap());
    assert_eq!(host.display().fullscreen_requests(), 1);
    assert!(host.router().fullscreen_waiting());

    host.animation_frame(16.0).unwrap();
    assert!(host.router().is_fullscreen());
    assert!(!host.router().fullscreen_waiting());
    assert_eq!(read_u32(&host, 4), 1);

    host.display_mut().user_exit_fullscreen();
    host.animation_frame(32.0).unwrap();
    assert!(!host.router().is_fullscreen());
    assert_eq!(read_u32(&host, 4), 0);
}

#[test]
fn test_sound_toggle_and_pump() {
    let mut host = running_host();

    host.key_down(KEY_S).unwrap();
    host.key_down(KEY_S).unwrap();
    assert_eq!(
        host.audio().state(),
        AudioState::Enabling { buffer_size: 256 }
    );

    host.animation_frame(16.0).unwrap();
    assert!(host.audio().is_enabled());
    assert_eq!(host.audio().platform().opened(), 1);
    assert_eq!(read_u32(&host, 8), 1);
    assert_eq!(host.audio().platform().queued(), 8 * 256);

    host.key_down(KEY_S).unwrap();
    host.animation_frame(32.0).unwrap();
    assert_eq!(host.audio().state(), AudioState::Disabled);
    assert_eq!(host.audio().platform().closed(), 1);
    assert_eq!(read_u32(&host, 8), 0);
}

#[test]
fn test_sound_unavailable_stays_off() {
    let mut host = host_with(StorageBridge::default(), false);
    assert!(!host.capabilities().audio);
    host.load(&bundle()).unwrap();
    host.init().unwrap();

    assert!(host.key_down(KEY_S).unwrap());
    host.animation_frame(16.0).unwrap();
    assert_eq!(host.audio().state(), AudioState::Disabled);
    assert_eq!(host.audio().platform().opened(), 0);
}

#[test]
fn test_frames_reach_the_game_and_backend() {
    let mut host = running_host();
    for frame in 0..5 {
        host.animation_frame(frame as f64 * 16.67).unwrap();
    }
    assert_eq!(read_u32(&host, 12), 5);
    let clears = host
        .backend()
        .unwrap()
        .calls()
        .iter()
        .filter(|call| matches!(call, GlCall::State { name: "clear", .. }))
        .count();
    assert_eq!(clears, 5);
}

#[test]
fn test_storage_persists_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    for expected_runs in 1..=2 {
        let storage = StorageBridge::open_or_memory(Some(path.clone()));
        let mut host = host_with(storage, true);
        assert!(host.capabilities().durable_storage);
        host.load(&bundle()).unwrap();
        host.init().unwrap();
        assert_eq!(read_u32(&host, 32), expected_runs);
    }
}

#[test]
fn test_load_twice_is_rejected() {
    let mut host = running_host();
    assert!(host.load(&bundle()).is_err());
    assert!(host.is_loaded());
}

#[test]
fn test_events_before_load_fail() {
    let mut host = host_with(StorageBridge::default(), true);
    assert!(host.init().is_err());
    assert!(host.key_down(KEY_SPACE).is_err());
    assert!(host.animation_frame(0.0).is_err());
}

#[tokio::test]
async fn test_fetched_bundle_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("game.wasm"), wat::parse_str(GAME).unwrap()).unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/a.wav"), vec![1u8; 100]).unwrap();
    std::fs::write(dir.path().join("assets/b.wav"), vec![2u8; 70000]).unwrap();

    let base = Location::Path(dir.path().to_path_buf());
    let files = vec!["assets/a.wav".to_string(), "assets/b.wav".to_string()];
    let bundle = fetch_bundle(&base.join("game.wasm"), &base, &files)
        .await
        .unwrap();

    let mut host = host_with(StorageBridge::default(), true);
    host.load(&bundle).unwrap();
    host.init().unwrap();
    assert_eq!(read_u32(&host, 24), 65636);
}
