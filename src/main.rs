//! Desktop entry point.
//!
//! `orrery [planets | hat | path/to/scene.toml]`, defaulting to `planets`.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use orrery_core::{App, SceneConfig};

    env_logger::init();

    let config = match std::env::args().nth(1) {
        None => SceneConfig::planets(),
        Some(path) if path.ends_with(".toml") => SceneConfig::load(&path)?,
        Some(name) => SceneConfig::preset(&name)?,
    };
    log::info!("Starting scene '{}'", config.title);

    let mut app = App::new(config)?;
    let event_loop = winit::event_loop::EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

// On the web the page calls `orrery_core::start_scene` instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
