#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use swarm_core::{Preset, SwarmConfig, SwarmEngine};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod renderer;
mod ui;

use constants::*;

fn preset_for(canvas: &web::HtmlCanvasElement) -> Preset {
    match canvas.get_attribute(PRESET_ATTRIBUTE) {
        Some(name) => input::parse_preset(&name).unwrap_or_else(|| {
            log::warn!("unknown preset {:?}, using swarm", name);
            Preset::Swarm
        }),
        None => Preset::Swarm,
    }
}

/// Fetch the head mesh the page provides and hand it to the engine. A
/// failure leaves the particle system uninitialised.
fn spawn_head_mesh_load(engine: Rc<RefCell<SwarmEngine>>) {
    spawn_local(async move {
        let mesh = renderer::load_head_mesh().await;
        if let Err(e) = engine.borrow_mut().install_head_mesh(mesh) {
            log::error!("head mesh unavailable: {}", e);
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("swarm-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = dom::element_by_id(&document, CANVAS_ID)?;
    let audio: web::HtmlAudioElement = dom::element_by_id(&document, AUDIO_ELEMENT_ID)?;
    let button: web::HtmlButtonElement = dom::element_by_id(&document, PLAY_BUTTON_ID)?;
    let status: web::HtmlElement = dom::element_by_id(&document, STATUS_ID)?;

    let config = SwarmConfig::from_preset(preset_for(&canvas));
    let wants_head = config.head.is_some();
    let engine = SwarmEngine::new(config)?;
    let engine = Rc::new(RefCell::new(engine));

    if wants_head {
        spawn_head_mesh_load(engine.clone());
    }

    let graph = Rc::new(RefCell::new(None));
    events::wire_all(&events::Wiring {
        engine: engine.clone(),
        graph: graph.clone(),
        audio: audio.clone(),
        canvas,
        button: button.clone(),
    });

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        engine,
        graph,
        audio,
        button,
        status,
        sink: renderer::JsUniformSink::new(),
        particles_uploaded: false,
        last_status: String::new(),
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
