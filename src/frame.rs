use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use swarm_core::{FrameInput, SwarmEngine};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::audio::AudioGraph;
use crate::renderer::JsUniformSink;
use crate::ui;

pub struct FrameContext {
    pub engine: Rc<RefCell<SwarmEngine>>,
    pub graph: Rc<RefCell<Option<AudioGraph>>>,
    pub audio: web::HtmlAudioElement,
    pub button: web::HtmlButtonElement,
    pub status: web::HtmlElement,
    pub sink: JsUniformSink,
    pub particles_uploaded: bool,
    pub last_status: String,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;
        let playback_sec = self.audio.current_time() as f32;

        let mut engine = self.engine.borrow_mut();
        {
            let mut graph = self.graph.borrow_mut();
            let spectrum = graph.as_mut().map(|g| g.snapshot());
            let ticked = engine
                .tick(FrameInput {
                    dt_sec,
                    playback_sec,
                    spectrum,
                })
                .map(|_| ());
            match ticked {
                Ok(_) => engine.publish(&mut self.sink),
                Err(e) => log::warn!("[frame] skipped: {}", e),
            }
        }

        if !self.particles_uploaded {
            if let Some(particles) = engine.particles() {
                self.particles_uploaded = self.sink.upload_particles(particles);
            }
        }

        while let Some(signal) = engine.pop_signal() {
            log::info!("[frame] lifecycle {:?}", signal);
            ui::apply_signal(&self.button, signal);
        }

        if engine.status() != self.last_status {
            self.last_status.clear();
            self.last_status.push_str(engine.status());
            ui::set_status(&self.status, &self.last_status);
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
