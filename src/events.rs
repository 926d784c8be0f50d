use std::cell::RefCell;
use std::rc::Rc;

use swarm_core::{PlaybackState, SwarmEngine};
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use crate::audio::{self, AudioGraph};
use crate::dom;
use crate::input::{self, DragTracker};
use crate::ui;

/// Handles shared between the listeners and the frame loop.
#[derive(Clone)]
pub struct Wiring {
    pub engine: Rc<RefCell<SwarmEngine>>,
    pub graph: Rc<RefCell<Option<AudioGraph>>>,
    pub audio: web::HtmlAudioElement,
    pub canvas: web::HtmlCanvasElement,
    pub button: web::HtmlButtonElement,
}

pub fn wire_all(w: &Wiring) {
    wire_camera_input(w);
    wire_play_button(w);
    wire_media_events(w);
}

fn wire_camera_input(w: &Wiring) {
    let drag = Rc::new(RefCell::new(DragTracker::default()));

    {
        let (engine, drag, canvas) = (w.engine.clone(), drag.clone(), w.canvas.clone());
        dom::add_listener(&w.canvas, "pointerdown", move |ev: web::PointerEvent| {
            let started = drag
                .borrow_mut()
                .begin(ev.pointer_id(), ev.client_x() as f32, ev.client_y() as f32);
            if let Some(input) = started {
                engine.borrow_mut().push_camera_input(input);
                _ = canvas.set_pointer_capture(ev.pointer_id());
                log::debug!("[pointer] drag start");
            }
            ev.prevent_default();
        });
    }

    if let Some(window) = web::window() {
        {
            let (engine, drag) = (w.engine.clone(), drag.clone());
            dom::add_listener(&window, "pointermove", move |ev: web::PointerEvent| {
                let moved = drag
                    .borrow_mut()
                    .move_to(ev.pointer_id(), ev.client_x() as f32, ev.client_y() as f32);
                if let Some(input) = moved {
                    engine.borrow_mut().push_camera_input(input);
                }
            });
        }
        for name in ["pointerup", "pointercancel"] {
            let (engine, drag) = (w.engine.clone(), drag.clone());
            dom::add_listener(&window, name, move |ev: web::PointerEvent| {
                if let Some(input) = drag.borrow_mut().end(ev.pointer_id()) {
                    engine.borrow_mut().push_camera_input(input);
                    log::debug!("[pointer] drag end");
                }
            });
        }
    }

    let engine = w.engine.clone();
    dom::add_listener(&w.canvas, "wheel", move |ev: web::WheelEvent| {
        ev.prevent_default();
        let delta = input::normalize_wheel(ev.delta_y(), ev.delta_mode());
        if delta != 0.0 {
            engine
                .borrow_mut()
                .push_camera_input(swarm_core::CameraInput::Wheel { delta });
        }
    });
}

fn wire_play_button(w: &Wiring) {
    let w2 = w.clone();
    dom::add_click_listener(&w.button, move || {
        let w = w2.clone();
        let state = w.engine.borrow().state();
        if state == PlaybackState::Playing {
            _ = w.audio.pause();
            return;
        }
        if !w.engine.borrow_mut().request_play() {
            return;
        }
        ui::set_activating(&w.button);

        // the graph has to be created inside the gesture
        if w.graph.borrow().is_none() {
            match AudioGraph::connect(&w.audio) {
                Ok(graph) => *w.graph.borrow_mut() = Some(graph),
                Err(e) => {
                    w.engine.borrow_mut().activation_failed(e.to_string());
                    return;
                }
            }
        }
        let ctx = w.graph.borrow().as_ref().map(|g| g.ctx.clone());

        spawn_local(async move {
            match audio::activate(ctx.as_ref(), &w.audio).await {
                Ok(()) => w.engine.borrow_mut().activation_succeeded(),
                Err(e) => {
                    log::error!("[audio] activation failed: {:?}", e);
                    w.engine.borrow_mut().activation_failed(e.to_string());
                }
            }
        });
    });
}

fn wire_media_events(w: &Wiring) {
    let engine = w.engine.clone();
    dom::add_listener(&w.audio, "pause", move |_: web::Event| {
        engine.borrow_mut().pause();
    });
    let engine = w.engine.clone();
    dom::add_listener(&w.audio, "ended", move |_: web::Event| {
        engine.borrow_mut().track_ended();
    });
}
