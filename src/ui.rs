use swarm_core::LifecycleSignal;
use web_sys as web;

use crate::input::button_label;

/// Reflect a lifecycle signal on the play button.
pub fn apply_signal(button: &web::HtmlButtonElement, signal: LifecycleSignal) {
    button.set_text_content(Some(button_label(signal)));
    button.set_disabled(false);
    _ = button.set_attribute("data-state", &format!("{:?}", signal).to_ascii_lowercase());
}

/// Disable the button while the audio context is activating.
pub fn set_activating(button: &web::HtmlButtonElement) {
    button.set_disabled(true);
    button.set_text_content(Some("Starting..."));
}

#[inline]
pub fn set_status(el: &web::HtmlElement, text: &str) {
    el.set_text_content(Some(text));
}
