//! Throttled human-readable status line for the debug overlay.

use std::fmt::{self, Write as _};

use smallvec::SmallVec;

use crate::spectrum::Band;

/// One snapshot of what the overlay shows.
#[derive(Clone, Debug, Default)]
pub struct StatusReport<'a> {
    /// Sticky messages (load or activation failures) shown first.
    pub notices: SmallVec<[&'a str; 2]>,
    /// Level in [0, 1] of each configured band, in layout order.
    pub bands: SmallVec<[(Band, f32); 5]>,
    /// `(active, capacity)` when shooting stars are enabled.
    pub stars: Option<(usize, usize)>,
    /// Head formation progress when particles converge onto a mesh.
    pub formation: Option<f32>,
}

#[inline]
fn percent(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn separator(f: &mut fmt::Formatter<'_>, first: &mut bool) -> fmt::Result {
    if std::mem::take(first) {
        Ok(())
    } else {
        f.write_str(" | ")
    }
}

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for notice in &self.notices {
            separator(f, &mut first)?;
            f.write_str(notice)?;
        }
        for (band, level) in &self.bands {
            separator(f, &mut first)?;
            write!(f, "{} {}%", band.label(), percent(*level))?;
        }
        if let Some((active, capacity)) = self.stars {
            separator(f, &mut first)?;
            write!(f, "stars {}/{}", active, capacity)?;
        }
        if let Some(formation) = self.formation {
            separator(f, &mut first)?;
            write!(f, "head {}%", percent(formation))?;
        }
        Ok(())
    }
}

/// Re-renders its text once every `every` frames; [`StatusLine::render`]
/// forces an immediate update.
#[derive(Clone, Debug)]
pub struct StatusLine {
    every: u32,
    frame: u32,
    text: String,
}

impl StatusLine {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            frame: 0,
            text: String::new(),
        }
    }

    /// Count one frame. True when the text is due for a refresh.
    pub fn advance(&mut self) -> bool {
        self.frame = (self.frame + 1) % self.every;
        self.frame == 0
    }

    pub fn render(&mut self, report: &StatusReport<'_>) {
        self.text.clear();
        // writing into a String cannot fail
        let _ = write!(self.text, "{}", report);
        log::debug!("[status] {}", self.text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
