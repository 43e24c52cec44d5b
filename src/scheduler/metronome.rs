// Metronome - Click scheduling against the step grid
// Click synthesis belongs to the audio backend; only timing lives here

/// Metronome click type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    /// Click on the beat (downbeat accent)
    Accent,
    /// Click on a sub-beat
    Regular,
}

/// Consumer of metronome ticks
///
/// Called once per scheduled step while the metronome is audible, with the
/// accent pattern (`subdivision` clicks per beat), the step position, and
/// the audio time the step fires at.
pub trait Metronome {
    fn play(&mut self, subdivision: u32, current_step: usize, step_precision: usize, at: f64);
}

/// Metronome that swallows every tick
#[derive(Debug, Default)]
pub struct NullMetronome;

impl Metronome for NullMetronome {
    fn play(&mut self, _subdivision: u32, _current_step: usize, _step_precision: usize, _at: f64) {}
}

/// Decide whether a step carries a click, and of which kind
///
/// The step grid covers four beats; a step on the beat is an accent, a step
/// on one of the `subdivision` divisions of the beat is a regular click,
/// anything else is silent.
pub fn classify(subdivision: u32, current_step: usize, step_precision: usize) -> Option<ClickType> {
    let steps_per_beat = step_precision / 4;
    if steps_per_beat == 0 {
        return None;
    }
    if current_step % steps_per_beat == 0 {
        return Some(ClickType::Accent);
    }

    let steps_per_click = (steps_per_beat / subdivision.max(1) as usize).max(1);
    if current_step % steps_per_click == 0 {
        Some(ClickType::Regular)
    } else {
        None
    }
}

/// Default metronome: classifies each step and hands audible clicks to a
/// caller-supplied handler (a click-sample trigger, a console printer, ...)
pub struct ClickTrack<F: FnMut(ClickType, f64)> {
    handler: F,
}

impl<F: FnMut(ClickType, f64)> ClickTrack<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F: FnMut(ClickType, f64)> Metronome for ClickTrack<F> {
    fn play(&mut self, subdivision: u32, current_step: usize, step_precision: usize, at: f64) {
        if let Some(click) = classify(subdivision, current_step, step_precision) {
            (self.handler)(click, at);
        }
    }
}
