// Transport - The musical-time cursor
// Flags and times only; all scheduling logic lives in the core

use crate::scheduler::{BEAT_AMOUNT, SCHEDULE_AHEAD_TIME, STEP_PRECISION};

/// Mutable playback cursor
///
/// Mutated exclusively from the scheduler's execution context, through the
/// transport commands. During normal play
/// `next_note_time >= measure_start_time >= first_measure_start_time`.
#[derive(Debug, Clone)]
pub struct Transport {
    pub playing: bool,
    pub looping: bool,
    pub recording: bool,
    /// Metronome audible flag
    pub metronome: bool,
    /// Count one metronome bar before a recording starts
    pub count_in: bool,
    pub count_in_complete: bool,
    /// Metronome flag as it was before the count-in forced it on
    metronome_restore: bool,

    pub active_pattern: usize,
    /// Step within the active pattern, in `[0, step_precision)`
    pub current_step: usize,

    /// Audio time at which the next step fires
    pub next_note_time: f64,
    /// Audio time at which the active pattern started
    pub measure_start_time: f64,
    /// Audio time at which pattern 0 would have started
    pub first_measure_start_time: f64,

    /// Steps per pattern on the advancement grid
    pub step_precision: usize,
    /// Beats per pattern
    pub beat_amount: f64,
    /// Lookahead horizon in seconds
    pub schedule_ahead_time: f64,
}

impl Transport {
    pub fn new() -> Self {
        Self {
            playing: false,
            looping: false,
            recording: false,
            metronome: false,
            count_in: false,
            count_in_complete: true,
            metronome_restore: false,
            active_pattern: 0,
            current_step: 0,
            next_note_time: 0.0,
            measure_start_time: 0.0,
            first_measure_start_time: 0.0,
            step_precision: STEP_PRECISION,
            beat_amount: BEAT_AMOUNT,
            schedule_ahead_time: SCHEDULE_AHEAD_TIME,
        }
    }

    /// Real-time duration of one step: `((60 / tempo) * 4) / step_precision`
    pub fn subdivision(&self, tempo: f64) -> f64 {
        ((60.0 / tempo) * 4.0) / self.step_precision as f64
    }

    /// Clock driver period: four ticks per lookahead horizon
    pub fn tick_interval_ms(&self) -> f64 {
        self.schedule_ahead_time * 1000.0 / 4.0
    }

    pub fn set_current_step(&mut self, step: usize) {
        self.current_step = step.min(self.step_precision.saturating_sub(1));
    }

    /// Arm the recording count-in: one silent bar with the metronome forced
    /// on, events suppressed until `complete_count_in`
    pub fn arm_count_in(&mut self) {
        self.count_in_complete = false;
        self.metronome_restore = self.metronome;
        self.metronome = true;
    }

    /// Count-in bar finished; restore the metronome to its previous state
    pub fn complete_count_in(&mut self) {
        self.count_in_complete = true;
        self.metronome = self.metronome_restore;
    }

    /// Abandon an unfinished count-in (transport stopped mid-bar)
    pub fn cancel_count_in(&mut self) {
        if !self.count_in_complete {
            self.complete_count_in();
        }
    }

    /// True while a count-in bar is suppressing event sequencing
    pub fn in_count_in(&self) -> bool {
        self.recording && self.count_in && !self.count_in_complete
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let transport = Transport::new();

        assert!(!transport.playing);
        assert!(!transport.looping);
        assert!(!transport.recording);
        assert_eq!(transport.active_pattern, 0);
        assert_eq!(transport.current_step, 0);
        assert_eq!(transport.step_precision, STEP_PRECISION);
        assert_eq!(transport.schedule_ahead_time, SCHEDULE_AHEAD_TIME);
    }

    #[test]
    fn test_subdivision() {
        let mut transport = Transport::new();
        transport.step_precision = 16;

        // 120 BPM: one whole note = 2.0s, 16 steps = 0.125s each
        assert_eq!(transport.subdivision(120.0), 0.125);

        transport.step_precision = 64;
        assert_eq!(transport.subdivision(120.0), 0.03125);
    }

    #[test]
    fn test_tick_interval_quarter_of_horizon() {
        let transport = Transport::new();

        // 0.2s horizon => 50ms ticks, four per horizon
        assert_eq!(transport.tick_interval_ms(), 50.0);
    }

    #[test]
    fn test_set_current_step_clamps() {
        let mut transport = Transport::new();
        transport.step_precision = 16;

        transport.set_current_step(4);
        assert_eq!(transport.current_step, 4);

        transport.set_current_step(99);
        assert_eq!(transport.current_step, 15);
    }

    #[test]
    fn test_count_in_restores_metronome() {
        let mut transport = Transport::new();
        transport.metronome = false;
        transport.recording = true;
        transport.count_in = true;

        transport.arm_count_in();
        assert!(transport.metronome);
        assert!(transport.in_count_in());

        transport.complete_count_in();
        assert!(!transport.metronome);
        assert!(!transport.in_count_in());
    }

    #[test]
    fn test_cancel_count_in_is_idempotent() {
        let mut transport = Transport::new();
        transport.metronome = true;
        transport.recording = true;
        transport.count_in = true;

        transport.arm_count_in();
        transport.cancel_count_in();
        assert!(transport.metronome);
        assert!(transport.count_in_complete);

        // Cancelling when nothing is armed changes nothing
        transport.metronome = false;
        transport.cancel_count_in();
        assert!(!transport.metronome);
    }
}
