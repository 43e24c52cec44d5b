// Song - Top-level song model consumed by the scheduler
// Tempo plus an ordered sequence of patterns

use crate::song::event::{Event, SeqState};
use crate::song::pattern::Pattern;

/// Errors from editor-facing model operations
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SongError {
    #[error("pattern {0} does not exist")]
    PatternOutOfRange(usize),
    #[error("channel {0} does not exist")]
    ChannelOutOfRange(usize),
    #[error("step {step} is outside the {steps}-step grid")]
    StepOutOfRange { step: usize, steps: usize },
    #[error("channel {channel} of pattern {pattern} holds {got} slots, expected {expected}")]
    ChannelShape {
        pattern: usize,
        channel: usize,
        got: usize,
        expected: usize,
    },
}

/// A song: tempo in beats per minute and an ordered pattern sequence
///
/// The scheduler treats the song as read-only apart from the events'
/// `seq.playing` flags. Edits come from the editing layer, which shares the
/// scheduler's execution context.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Song {
    /// Beats per minute
    pub tempo: f64,
    pub patterns: Vec<Pattern>,
}

impl Song {
    pub fn new(tempo: f64) -> Self {
        assert!(tempo > 0.0, "Tempo must be positive");

        Self {
            tempo,
            patterns: Vec::new(),
        }
    }

    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn pattern_mut(&mut self, index: usize) -> Option<&mut Pattern> {
        self.patterns.get_mut(index)
    }

    /// Event at a (pattern, channel, step) coordinate, if any
    pub fn event(&self, pattern: usize, channel: usize, step: usize) -> Option<&Event> {
        self.patterns.get(pattern)?.slot(channel, step)
    }

    pub fn event_mut(&mut self, pattern: usize, channel: usize, step: usize) -> Option<&mut Event> {
        self.patterns.get_mut(pattern)?.slot_mut(channel, step)
    }

    /// Duration of one pattern in seconds for the given beat amount
    pub fn pattern_seconds(&self, beat_amount: f64) -> f64 {
        60.0 / self.tempo * beat_amount
    }

    /// Place an event on the step grid, computing its timing sub-record
    ///
    /// This is the editing layer's entry point: the event's `seq` times are
    /// derived from the slot position so the scheduler can fire it without
    /// knowing the grid.
    pub fn place_event(
        &mut self,
        pattern: usize,
        channel: usize,
        step: usize,
        mut event: Event,
        beat_amount: f64,
    ) -> Result<(), SongError> {
        let seconds = self.pattern_seconds(beat_amount);
        let target = self
            .patterns
            .get_mut(pattern)
            .ok_or(SongError::PatternOutOfRange(pattern))?;

        if channel >= target.channel_count() {
            return Err(SongError::ChannelOutOfRange(channel));
        }
        if step >= target.steps() {
            return Err(SongError::StepOutOfRange {
                step,
                steps: target.steps(),
            });
        }

        let step_len = seconds / target.steps() as f64;
        event.seq = SeqState {
            start_measure: pattern,
            start_measure_offset: step as f64 * step_len,
            length: step_len,
            mp_length: step_len,
            playing: false,
        };
        target.set_slot(channel, step, Some(event));
        Ok(())
    }

    /// Recompute every event's timing sub-record for one pattern
    ///
    /// Called after a resolution change (the remap preserves step indices,
    /// not seconds) and usable after a tempo change.
    pub fn reschedule_pattern(&mut self, index: usize, beat_amount: f64) {
        let seconds = self.pattern_seconds(beat_amount);
        let Some(pattern) = self.patterns.get_mut(index) else {
            return;
        };

        let step_len = seconds / pattern.steps() as f64;
        for lane in pattern.lanes_mut() {
            for (step, slot) in lane.iter_mut().enumerate() {
                if let Some(event) = slot {
                    event.seq.start_measure = index;
                    event.seq.start_measure_offset = step as f64 * step_len;
                    event.seq.length = step_len;
                    event.seq.mp_length = step_len;
                }
            }
        }
    }

    /// Clear the transient `playing` flag on every event
    pub fn clear_playing(&mut self) {
        for pattern in &mut self.patterns {
            for lane in pattern.lanes_mut() {
                for slot in lane.iter_mut().flatten() {
                    slot.seq.playing = false;
                }
            }
        }
    }

    /// Re-check the shape invariant, for songs that arrived through
    /// deserialization rather than the constructors
    pub fn validate(&self) -> Result<(), SongError> {
        for (pattern_index, pattern) in self.patterns.iter().enumerate() {
            for channel in 0..pattern.channel_count() {
                let got = pattern.lane_len(channel).unwrap_or(0);
                if got != pattern.steps() {
                    return Err(SongError::ChannelShape {
                        pattern: pattern_index,
                        channel,
                        got,
                        expected: pattern.steps(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::event::EventAction;

    fn one_pattern_song(steps: usize) -> Song {
        let mut song = Song::new(120.0);
        song.patterns.push(Pattern::new(steps, 4));
        song
    }

    #[test]
    fn test_pattern_seconds() {
        let song = Song::new(120.0);

        // 120 BPM, 4 beats: (60 / 120) * 4 = 2 seconds per pattern
        assert_eq!(song.pattern_seconds(4.0), 2.0);
    }

    #[test]
    fn test_place_event_computes_seq_times() {
        let mut song = one_pattern_song(16);

        song.place_event(0, 1, 4, Event::note_on(60, 1), 4.0)
            .unwrap();

        let event = song.event(0, 1, 4).unwrap();
        assert_eq!(event.seq.start_measure, 0);
        // step length = 2.0s / 16 = 0.125s, step 4 starts at 0.5s
        assert_eq!(event.seq.start_measure_offset, 0.5);
        assert_eq!(event.seq.length, 0.125);
        assert_eq!(event.seq.mp_length, 0.125);
        assert!(!event.seq.playing);
    }

    #[test]
    fn test_place_event_range_errors() {
        let mut song = one_pattern_song(16);

        assert_eq!(
            song.place_event(3, 0, 0, Event::note_on(60, 0), 4.0),
            Err(SongError::PatternOutOfRange(3))
        );
        assert_eq!(
            song.place_event(0, 9, 0, Event::note_on(60, 0), 4.0),
            Err(SongError::ChannelOutOfRange(9))
        );
        assert_eq!(
            song.place_event(0, 0, 16, Event::note_on(60, 0), 4.0),
            Err(SongError::StepOutOfRange { step: 16, steps: 16 })
        );
    }

    #[test]
    fn test_reschedule_after_resize() {
        let mut song = one_pattern_song(16);
        song.place_event(0, 0, 2, Event::note_on(60, 0), 4.0)
            .unwrap();

        song.pattern_mut(0).unwrap().set_steps(32);
        song.reschedule_pattern(0, 4.0);

        // The event moved to step 4 of 32; its second stays 0.25
        let event = song.event(0, 0, 4).unwrap();
        assert_eq!(event.seq.start_measure_offset, 0.25);
        assert_eq!(event.seq.length, 0.0625);
    }

    #[test]
    fn test_clear_playing() {
        let mut song = one_pattern_song(16);
        song.place_event(0, 0, 0, Event::note_on(60, 0), 4.0)
            .unwrap();
        song.event_mut(0, 0, 0).unwrap().seq.playing = true;

        song.clear_playing();

        assert!(!song.event(0, 0, 0).unwrap().seq.playing);
    }

    #[test]
    fn test_validate_accepts_constructed_songs() {
        let mut song = one_pattern_song(16);
        song.patterns.push(Pattern::new(8, 4));

        assert_eq!(song.validate(), Ok(()));
    }

    #[test]
    fn test_event_kinds_roundtrip_through_slots() {
        let mut song = one_pattern_song(16);
        song.place_event(0, 0, 0, Event::note_on(60, 0), 4.0)
            .unwrap();
        song.place_event(0, 0, 8, Event::note_off(0), 4.0).unwrap();

        assert_eq!(song.event(0, 0, 0).unwrap().action, EventAction::NoteOn);
        assert_eq!(song.event(0, 0, 8).unwrap().action, EventAction::NoteOff);
        assert!(song.event(0, 0, 4).is_none());
    }
}
