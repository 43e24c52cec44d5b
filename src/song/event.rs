// Event - One slot entry in a pattern's step grid
// An event is either a noteOn, a noteOff, or a module-parameter change

/// What an event does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventAction {
    /// Short control-rate change that glides a module parameter (action 0)
    ModParam,
    /// Start a voice on the channel's instrument (action 1)
    NoteOn,
    /// Stop whatever the channel is sounding (action 2)
    NoteOff,
}

/// Module-parameter payload for `EventAction::ModParam` events
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModParam {
    /// Index of the module inside the instrument's synthesis graph
    pub module: u8,
    /// Target parameter value
    pub value: f32,
    /// Glide amount applied while the change is active
    pub glide: f32,
}

/// Scheduler-owned timing sub-record
///
/// Everything here except `playing` is written by the editing layer when the
/// event is placed; `playing` is transient playback state owned by the
/// scheduler and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeqState {
    /// Pattern index this event belongs to
    pub start_measure: usize,
    /// Seconds from the pattern start at which the event fires
    pub start_measure_offset: f64,
    /// Seconds the event stays within trigger range
    pub length: f64,
    /// Seconds a module-parameter change lasts
    pub mp_length: f64,
    /// True while the event is sounding (scheduler-owned)
    #[serde(skip)]
    pub playing: bool,
}

impl SeqState {
    pub fn unscheduled() -> Self {
        Self {
            start_measure: 0,
            start_measure_offset: 0.0,
            length: 0.0,
            mp_length: 0.0,
            playing: false,
        }
    }
}

/// A step-slot event
///
/// Events are created and owned by the editing layer. The scheduler reads
/// them and mutates only the `seq` sub-record.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub action: EventAction,
    /// MIDI-style pitch, consumed by the audio sink (the scheduler never
    /// interprets it)
    pub note: u8,
    /// Instrument slot this event plays on
    pub instrument: usize,
    /// Module-parameter payload, present for `ModParam` events
    pub mp: Option<ModParam>,
    /// Scheduler timing sub-record
    pub seq: SeqState,
    /// True while the user is still holding the key that created the event;
    /// such events are skipped during playback
    pub recording: bool,
}

impl Event {
    pub fn note_on(note: u8, instrument: usize) -> Self {
        assert!(note <= 127, "MIDI pitch must be 0-127");
        Self {
            action: EventAction::NoteOn,
            note,
            instrument,
            mp: None,
            seq: SeqState::unscheduled(),
            recording: false,
        }
    }

    pub fn note_off(instrument: usize) -> Self {
        Self {
            action: EventAction::NoteOff,
            note: 0,
            instrument,
            mp: None,
            seq: SeqState::unscheduled(),
            recording: false,
        }
    }

    pub fn mod_param(instrument: usize, mp: ModParam) -> Self {
        Self {
            action: EventAction::ModParam,
            note: 0,
            instrument,
            mp: Some(mp),
            seq: SeqState::unscheduled(),
            recording: false,
        }
    }

    /// True when the event is eligible for sequencing at all
    pub fn is_sequenceable(&self) -> bool {
        !self.recording
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_construction() {
        let event = Event::note_on(60, 2);

        assert_eq!(event.action, EventAction::NoteOn);
        assert_eq!(event.note, 60);
        assert_eq!(event.instrument, 2);
        assert!(event.mp.is_none());
        assert!(!event.seq.playing);
        assert!(!event.recording);
    }

    #[test]
    fn test_mod_param_construction() {
        let mp = ModParam {
            module: 3,
            value: 0.5,
            glide: 0.1,
        };
        let event = Event::mod_param(1, mp);

        assert_eq!(event.action, EventAction::ModParam);
        assert_eq!(event.mp, Some(mp));
    }

    #[test]
    fn test_recording_events_not_sequenceable() {
        let mut event = Event::note_on(60, 0);
        assert!(event.is_sequenceable());

        event.recording = true;
        assert!(!event.is_sequenceable());
    }

    #[test]
    #[should_panic(expected = "MIDI pitch must be 0-127")]
    fn test_invalid_pitch() {
        Event::note_on(128, 0);
    }
}
