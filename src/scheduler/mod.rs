// Scheduler module - Lookahead playback engine
// Clock driver, voice queues, transport cursor, collect/step core

pub mod clock;
pub mod core;
pub mod metronome;
pub mod transport;
pub mod voice_queue;

pub use clock::ClockDriver;
pub use core::{PlayPosition, Scheduler};
pub use metronome::{ClickTrack, ClickType, Metronome, NullMetronome};
pub use transport::Transport;
pub use voice_queue::{VoiceQueue, VoiceSlot};

/// Number of instrument slots, and therefore channels per pattern
pub const INSTRUMENT_AMOUNT: usize = 8;

/// Lookahead horizon in seconds
pub const SCHEDULE_AHEAD_TIME: f64 = 0.2;

/// Default step resolution of the advancement grid
pub const STEP_PRECISION: usize = 64;

/// Beats per pattern
pub const BEAT_AMOUNT: f64 = 4.0;

/// Metronome accent pattern: clicks per beat
pub const METRONOME_SUBDIVISION: u32 = 2;
