// steptracker - Library exports for tests and the demo binary

pub mod audio;
pub mod messaging;
pub mod scheduler;
pub mod song;

// Re-export commonly used types for convenience
pub use audio::sink::{AudioSink, NullSink};
pub use messaging::channels::{create_command_channel, create_tick_channel};
pub use messaging::command::{Tick, TransportCommand};
pub use scheduler::clock::ClockDriver;
pub use scheduler::core::{PlayPosition, Scheduler};
pub use scheduler::metronome::{ClickTrack, ClickType, Metronome, NullMetronome};
pub use scheduler::transport::Transport;
pub use scheduler::{
    BEAT_AMOUNT, INSTRUMENT_AMOUNT, METRONOME_SUBDIVISION, SCHEDULE_AHEAD_TIME, STEP_PRECISION,
};
pub use song::{Event, EventAction, ModParam, Pattern, SeqState, Song, SongError};
