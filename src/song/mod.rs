// Song module - Data model the scheduler plays from
// Patterns of step slots, channels bound to instrument slots, slot events

pub mod event;
pub mod pattern;
pub mod song;

pub use event::{Event, EventAction, ModParam, SeqState};
pub use pattern::Pattern;
pub use song::{Song, SongError};
