// Messaging module - Command and tick plumbing between contexts

pub mod channels;
pub mod command;

pub use channels::{create_command_channel, create_tick_channel};
pub use command::{Tick, TransportCommand};
