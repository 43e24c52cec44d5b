// Audio module - Backend-facing seam
// The rendering backend itself lives outside this crate

pub mod sink;

pub use sink::{AudioSink, NullSink};
