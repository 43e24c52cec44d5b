// Command types - Communication editors/UI -> scheduler

/// Inbound transport commands
///
/// All mutators are idempotent: re-sending the current state is a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    SetPlaying(bool),
    SetLooping(bool),
    SetRecording(bool),
    SetMetronomeEnabled(bool),
    SetActivePattern(usize),
    GotoPreviousPattern,
    GotoNextPattern,
    SetCurrentStep(usize),
    SetPosition { pattern: usize, time: Option<f64> },
    SetPatternSteps { pattern: usize, steps: usize },
}

/// Clock driver notification; carries no musical state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;
