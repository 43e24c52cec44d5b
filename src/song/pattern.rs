// Pattern - One fixed-length musical bar, subdivided into step slots
// Each channel is a lane of `steps` slots, one lane per instrument slot

use crate::song::event::Event;

/// A pattern: `steps` slots per channel, one channel per instrument slot
///
/// The shape invariant is that every channel lane holds exactly `steps`
/// slots. All mutation paths preserve it; `Song::validate` re-checks it for
/// data that arrived through deserialization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pattern {
    steps: usize,
    channels: Vec<Vec<Option<Event>>>,
}

impl Pattern {
    /// Create an empty pattern with the given resolution and channel count
    pub fn new(steps: usize, channel_count: usize) -> Self {
        assert!(steps > 0, "Pattern must have at least 1 step");

        Self {
            steps,
            channels: vec![vec![None; steps]; channel_count],
        }
    }

    /// Step resolution of this pattern
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Event at a slot, if any
    pub fn slot(&self, channel: usize, step: usize) -> Option<&Event> {
        self.channels.get(channel)?.get(step)?.as_ref()
    }

    pub fn slot_mut(&mut self, channel: usize, step: usize) -> Option<&mut Event> {
        self.channels.get_mut(channel)?.get_mut(step)?.as_mut()
    }

    /// Replace a slot wholesale (whole-slot replacement keeps concurrent
    /// readers consistent, see the shared-resource policy)
    pub fn set_slot(&mut self, channel: usize, step: usize, event: Option<Event>) {
        assert!(channel < self.channels.len(), "channel out of range");
        assert!(step < self.steps, "step out of range");
        self.channels[channel][step] = event;
    }

    pub fn clear_slot(&mut self, channel: usize, step: usize) {
        self.set_slot(channel, step, None);
    }

    pub fn lanes(&self) -> impl Iterator<Item = &[Option<Event>]> {
        self.channels.iter().map(|lane| lane.as_slice())
    }

    pub fn lanes_mut(&mut self) -> impl Iterator<Item = &mut [Option<Event>]> {
        self.channels.iter_mut().map(|lane| lane.as_mut_slice())
    }

    /// Lane length check, used by `Song::validate`
    pub fn lane_len(&self, channel: usize) -> Option<usize> {
        self.channels.get(channel).map(|lane| lane.len())
    }

    /// Change the step resolution, resampling the musical content
    ///
    /// Decimating (`new < old`) keeps every `old/new`-th slot and drops the
    /// content in between. Expanding (`new >= old`) spreads the old slots
    /// onto the wider grid, leaving the slots in between empty. Division is
    /// integer truncation, so non-multiple resolutions are tolerated.
    pub fn set_steps(&mut self, new_steps: usize) {
        assert!(new_steps > 0, "Pattern must have at least 1 step");

        let old_steps = self.steps;
        if new_steps == old_steps {
            return;
        }

        for lane in &mut self.channels {
            let old = std::mem::replace(lane, vec![None; new_steps]);
            if new_steps < old_steps {
                let k = old_steps / new_steps;
                for (i, slot) in lane.iter_mut().enumerate() {
                    *slot = old[i * k];
                }
            } else {
                let k = new_steps / old_steps;
                for (i, event) in old.into_iter().enumerate() {
                    lane[i * k] = event;
                }
            }
        }

        self.steps = new_steps;
    }
}
