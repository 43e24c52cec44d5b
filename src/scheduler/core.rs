// Scheduler core - Lookahead collect loop and step advancement
// Consumes clock ticks, reads the song, emits timestamped sink commands

use ringbuf::traits::Consumer;

use crate::audio::sink::AudioSink;
use crate::messaging::channels::{CommandConsumer, TickConsumer};
use crate::messaging::command::TransportCommand;
use crate::scheduler::clock::ClockDriver;
use crate::scheduler::metronome::Metronome;
use crate::scheduler::transport::Transport;
use crate::scheduler::voice_queue::{VoiceQueue, VoiceSlot};
use crate::scheduler::{INSTRUMENT_AMOUNT, METRONOME_SUBDIVISION};
use crate::song::{Event, EventAction, Song};

/// Playback position as observed by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayPosition {
    pub pattern: usize,
    pub step: usize,
}

/// The playback scheduler
///
/// Owns the song, the transport cursor, one voice queue per instrument
/// slot, the audio sink, the metronome and the clock driver handle. All
/// mutation happens on the caller's execution context; the clock thread
/// only posts ticks.
pub struct Scheduler<S: AudioSink, M: Metronome> {
    song: Song,
    transport: Transport,
    queues: Vec<VoiceQueue>,
    sink: S,
    metronome: M,
    clock: ClockDriver,
}

impl<S: AudioSink, M: Metronome> Scheduler<S, M> {
    pub fn new(song: Song, sink: S, metronome: M, clock: ClockDriver) -> Self {
        Self {
            song,
            transport: Transport::new(),
            queues: (0..INSTRUMENT_AMOUNT).map(|_| VoiceQueue::new()).collect(),
            sink,
            metronome,
            clock,
        }
    }

    // --- Tick and command intake ---------------------------------------

    /// Service one clock tick; ignored while stopped
    pub fn handle_tick(&mut self) {
        if !self.transport.playing {
            return;
        }
        self.collect();
    }

    /// Service every tick currently queued (coalesced ticks collapse into
    /// one collect pass)
    pub fn pump_ticks(&mut self, ticks: &mut TickConsumer) {
        let mut pending = false;
        while ticks.try_pop().is_some() {
            pending = true;
        }
        if pending {
            self.handle_tick();
        }
    }

    /// Apply one inbound transport command
    pub fn apply(&mut self, command: TransportCommand) {
        match command {
            TransportCommand::SetPlaying(playing) => self.set_playing(playing),
            TransportCommand::SetLooping(looping) => self.set_looping(looping),
            TransportCommand::SetRecording(recording) => self.set_recording(recording),
            TransportCommand::SetMetronomeEnabled(enabled) => self.set_metronome_enabled(enabled),
            TransportCommand::SetActivePattern(pattern) => self.set_active_pattern(pattern),
            TransportCommand::GotoPreviousPattern => self.goto_previous_pattern(),
            TransportCommand::GotoNextPattern => self.goto_next_pattern(),
            TransportCommand::SetCurrentStep(step) => self.set_current_step(step),
            TransportCommand::SetPosition { pattern, time } => self.set_position(pattern, time),
            TransportCommand::SetPatternSteps { pattern, steps } => {
                self.set_pattern_steps(pattern, steps)
            }
        }
    }

    /// Drain an editor/UI command queue
    pub fn drain(&mut self, commands: &mut CommandConsumer) {
        while let Some(command) = commands.try_pop() {
            self.apply(command);
        }
    }

    // --- Lookahead loop -------------------------------------------------

    /// Schedule everything that falls inside the lookahead horizon
    ///
    /// The pattern is rescanned on every pass rather than indexed: contents
    /// and step counts may mutate live from the editor, and the same scan
    /// clears stale `playing` flags on events whose trigger range has been
    /// exited (which is what arms them for the next loop).
    fn collect(&mut self) {
        let horizon = self.sink.current_time() + self.transport.schedule_ahead_time;

        while self.transport.playing && self.transport.next_note_time < horizon {
            if !self.transport.in_count_in() {
                let compare = self.transport.next_note_time - self.transport.measure_start_time;
                let active = self.transport.active_pattern;
                let mut due: Vec<VoiceSlot> = Vec::new();

                if let Some(pattern) = self.song.pattern_mut(active) {
                    for (channel, lane) in pattern.lanes_mut().enumerate() {
                        for (step, slot) in lane.iter_mut().enumerate() {
                            let Some(event) = slot else { continue };
                            if !event.is_sequenceable() || event.seq.start_measure != active {
                                continue;
                            }
                            let start = event.seq.start_measure_offset;
                            if compare >= start && compare < start + event.seq.length {
                                if !event.seq.playing {
                                    due.push(VoiceSlot {
                                        pattern: active,
                                        channel,
                                        step,
                                    });
                                }
                            } else {
                                event.seq.playing = false;
                            }
                        }
                    }
                }

                for voice in due {
                    self.fire_event(voice);
                }
            }

            if self.transport.metronome {
                self.metronome.play(
                    METRONOME_SUBDIVISION,
                    self.transport.current_step,
                    self.transport.step_precision,
                    self.transport.next_note_time,
                );
            }

            self.step();
        }
    }

    /// Fire the event at a slot: mark it playing, emit its noteOn, kill the
    /// channel's previous voice, and track or self-terminate it
    fn fire_event(&mut self, voice: VoiceSlot) {
        let at = self.transport.next_note_time;
        let mp_length = match self.song.pattern(voice.pattern) {
            Some(pattern) if pattern.steps() > 0 => {
                self.song.pattern_seconds(self.transport.beat_amount) / pattern.steps() as f64
            }
            _ => 0.0,
        };

        let Some(event) = self.song.event_mut(voice.pattern, voice.channel, voice.step) else {
            return;
        };
        event.seq.playing = true;
        event.seq.mp_length = mp_length;
        let fired: Event = *event;

        self.sink.note_on(&fired, fired.instrument, at);

        if fired.action != EventAction::ModParam {
            // The outgoing voices' release and the new attack share the
            // timestamp, which is what makes the handover legato
            self.drain_channel(voice.channel, at);
        }

        if fired.action == EventAction::NoteOn {
            if let Some(queue) = self.queues.get_mut(voice.channel) {
                queue.push(voice);
            }
        } else {
            // noteOff and module-parameter events self-terminate after one
            // step's worth of time and never occupy the queue
            self.sink.note_off(&fired, at + mp_length);
        }
    }

    /// Kill every voice the channel is still sounding, head first
    fn drain_channel(&mut self, channel: usize, at: f64) {
        let Some(queue) = self.queues.get_mut(channel) else {
            return;
        };
        while let Some(voice) = queue.pop_head() {
            if let Some(event) = self.song.event(voice.pattern, voice.channel, voice.step) {
                self.sink.note_off(event, at);
            }
        }
    }

    /// Advance the cursor by one step, wrapping into the next pattern at
    /// the end of the grid
    fn step(&mut self) {
        let subdivision = self.transport.subdivision(self.song.tempo);
        self.transport.next_note_time += subdivision;
        self.transport.current_step += 1;

        if self.transport.current_step < self.transport.step_precision {
            return;
        }
        self.transport.current_step = 0;

        let next_pattern = self.transport.active_pattern + 1;
        let max_pattern = self.song.patterns.len().saturating_sub(1);
        if next_pattern > max_pattern {
            self.transport.active_pattern = 0;
            if self.sink.is_recording() && !self.transport.looping {
                // The bounce reached the end of the song; stop rather than
                // write another pass into the capture
                self.set_playing(false);
                return;
            }
        } else if !self.transport.looping {
            self.transport.active_pattern = next_pattern;
        }

        let pattern = self.transport.active_pattern;
        let at = self.transport.next_note_time;
        self.set_position(pattern, Some(at));

        if self.transport.in_count_in() {
            self.transport.complete_count_in();
            self.transport.first_measure_start_time = self.sink.current_time();
            // Recording proper always begins at the song start
            self.transport.active_pattern = 0;
        }
    }

    // --- Position -------------------------------------------------------

    /// Commit the cursor to a pattern at a given audio time
    ///
    /// Jumping to pattern 0 kills every queued voice at the commit time so
    /// a reposition to the song start can never leave a stuck note.
    pub fn set_position(&mut self, pattern: usize, time: Option<f64>) {
        let max_pattern = self.song.patterns.len().saturating_sub(1);
        let pattern = pattern.min(max_pattern);

        if pattern != self.transport.active_pattern {
            self.transport.current_step = 0;
        }
        let now = time.unwrap_or_else(|| self.sink.current_time());

        self.transport.active_pattern = pattern;
        self.transport.next_note_time = now;
        self.transport.measure_start_time = now;
        self.transport.first_measure_start_time =
            now - pattern as f64 * self.song.pattern_seconds(self.transport.beat_amount);

        if pattern == 0 {
            for channel in 0..self.queues.len() {
                while let Some(voice) = self.queues[channel].pop_head() {
                    if let Some(event) =
                        self.song.event_mut(voice.pattern, voice.channel, voice.step)
                    {
                        event.seq.playing = false;
                        let released: Event = *event;
                        self.sink.note_off(&released, now);
                    }
                }
            }
        }
    }

    // --- Transport commands ---------------------------------------------

    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.transport.playing {
            return;
        }

        if playing {
            if self.transport.recording && self.transport.count_in {
                self.transport.arm_count_in();
            }
            self.transport.current_step = 0;
            self.transport.playing = true;

            let now = self.sink.current_time();
            let pattern = self.transport.active_pattern;
            self.set_position(pattern, Some(now));

            let interval_ms = self.transport.tick_interval_ms();
            self.clock.start(interval_ms);
        } else {
            self.transport.playing = false;
            self.transport.cancel_count_in();
            self.clock.stop();
            // The sink silences itself on transport stop; the queues are
            // dropped without emitting anything
            for queue in &mut self.queues {
                queue.flush();
            }
            self.song.clear_playing();
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.transport.looping = looping;
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.transport.recording = recording;
    }

    pub fn set_metronome_enabled(&mut self, enabled: bool) {
        self.transport.metronome = enabled;
    }

    pub fn set_active_pattern(&mut self, pattern: usize) {
        self.set_position(pattern, None);
    }

    pub fn goto_previous_pattern(&mut self) {
        if self.transport.active_pattern == 0 {
            return;
        }
        self.set_position(self.transport.active_pattern - 1, None);
    }

    pub fn goto_next_pattern(&mut self) {
        if self.transport.active_pattern + 1 >= self.song.patterns.len() {
            return;
        }
        self.set_position(self.transport.active_pattern + 1, None);
    }

    pub fn set_current_step(&mut self, step: usize) {
        self.transport.set_current_step(step);
    }

    /// Change a pattern's step resolution, resampling its content and
    /// recomputing the remapped events' trigger times
    pub fn set_pattern_steps(&mut self, pattern: usize, steps: usize) {
        if steps == 0 {
            return;
        }
        let beat_amount = self.transport.beat_amount;
        match self.song.pattern_mut(pattern) {
            Some(target) => target.set_steps(steps),
            None => return,
        }
        self.song.reschedule_pattern(pattern, beat_amount);
    }

    // --- Observations ---------------------------------------------------

    pub fn is_playing(&self) -> bool {
        self.transport.playing
    }

    pub fn is_looping(&self) -> bool {
        self.transport.looping
    }

    pub fn is_recording(&self) -> bool {
        self.transport.recording
    }

    pub fn is_metronome_enabled(&self) -> bool {
        self.transport.metronome
    }

    /// Step resolution of the active pattern
    pub fn amount_of_steps(&self) -> usize {
        self.song
            .pattern(self.transport.active_pattern)
            .map(|pattern| pattern.steps())
            .unwrap_or(0)
    }

    pub fn position(&self) -> PlayPosition {
        PlayPosition {
            pattern: self.transport.active_pattern,
            step: self.transport.current_step,
        }
    }

    /// Number of voices a channel currently holds queued
    pub fn active_voice_count(&self, channel: usize) -> usize {
        self.queues.get(channel).map(VoiceQueue::len).unwrap_or(0)
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Editor access; the editor shares the scheduler's execution context
    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
