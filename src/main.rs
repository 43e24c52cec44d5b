// steptracker demo - Plays a built-in two-pattern song to the console
// The console sink stands in for the audio backend

use std::thread;
use std::time::{Duration, Instant};

use steptracker::{
    create_command_channel, create_tick_channel, AudioSink, ClickTrack, ClockDriver, Event,
    ModParam, Pattern, Scheduler, Song, TransportCommand, BEAT_AMOUNT, INSTRUMENT_AMOUNT,
};

const UI_RINGBUFFER_CAPACITY: usize = 64;

/// Sink that timestamps against a wall clock and prints every command
struct ConsoleSink {
    started: Instant,
}

impl ConsoleSink {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl AudioSink for ConsoleSink {
    fn current_time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn note_on(&mut self, event: &Event, instrument: usize, at: f64) {
        println!(
            "{:7.3}s  noteOn   instrument {}  note {}",
            at, instrument, event.note
        );
    }

    fn note_off(&mut self, event: &Event, at: f64) {
        println!(
            "{:7.3}s  noteOff  instrument {}  note {}",
            at, event.instrument, event.note
        );
    }
}

fn demo_song() -> Song {
    let mut song = Song::new(120.0);
    song.patterns.push(Pattern::new(16, INSTRUMENT_AMOUNT));
    song.patterns.push(Pattern::new(16, INSTRUMENT_AMOUNT));

    // Pattern 0: four-on-the-floor on channel 0, offbeat stabs on channel 1
    for step in [0, 4, 8, 12] {
        song.place_event(0, 0, step, Event::note_on(36, 0), BEAT_AMOUNT)
            .expect("demo song placement");
    }
    for step in [2, 6, 10, 14] {
        song.place_event(0, 1, step, Event::note_on(55, 1), BEAT_AMOUNT)
            .expect("demo song placement");
    }

    // Pattern 1: a held bass note, a filter sweep, then a cut
    song.place_event(1, 2, 0, Event::note_on(40, 2), BEAT_AMOUNT)
        .expect("demo song placement");
    song.place_event(
        1,
        2,
        4,
        Event::mod_param(
            2,
            ModParam {
                module: 1,
                value: 0.8,
                glide: 0.5,
            },
        ),
        BEAT_AMOUNT,
    )
    .expect("demo song placement");
    song.place_event(1, 2, 12, Event::note_off(2), BEAT_AMOUNT)
        .expect("demo song placement");

    song
}

fn main() {
    println!("=== steptracker demo ===\n");

    let (mut command_tx, mut command_rx) = create_command_channel(UI_RINGBUFFER_CAPACITY);
    let (tick_tx, mut tick_rx) = create_tick_channel();

    let metronome = ClickTrack::new(|click, at| {
        println!("{:7.3}s  click    {:?}", at, click);
    });

    let mut scheduler = Scheduler::new(
        demo_song(),
        ConsoleSink::new(),
        metronome,
        ClockDriver::new(tick_tx),
    );
    scheduler.transport_mut().step_precision = 16;

    println!(
        "Playing {} patterns at {} BPM\n",
        scheduler.song().patterns.len(),
        scheduler.song().tempo
    );

    {
        use ringbuf::traits::Producer;
        let _ = command_tx.try_push(TransportCommand::SetPlaying(true));
    }

    // Editor/UI context: drain commands, service ticks, repeat
    let deadline = Instant::now() + Duration::from_millis(4200);
    while Instant::now() < deadline {
        scheduler.drain(&mut command_rx);
        scheduler.pump_ticks(&mut tick_rx);
        thread::sleep(Duration::from_millis(5));
    }

    scheduler.apply(TransportCommand::SetPlaying(false));

    let stuck: usize = (0..INSTRUMENT_AMOUNT)
        .map(|channel| scheduler.active_voice_count(channel))
        .sum();
    println!("\nStopped at {:?}; {} voices left queued", scheduler.position(), stuck);
}
