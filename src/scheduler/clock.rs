// Clock driver - Dedicated tick thread, independent of any render cadence
// Holds no musical state; only posts ticks into a channel

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ringbuf::traits::Producer;

use crate::messaging::channels::TickProducer;
use crate::messaging::command::Tick;

/// State shared with the tick thread
#[derive(Debug)]
struct ClockShared {
    running: AtomicBool,
    interval_us: AtomicU64,
}

/// Background tick source
///
/// `start` spawns a sleep-loop thread that pushes one `Tick` per period into
/// the tick channel; a full channel means the previous tick has not been
/// serviced yet and the new one coalesces into it. `stop` joins the thread
/// and keeps the producer for the next `start`.
pub struct ClockDriver {
    shared: Arc<ClockShared>,
    worker: Option<JoinHandle<TickProducer>>,
    idle_producer: Option<TickProducer>,
}

impl ClockDriver {
    pub fn new(producer: TickProducer) -> Self {
        Self {
            shared: Arc::new(ClockShared {
                running: AtomicBool::new(false),
                interval_us: AtomicU64::new(0),
            }),
            worker: None,
            idle_producer: Some(producer),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Begin firing ticks every `interval_ms` milliseconds
    ///
    /// The first tick fires immediately so the lookahead horizon fills
    /// without waiting one period. Calling `start` while running only
    /// updates the interval.
    pub fn start(&mut self, interval_ms: f64) {
        let interval_us = (interval_ms * 1000.0).max(1.0) as u64;
        self.shared.interval_us.store(interval_us, Ordering::Relaxed);

        if self.worker.is_some() {
            return;
        }
        let Some(mut producer) = self.idle_producer.take() else {
            return;
        };

        self.shared.running.store(true, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        self.worker = Some(thread::spawn(move || {
            while shared.running.load(Ordering::Relaxed) {
                let _ = producer.try_push(Tick);
                let sleep_us = shared.interval_us.load(Ordering::Relaxed);
                thread::sleep(Duration::from_micros(sleep_us));
            }
            producer
        }));
    }

    /// Cease firing; blocks until the tick thread has exited
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(producer) => self.idle_producer = Some(producer),
                Err(_) => eprintln!("Clock thread panicked; driver cannot restart"),
            }
        }
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_tick_channel;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_ticks_arrive_while_running() {
        let (tx, mut rx) = create_tick_channel();
        let mut clock = ClockDriver::new(tx);

        clock.start(2.0);
        assert!(clock.is_running());

        let mut received = 0;
        for _ in 0..50 {
            thread::sleep(Duration::from_millis(2));
            while rx.try_pop().is_some() {
                received += 1;
            }
            if received >= 3 {
                break;
            }
        }
        clock.stop();

        assert!(received >= 3, "expected ticks, got {}", received);
    }

    #[test]
    fn test_stop_ceases_ticks() {
        let (tx, mut rx) = create_tick_channel();
        let mut clock = ClockDriver::new(tx);

        clock.start(2.0);
        thread::sleep(Duration::from_millis(10));
        clock.stop();
        assert!(!clock.is_running());

        // Drain whatever was in flight, then verify silence
        while rx.try_pop().is_some() {}
        thread::sleep(Duration::from_millis(15));
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_restart_after_stop() {
        let (tx, mut rx) = create_tick_channel();
        let mut clock = ClockDriver::new(tx);

        clock.start(2.0);
        thread::sleep(Duration::from_millis(10));
        clock.stop();
        while rx.try_pop().is_some() {}

        clock.start(2.0);
        let mut received = 0;
        for _ in 0..50 {
            thread::sleep(Duration::from_millis(2));
            if rx.try_pop().is_some() {
                received += 1;
            }
            if received >= 2 {
                break;
            }
        }
        clock.stop();

        assert!(received >= 2, "driver did not restart");
    }
}
