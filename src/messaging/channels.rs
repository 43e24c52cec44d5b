// Communication channels lock-free

use crate::messaging::command::{Tick, TransportCommand};
use ringbuf::{traits::Split, HeapRb};

pub type CommandProducer = ringbuf::HeapProd<TransportCommand>;
pub type CommandConsumer = ringbuf::HeapCons<TransportCommand>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<TransportCommand>::new(capacity);
    rb.split()
}

pub type TickProducer = ringbuf::HeapProd<Tick>;
pub type TickConsumer = ringbuf::HeapCons<Tick>;

/// Capacity 1: at most one tick is ever in flight, a full buffer coalesces
pub fn create_tick_channel() -> (TickProducer, TickConsumer) {
    let rb = HeapRb::<Tick>::new(1);
    rb.split()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::{Consumer, Producer};

    #[test]
    fn test_command_channel_roundtrip() {
        let (mut tx, mut rx) = create_command_channel(8);

        tx.try_push(TransportCommand::SetPlaying(true)).unwrap();
        tx.try_push(TransportCommand::GotoNextPattern).unwrap();

        assert_eq!(rx.try_pop(), Some(TransportCommand::SetPlaying(true)));
        assert_eq!(rx.try_pop(), Some(TransportCommand::GotoNextPattern));
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_tick_channel_coalesces() {
        let (mut tx, mut rx) = create_tick_channel();

        assert!(tx.try_push(Tick).is_ok());
        // Second tick before the first is serviced is dropped
        assert!(tx.try_push(Tick).is_err());

        assert_eq!(rx.try_pop(), Some(Tick));
        assert_eq!(rx.try_pop(), None);
    }
}
