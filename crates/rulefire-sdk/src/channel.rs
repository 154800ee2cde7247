//! Emission channel capturing facts sent by rules

use rulefire_core::Fact;
use rulefire_runtime::Channel;
use std::sync::{Mutex, PoisonError};

/// Name the capture channel is registered under
pub const SEND_CHANNEL: &str = "send-channel";

/// Collects every fact sent to it, in send order.
///
/// One instance is registered per execution and drained when firing ends.
#[derive(Debug, Default)]
pub struct SendData {
    captured: Mutex<Vec<Fact>>,
}

impl SendData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all captured facts, leaving the channel empty
    pub fn drain(&self) -> Vec<Fact> {
        std::mem::take(&mut *self.captured.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Channel for SendData {
    fn send(&self, fact: Fact) {
        tracing::debug!("Captured {} on {}", fact.type_name(), SEND_CHANNEL);
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_send_order() {
        let channel = SendData::new();
        channel.send(Fact::new(1_u32));
        channel.send(Fact::new("two"));
        channel.send(Fact::new(1_u32));

        assert_eq!(channel.len(), 3);
        let drained = channel.drain();
        assert_eq!(drained[0].downcast_ref::<u32>(), Some(&1));
        assert_eq!(drained[1].downcast_ref::<&str>(), Some(&"two"));
        assert_eq!(drained[2].downcast_ref::<u32>(), Some(&1));
        assert!(channel.is_empty());
    }

    #[test]
    fn test_send_from_threads() {
        let channel = std::sync::Arc::new(SendData::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let channel = channel.clone();
                std::thread::spawn(move || channel.send(Fact::new(i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(channel.len(), 4);
    }
}
