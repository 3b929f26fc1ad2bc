use std::time::{Duration, Instant};

/// Per-peer bootstrap progression. A peer joins, requests full state, and
/// either receives a snapshot from the oldest connected peer or concludes
/// after a timeout that it is the first peer in the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapPhase {
    Joining,
    AwaitingState,
    Synced,
}

pub struct Bootstrap {
    phase: BootstrapPhase,
    requested_at: Option<Instant>,
    timeout: Duration,
}

impl Bootstrap {
    pub fn new(timeout: Duration) -> Self {
        Self {
            phase: BootstrapPhase::Joining,
            requested_at: None,
            timeout,
        }
    }

    /// A peer that was never a newcomer: the first server in a session
    /// starts with authority over the (empty) world.
    pub fn synced() -> Self {
        Self {
            phase: BootstrapPhase::Synced,
            requested_at: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> BootstrapPhase {
        self.phase
    }

    pub fn is_synced(&self) -> bool {
        self.phase == BootstrapPhase::Synced
    }

    /// The request-full-state signal went out; start the response clock.
    pub fn request_sent(&mut self, now: Instant) {
        if self.phase == BootstrapPhase::Joining {
            self.phase = BootstrapPhase::AwaitingState;
            self.requested_at = Some(now);
        }
    }

    /// A full-state response arrived. Returns true only for the first one;
    /// first writer wins for bootstrap, and later responses are ignored.
    pub fn accept_init(&mut self) -> bool {
        match self.phase {
            BootstrapPhase::Joining | BootstrapPhase::AwaitingState => {
                self.phase = BootstrapPhase::Synced;
                true
            }
            BootstrapPhase::Synced => false,
        }
    }

    /// Advance the response clock. Returns true when the timeout elapses
    /// with no response: the peer assumes it is the first in the session
    /// and becomes synced over empty state.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.phase != BootstrapPhase::AwaitingState {
            return false;
        }
        let Some(requested_at) = self.requested_at else {
            return false;
        };
        if now.duration_since(requested_at) >= self.timeout {
            self.phase = BootstrapPhase::Synced;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_init_wins() {
        let mut bootstrap = Bootstrap::new(Duration::from_secs(2));
        bootstrap.request_sent(Instant::now());
        assert_eq!(bootstrap.phase(), BootstrapPhase::AwaitingState);

        assert!(bootstrap.accept_init());
        assert!(bootstrap.is_synced());
        // subsequent responses are ignored
        assert!(!bootstrap.accept_init());
    }

    #[test]
    fn test_timeout_assumes_first_peer() {
        let start = Instant::now();
        let mut bootstrap = Bootstrap::new(Duration::from_millis(10));
        bootstrap.request_sent(start);

        assert!(!bootstrap.tick(start));
        assert!(bootstrap.tick(start + Duration::from_millis(11)));
        assert!(bootstrap.is_synced());
        // no second transition
        assert!(!bootstrap.tick(start + Duration::from_millis(20)));
    }

    #[test]
    fn test_no_timeout_before_request() {
        let mut bootstrap = Bootstrap::new(Duration::from_millis(10));
        assert!(!bootstrap.tick(Instant::now()));
        assert_eq!(bootstrap.phase(), BootstrapPhase::Joining);
    }
}
