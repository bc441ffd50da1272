//! Cooperative cancellation.
//!
//! Passes poll a [`StopSignal`] between coarse phases. A positive answer ends the pass
//! without further writes; anything already committed stays.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Polled between phases of a tile pass. `progress` is a rough completion ratio in `[0, 1]`.
pub trait StopSignal {
    fn should_stop(&self, progress: f32) -> bool;
}

/// Never stops.
impl StopSignal for () {
    #[inline]
    fn should_stop(&self, _progress: f32) -> bool {
        false
    }
}

impl<F> StopSignal for F
where
    F: Fn(f32) -> bool,
{
    #[inline]
    fn should_stop(&self, progress: f32) -> bool {
        self(progress)
    }
}

/// Shared flag a scheduler can raise from another thread.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl StopSignal for StopFlag {
    #[inline]
    fn should_stop(&self, _progress: f32) -> bool {
        self.is_raised()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn unit_never_stops() {
        assert!(!().should_stop(0.5));
    }

    #[test]
    fn closures_receive_progress() {
        let seen = Cell::new(-1.0);
        let stop = |p: f32| {
            seen.set(p);
            p > 0.5
        };
        assert!(!stop.should_stop(0.25));
        assert_eq!(seen.get(), 0.25);
        assert!(stop.should_stop(0.75));
    }

    #[test]
    fn flag_is_shared_between_clones() {
        let flag = StopFlag::new();
        let handle = flag.clone();
        assert!(!flag.should_stop(0.0));
        handle.raise();
        assert!(flag.should_stop(0.0));
        flag.reset();
        assert!(!handle.is_raised());
    }
}
