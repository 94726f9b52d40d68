use tokio::task::JoinHandle;

/// Bookkeeping for the pending-login timer.
///
/// Each arm gets a new generation. The timer task only acts if its
/// generation is still the armed one, so a cancelled or superseded timer can
/// never clobber a newer state.
#[derive(Debug, Default)]
pub(super) struct Watchdog {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Cancel any running timer and reserve a generation for a new one.
    pub(super) fn rearm(&mut self) -> u64 {
        self.cancel();
        self.generation
    }

    pub(super) fn attach(&mut self, handle: JoinHandle<()>) {
        self.handle = Some(handle);
    }

    /// Abort the running timer, if any. Returns whether one was armed.
    pub(super) fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Called from the timer task itself. Returns `false` if `generation` was
    /// cancelled or superseded in the meantime.
    pub(super) fn fire(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.handle.is_none() {
            return false;
        }
        // Dropping the handle detaches the running task; it finishes on its own.
        self.handle = None;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    #[cfg(test)]
    pub(super) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}
