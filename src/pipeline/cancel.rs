//! One-shot broadcast cancellation. Cloned into the walk thread; the walker checks it at every
//! emission and wakes from a blocked send when it fires.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
    /// Dropping the only sender disconnects every receiver clone, which wakes `select!` waiters.
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    fired: Receiver<()>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            fired: rx,
        }
    }

    /// Fire the signal. Idempotent; safe from a signal-handler thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
        if let Ok(mut trigger) = self.trigger.lock() {
            trigger.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Receiver that becomes ready (disconnected) once the signal fires. For `select!`.
    pub fn fired(&self) -> &Receiver<()> {
        &self.fired
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
