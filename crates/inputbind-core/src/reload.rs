// Inputbind Reload Notifications
// Lets an asset watcher tell binding engines that bind documents changed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Broadcasts "bind documents changed" to every live listener.
///
/// Cloning the hub shares the listener list, so a watcher thread can hold a
/// clone and call [`ReloadHub::notify`] while the engine polls its listener
/// on the frame thread.
#[derive(Debug, Clone, Default)]
pub struct ReloadHub {
    listeners: Arc<Mutex<Vec<Weak<AtomicBool>>>>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It deregisters itself when dropped.
    pub fn subscribe(&self) -> ReloadListener {
        let pending = Arc::new(AtomicBool::new(false));
        self.listeners.lock().push(Arc::downgrade(&pending));
        ReloadListener { pending }
    }

    /// Flag a reload on every live listener, pruning dropped ones
    pub fn notify(&self) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|weak| match weak.upgrade() {
            Some(pending) => {
                pending.store(true, Ordering::Release);
                true
            }
            None => false,
        });
        log::debug!("Binds: reload requested for {} listener(s)", listeners.len());
    }

    /// Number of listeners still alive
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Receiving end of a [`ReloadHub`] subscription
#[derive(Debug)]
pub struct ReloadListener {
    pending: Arc<AtomicBool>,
}

impl ReloadListener {
    /// Returns true once per notification and clears the flag
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
