//! Manager change notifications.

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// A change to the manager's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    RootChanged(PathBuf),
    PackageLoaded(String),
    PackageUnloaded(String),
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<ManagerEvent>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> Receiver<ManagerEvent> {
        let (sender, receiver) = unbounded();
        self.senders.lock().push(sender);
        receiver
    }

    /// Deliver to every live subscriber, dropping the ones that hung up.
    pub(crate) fn emit(&self, event: ManagerEvent) {
        self.senders
            .lock()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}
