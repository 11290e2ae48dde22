//! Application event channel.
//!
//! Dialogs and menu actions emit events instead of mutating application
//! state directly; the main loop drains the channel once per update and
//! applies the side effects (trimming, exports, camera assignment).

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Events emitted by dialogs, menus and buttons.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// User picked a deployment directory to open.
    OpenDeployment(PathBuf),
    /// Camera selection dialog assigned channel roles.
    CamerasAssigned { left: String, right: String },
    /// Trim dialog requested a trim; still needs confirmation.
    TrimRequested { start: i64, end: i64 },
    /// Trim confirmed: delete everything outside [start, end].
    TrimConfirmed { start: i64, end: i64 },
    /// Mark deletion confirmed for the given frame.
    RemoveMarkConfirmed(i64),
    /// Export every marked frame pair for calibration.
    ExportForCalConfirmed,
    /// Replace an existing calibration export directory, then export.
    ReplaceCalExportConfirmed,
}

/// Event sender wrapper passed into dialogs.
#[derive(Clone, Debug)]
pub struct AppEventSender {
    sender: Option<Sender<AppEvent>>,
}

impl AppEventSender {
    pub fn new(sender: Sender<AppEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Create dummy sender (for tests or when events not needed)
    pub fn dummy() -> Self {
        Self { sender: None }
    }

    /// Emit event (silent if no receiver)
    pub fn emit(&self, event: AppEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }
}

impl Default for AppEventSender {
    fn default() -> Self {
        Self::dummy()
    }
}

/// Create a connected sender/receiver pair for the application.
pub fn channel() -> (AppEventSender, Receiver<AppEvent>) {
    let (tx, rx) = unbounded();
    (AppEventSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (tx, rx) = channel();
        tx.emit(AppEvent::TrimRequested { start: 1, end: 2 });
        tx.emit(AppEvent::RemoveMarkConfirmed(5));

        assert_eq!(rx.try_recv().ok(), Some(AppEvent::TrimRequested { start: 1, end: 2 }));
        assert_eq!(rx.try_recv().ok(), Some(AppEvent::RemoveMarkConfirmed(5)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dummy_sender_swallows_events() {
        AppEventSender::dummy().emit(AppEvent::ExportForCalConfirmed);
    }
}
