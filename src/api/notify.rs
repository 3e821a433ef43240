//! User-visible notifications raised by the dispatcher

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

/// Side channel for messages the user should see
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to whoever owns the receiving end (the UI loop)
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, rx) = mpsc::unbounded_channel();
        (Self { sender }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            log::debug!("Notification dropped: receiver closed");
        }
    }
}
