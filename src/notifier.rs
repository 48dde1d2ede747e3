/// Outcome notices shown to the user (toasts in a browser, lines on a terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Fire-and-forget sink for outcome notices
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Sends notices to the log; used when nothing is watching a screen
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success | NoticeLevel::Info => tracing::info!(notice = ?level, "{}", message),
            NoticeLevel::Error => tracing::warn!(notice = ?level, "{}", message),
        }
    }
}

/// Prints notices for a terminal user
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => println!("✓ {}", message),
            NoticeLevel::Info => println!("{}", message),
            NoticeLevel::Error => eprintln!("Error: {}", message),
        }
    }
}
