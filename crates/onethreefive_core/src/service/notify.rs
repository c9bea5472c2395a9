//! Notification host boundary.
//!
//! Core only asks the host to show a fixed reminder and reads the host's
//! permission flag; delivery and permission prompts belong to the host.

/// Reminder text shown before the daily reset.
pub const REMINDER_MESSAGE: &str =
    "Your 1-3-5 list for today still has open tasks. The daily reset is 30 minutes away.";

/// Host capability for showing reminders.
pub trait Notifier {
    /// Whether the host currently holds notification permission.
    fn permission_granted(&self) -> bool;
    /// Shows one reminder. Fire-and-forget.
    fn show_reminder(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn permission_granted(&self) -> bool {
        (**self).permission_granted()
    }

    fn show_reminder(&self, message: &str) {
        (**self).show_reminder(message)
    }
}
