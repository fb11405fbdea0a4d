pub mod notifier;

pub use notifier::{build_notifier, Notification, NotificationLevel, Notifier};
