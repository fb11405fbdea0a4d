use async_trait::async_trait;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use teloxide::{
    adaptors::throttle::{Limits, Throttle},
    prelude::*,
    sugar::request::RequestLinkPreviewExt,
    types::{MessageId, ParseMode, ThreadId},
    Bot,
};

use crate::config::TelegramConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A short user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Writes notifications to the application log
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!("[notice] {}", notification.message),
            NotificationLevel::Success => info!("[success] {}", notification.message),
            NotificationLevel::Error => warn!("[error] {}", notification.message),
        }
    }
}

/// Escape special characters for MarkdownV2
fn escape_markdownv2(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|'
            | '{' | '}' | '.' | '!' => {
                format!("\\{}", c)
            }
            _ => c.to_string(),
        })
        .collect()
}

fn format_message(notification: &Notification) -> String {
    let icon = match notification.level {
        NotificationLevel::Info => "🔵",
        NotificationLevel::Success => "🟢",
        NotificationLevel::Error => "🔴",
    };
    format!("{} {}", icon, escape_markdownv2(&notification.message))
}

/// Forwards notifications to a Telegram chat. Errors go to their own thread when configured.
pub struct TelegramNotifier {
    bot: Throttle<Bot>,
    chat_id: String,
    thread_id: Option<u64>,
    error_thread_id: Option<u64>,
}

impl TelegramNotifier {
    pub fn new(
        token: String,
        chat_id: String,
        thread_id: Option<u64>,
        error_thread_id: Option<u64>,
    ) -> Self {
        let bot = Bot::new(token).throttle(Limits::default());
        Self {
            bot,
            chat_id,
            thread_id,
            error_thread_id,
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        match (&config.token, &config.chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Some(Self::new(
                    token.clone(),
                    chat_id.clone(),
                    config.thread_id,
                    config.error_thread_id,
                ))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, notification: Notification) {
        let thread_id = match notification.level {
            NotificationLevel::Error => self.error_thread_id.or(self.thread_id),
            _ => self.thread_id,
        };

        let mut request = self
            .bot
            .send_message(self.chat_id.clone(), format_message(&notification))
            .disable_link_preview(true)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(thread_id) = thread_id {
            request = request.message_thread_id(ThreadId(MessageId(thread_id as i32)));
        }

        if let Err(e) = request.send().await {
            error!("Failed to send Telegram notification: {}", e);
        }
    }
}

/// Log every notification and forward it to Telegram when configured
pub struct CompositeNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone()).await;
        }
    }
}

pub fn build_notifier(config: &TelegramConfig) -> Arc<dyn Notifier> {
    let mut sinks: Vec<Arc<dyn Notifier>> = vec![Arc::new(LogNotifier)];
    match TelegramNotifier::from_config(config) {
        Some(telegram) => {
            info!("Telegram notifications enabled");
            sinks.push(Arc::new(telegram));
        }
        None => info!("Telegram not configured, notifications are logged only"),
    }
    Arc::new(CompositeNotifier::new(sinks))
}
