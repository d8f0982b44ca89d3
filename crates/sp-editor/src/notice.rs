//! Transient user notices.
//!
//! Every user-visible outcome queues a `Notice`; the host drains the queue
//! and shows each one as a toast for `duration_ms`.

use serde::Serialize;
use sp_core::Error;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration_ms: u32,
}

/// FIFO of pending notices.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
    duration_ms: u32,
}

impl Notices {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            duration_ms,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notice ({level:?}): {message}");
        self.queue.push_back(Notice {
            level,
            message,
            duration_ms: self.duration_ms,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn error(&mut self, err: &Error) {
        self.push(NoticeLevel::Error, err.to_string());
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
