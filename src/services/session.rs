use serde::Serialize;

use crate::models::{AnalysisRecord, Preferences, RecommendationRecord};
use crate::services::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// One-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Text last typed into each input, redisplayed after a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Drafts {
    pub query: String,
    pub description: String,
    pub extra: String,
}

/// Everything that lives for the duration of one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub recommendations: History<RecommendationRecord>,
    pub analyses: History<AnalysisRecord>,
    pub preferences: Preferences,
    pub drafts: Drafts,
    pub notice: Option<Notice>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}
