use serde::Serialize;

use super::domain::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot user-facing message attached to a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Result of a form submission: where to go next and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub redirect: String,
    pub messages: Vec<FlashMessage>,
}

impl Outcome {
    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            redirect: to.into(),
            messages: Vec::new(),
        }
    }

    pub fn with(mut self, level: FlashLevel, text: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level,
            text: text.into(),
        });
        self
    }

    pub fn success(self, text: impl Into<String>) -> Self {
        self.with(FlashLevel::Success, text)
    }

    pub fn info(self, text: impl Into<String>) -> Self {
        self.with(FlashLevel::Info, text)
    }

    pub fn error(self, text: impl Into<String>) -> Self {
        self.with(FlashLevel::Error, text)
    }

    pub fn has_level(&self, level: FlashLevel) -> bool {
        self.messages.iter().any(|message| message.level == level)
    }
}

/// Canonical URLs used as redirect targets.
pub mod paths {
    use super::JobId;

    pub fn home() -> String {
        "/".to_string()
    }

    pub fn login() -> String {
        "/accounts/login/".to_string()
    }

    pub fn job_detail(job: JobId) -> String {
        format!("/jobs/{}/", job.0)
    }

    pub fn job_applications(job: JobId) -> String {
        format!("/jobs/{}/applications/", job.0)
    }

    pub fn profile() -> String {
        "/accounts/profile/".to_string()
    }
}
