//! Transient user-facing status messages.

/// Severity of a status message, used only for styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
	Info,
	Success,
	Error,
}

/// A short message shown near the toolbar and hidden again after a delay.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
	pub text: String,
	pub level: StatusLevel,
}

impl StatusMessage {
	pub fn info(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			level: StatusLevel::Info,
		}
	}

	pub fn success(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			level: StatusLevel::Success,
		}
	}

	pub fn error(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			level: StatusLevel::Error,
		}
	}

	/// CSS class for the message's severity.
	pub fn class(&self) -> &'static str {
		match self.level {
			StatusLevel::Info => "status-message info",
			StatusLevel::Success => "status-message success",
			StatusLevel::Error => "status-message error",
		}
	}
}
