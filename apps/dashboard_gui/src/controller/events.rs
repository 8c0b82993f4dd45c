//! UI/backend events and error modeling for the dashboard controller.

use client_core::DashboardEvent;
use shared::error::QueryError;

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    Dashboard(DashboardEvent),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Filters,
    Query,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("api key")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("requires")
            || message_lower.contains("not a multiple")
            || message_lower.contains("must be")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_query(err: &QueryError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context: UiErrorContext::Query,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Banner text; startup failures get a hint about configuration.
    pub fn banner_text(&self) -> String {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => format!(
                "{}. Check gateway_url in dashboard.toml or DASHBOARD_GATEWAY_URL.",
                self.message
            ),
            (_, UiErrorCategory::Auth) => format!(
                "{}. Check the configured API key (DASHBOARD_API_KEY).",
                self.message
            ),
            (UiErrorContext::Filters, UiErrorCategory::Transport) => {
                format!("Filter list unavailable: {}", self.message)
            }
            _ => self.message.clone(),
        }
    }
}
