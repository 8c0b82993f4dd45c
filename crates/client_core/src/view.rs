//! Presentation model: what the dashboard surface renders from core state.

use std::sync::Arc;

use shared::{domain::FilterVocabulary, protocol::ResultPage};

use crate::{
    orchestrator::{DashboardEvent, FetchStatus},
    query_state::QueryState,
};

pub const EMPTY_TABLE_MESSAGE: &str = "No records found matching your filters.";
pub const EMPTY_CHART_MESSAGE: &str = "No data available for the current selection";

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub vocabulary: Arc<FilterVocabulary>,
    pub query: QueryState,
    pub page: ResultPage,
    pub status: FetchStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultWindow {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: String,
    pub age_0_5: u64,
    pub age_5_17: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub location: String,
    pub detail: String,
    pub enrol_0_5: u64,
    pub enrol_5_17: u64,
    pub demo_5_17: u64,
    pub bio_5_17: u64,
}

impl DashboardView {
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Vocabulary(vocabulary) => self.vocabulary = vocabulary,
            DashboardEvent::Query(query) => self.query = query,
            DashboardEvent::Status(status) => self.status = status,
            DashboardEvent::Page { page, query } => {
                self.page = page;
                self.query = query;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Filter controls stay live while a query is pending.
    pub fn can_apply(&self) -> bool {
        true
    }

    pub fn can_go_previous(&self) -> bool {
        !self.is_loading() && self.query.has_previous()
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_loading() && self.query.has_next()
    }

    pub fn result_window(&self) -> Option<ResultWindow> {
        let total = self.query.total();
        if total == 0 {
            return None;
        }
        let offset = self.query.shown_offset();
        Some(ResultWindow {
            first: offset + 1,
            last: offset.saturating_add(self.query.shown_limit()).min(total),
            total,
        })
    }

    pub fn window_label(&self) -> String {
        match self.result_window() {
            Some(window) => format!(
                "Showing {} to {} of {} results",
                window.first, window.last, window.total
            ),
            None => "No results".to_string(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        (self.status == FetchStatus::Success && self.page.records.is_empty())
            .then_some(EMPTY_TABLE_MESSAGE)
    }

    pub fn chart_empty_message(&self) -> Option<&'static str> {
        self.page.records.is_empty().then_some(EMPTY_CHART_MESSAGE)
    }

    pub fn state_options(&self) -> Vec<&str> {
        self.vocabulary.states().collect()
    }

    pub fn district_options(&self) -> Vec<&str> {
        match self.query.selected_state() {
            Some(state) => self.vocabulary.districts(state).collect(),
            None => Vec::new(),
        }
    }

    pub fn trend_series(&self) -> Vec<TrendPoint> {
        self.page
            .records
            .iter()
            .map(|record| TrendPoint {
                date: record.date.clone(),
                age_0_5: record.age_0_5,
                age_5_17: record.age_5_17,
            })
            .collect()
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.page
            .records
            .iter()
            .map(|record| TableRow {
                location: format!("{} › {}", record.state, record.district),
                detail: format!("{} • {}", record.pincode, record.date),
                enrol_0_5: record.age_0_5,
                enrol_5_17: record.age_5_17,
                demo_5_17: record.demo_age_5_17,
                bio_5_17: record.bio_age_5_17,
            })
            .collect()
    }
}
