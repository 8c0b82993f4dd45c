//! Backend commands queued from UI to backend worker.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Load the filter vocabulary and the first unfiltered page.
    Startup,
    /// Empty string selects all states.
    SelectState {
        state: String,
    },
    /// Empty string selects all districts of the current state.
    SelectDistrict {
        district: String,
    },
    ApplyFilters,
    NextPage,
    PreviousPage,
    ReloadFilters,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Startup => "startup",
            BackendCommand::SelectState { .. } => "select_state",
            BackendCommand::SelectDistrict { .. } => "select_district",
            BackendCommand::ApplyFilters => "apply_filters",
            BackendCommand::NextPage => "next_page",
            BackendCommand::PreviousPage => "previous_page",
            BackendCommand::ReloadFilters => "reload_filters",
        }
    }
}
