use crate::sources::{FilterForm, SaveRequestDecision, SourceQuery};

/// Which list of sources the table is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    AllSources,
    Pending(i64), // Save requests waiting for review in a group
    Saved(i64),   // Sources saved to a group
}

impl ViewMode {
    pub fn group_id(&self) -> Option<i64> {
        match self {
            Self::AllSources => None,
            Self::Pending(id) | Self::Saved(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // Source table
    FetchSources(SourceQuery),
    ApplyFilters(FilterForm),
    ToggleFavorite {
        source_id: String,
        favorite: bool,
    },
    ReviewSaveRequest {
        source_id: String,
        group_id: i64,
        decision: SaveRequestDecision,
    },
    NavigateToGroup(i64),
    SetViewMode(ViewMode),
    Refresh,

    // UI operations
    ShowDialog(DialogType),
    HideDialog,

    // App control
    Quit,
    None,
}

#[derive(Debug, Clone)]
pub enum DialogType {
    FilterForm(FilterForm),
    Info(String),
    Help,
    Logs,
}
