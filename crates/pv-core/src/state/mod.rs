//! Session view state and the dashboard event reducer

use crate::selection::{normalize, SelectionEvent, SelectionRange};

/// Events emitted by the presentation layer.
///
/// `RefreshData` and `SetDisplayColumns` are identity transitions on
/// [`ViewState`]; their effects (cache invalidation, table column set) are
/// performed by the dispatching app.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SelectRegion(SelectionEvent),
    ResetZoom,
    SetSearchTerm(String),
    RefreshData,
    SetDisplayColumns(Vec<String>),
}

/// The transient, session-scoped view state: the active coordinate range
/// and the active search term, each independently set or unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Active rectangular filter, if any.
    pub range: Option<SelectionRange>,
    /// Active free-text search term; never stored empty.
    pub search: Option<String>,
}

impl ViewState {
    /// Apply one event, returning the successor state.
    ///
    /// Total over [`DashboardEvent`]: a malformed selection (one the
    /// normalizer rejects) and the two app-effect events leave the state
    /// unchanged.
    pub fn apply(&self, event: &DashboardEvent) -> ViewState {
        let mut next = self.clone();
        match event {
            DashboardEvent::SelectRegion(selection) => {
                if let Some(range) = normalize(selection) {
                    tracing::debug!(
                        "{} selection set range X: {:.4} to {:.4}, Y: {:.4} to {:.4}",
                        selection.kind(),
                        range.x_min,
                        range.x_max,
                        range.y_min,
                        range.y_max,
                    );
                    next.range = Some(range);
                }
            }
            DashboardEvent::ResetZoom => {
                next.range = None;
            }
            DashboardEvent::SetSearchTerm(term) => {
                next.search = if term.is_empty() {
                    None
                } else {
                    Some(term.clone())
                };
            }
            DashboardEvent::RefreshData | DashboardEvent::SetDisplayColumns(_) => {}
        }
        next
    }

    /// The active search term, or `""` when unset.
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }

    /// Whether any filter (range or search) is active.
    pub fn has_filter(&self) -> bool {
        self.range.is_some() || self.search.is_some()
    }
}
