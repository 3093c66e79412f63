//! Session state owned by the form controller.

use crate::category::Category;
use crate::method::{LocationMethod, MethodSelector};
use crate::render::ReportListView;
use crate::report::ReportStore;
use chrono::{DateTime, Utc};
use fixmap_geo::Coordinate;
use serde::Serialize;

/// Label of the submit control when idle.
pub const SUBMIT_LABEL: &str = "Submit Report";

/// Label of the submit control while a submission is in flight.
pub const SUBMITTING_LABEL: &str = "Submitting...";

/// Visual treatment of a status line or notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Error,
    Busy,
}

/// The location readout under the method panels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LocationStatus {
    pub text: String,
    pub tone: Tone,
}

impl LocationStatus {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// A staged coordinate and the method that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingCoordinate {
    pub coordinate: Coordinate,
    pub method: LocationMethod,
}

/// Raw form inputs.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormFields {
    pub category: Option<Category>,
    pub description: String,
    pub manual_latitude: String,
    pub manual_longitude: String,
}

/// State of the submit button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub enabled: bool,
    pub busy: bool,
    pub label: &'static str,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            enabled: false,
            busy: false,
            label: SUBMIT_LABEL,
        }
    }
}

/// Identifies a notice so a late timer cannot clear a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NoticeId(u64);

/// A transient message in the message area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub text: String,
    pub tone: Tone,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Everything the widget knows during a session.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub(crate) method: MethodSelector,
    pub(crate) pending: Option<PendingCoordinate>,
    pub(crate) form: FormFields,
    pub(crate) location_status: LocationStatus,
    pub(crate) submit: SubmitControl,
    pub(crate) notice: Option<Notice>,
    pub(crate) last_notice: u64,
    pub(crate) store: ReportStore,
    pub(crate) list: ReportListView,
}

impl AppState {
    pub fn method(&self) -> LocationMethod {
        self.method.active()
    }

    /// The staged coordinate, if any.
    pub fn pending(&self) -> Option<Coordinate> {
        self.pending.map(|p| p.coordinate)
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn location_status(&self) -> &LocationStatus {
        &self.location_status
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.submit
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn report_list(&self) -> &ReportListView {
        &self.list
    }

    /// A category is chosen, a coordinate is staged and nothing is in flight.
    pub fn can_submit(&self) -> bool {
        self.form.category.is_some() && self.pending.is_some() && !self.submit.busy
    }

    /// Recomputes the submit control from the rest of the state.
    pub(crate) fn refresh_submit(&mut self) {
        self.submit.enabled = self.can_submit();
    }

    /// Stages a coordinate produced by the active method.
    pub(crate) fn stage(&mut self, coordinate: Coordinate) {
        self.pending = Some(PendingCoordinate {
            coordinate,
            method: self.method.active(),
        });
    }

    pub(crate) fn next_notice_id(&mut self) -> NoticeId {
        self.last_notice += 1;
        NoticeId(self.last_notice)
    }
}
