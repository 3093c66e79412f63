//! Projection of the report store into list and marker views.
//!
//! Rendering always rebuilds from scratch; there is no diffing. Markup is
//! produced by handlebars templates, so user text is HTML-escaped.

use crate::error::RenderError;
use crate::report::{Report, ReportId, ReportStore};
use chrono::{DateTime, Utc};
use fixmap_geo::Coordinate;
use handlebars::Handlebars;
use serde::Serialize;

/// Shown instead of the list while the store is empty.
pub const EMPTY_MESSAGE: &str = "No reports submitted yet. Be the first!";

const CARD_TEMPLATE: &str = "card";
const POPUP_TEMPLATE: &str = "popup";

const CARD_SOURCE: &str = r#"<div class="report-card">
  <div class="report-card-header">
    <h3>{{category}}</h3>
    <time datetime="{{iso_time}}">{{timestamp}}</time>
  </div>
  {{#if description}}<p>{{description}}</p>{{/if}}
  <div class="location">
    <p>{{location}}</p>
  </div>
</div>"#;

const POPUP_SOURCE: &str = r#"<div>
  <strong>{{category}}</strong>
  {{#if description}}<p>{{description}}</p>{{/if}}
  <div class="popup-location">{{coordinates}}</div>
</div>"#;

/// The list half of a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportListView {
    /// No reports yet
    Empty { message: String },
    /// One card per report, most recent first
    Items { cards: Vec<ReportCard> },
}

impl ReportListView {
    pub fn empty() -> Self {
        ReportListView::Empty {
            message: EMPTY_MESSAGE.to_string(),
        }
    }

    /// Number of cards; zero for the empty state.
    pub fn len(&self) -> usize {
        match self {
            ReportListView::Empty { .. } => 0,
            ReportListView::Items { cards } => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cards(&self) -> &[ReportCard] {
        match self {
            ReportListView::Empty { .. } => &[],
            ReportListView::Items { cards } => cards,
        }
    }
}

impl Default for ReportListView {
    fn default() -> Self {
        ReportListView::empty()
    }
}

/// One entry in the report list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCard {
    pub id: ReportId,
    pub category: String,
    pub timestamp: String,
    pub description: Option<String>,
    /// `"Location: <lat>, <lon>"`
    pub location: String,
    /// Escaped card markup
    pub html: String,
}

/// One persistent map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: ReportId,
    pub location: Coordinate,
    /// Escaped popup markup
    pub popup_html: String,
}

/// Both halves of a render, in store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReports {
    pub list: ReportListView,
    pub markers: Vec<MarkerView>,
}

#[derive(Serialize)]
struct CardContext<'a> {
    category: &'a str,
    iso_time: String,
    timestamp: &'a str,
    description: Option<&'a str>,
    location: &'a str,
}

#[derive(Serialize)]
struct PopupContext<'a> {
    category: &'a str,
    description: Option<&'a str>,
    coordinates: String,
}

/// Renders cards and popups from the compiled templates.
pub struct Renderer {
    templates: Handlebars<'static>,
}

impl Renderer {
    /// Compiles the card and popup templates.
    pub fn new() -> Result<Self, RenderError> {
        let mut templates = Handlebars::new();
        templates
            .register_template_string(CARD_TEMPLATE, CARD_SOURCE)
            .map_err(|e| RenderError(format!("card template: {e}")))?;
        templates
            .register_template_string(POPUP_TEMPLATE, POPUP_SOURCE)
            .map_err(|e| RenderError(format!("popup template: {e}")))?;
        Ok(Self { templates })
    }

    /// Renders every report in `store`; `now` anchors relative timestamps.
    pub fn render(&self, store: &ReportStore, now: DateTime<Utc>) -> Result<RenderedReports, RenderError> {
        if store.is_empty() {
            return Ok(RenderedReports {
                list: ReportListView::empty(),
                markers: Vec::new(),
            });
        }

        let mut cards = Vec::with_capacity(store.len());
        let mut markers = Vec::with_capacity(store.len());
        for report in store.all() {
            cards.push(self.card(report, now)?);
            markers.push(self.marker(report)?);
        }

        tracing::debug!(reports = cards.len(), "Rendered report list and markers");
        Ok(RenderedReports {
            list: ReportListView::Items { cards },
            markers,
        })
    }

    fn card(&self, report: &Report, now: DateTime<Utc>) -> Result<ReportCard, RenderError> {
        let category = report.category().label();
        let timestamp = format_timestamp(report.created_at(), now);
        let location = format!("Location: {}", report.location());

        let html = self
            .templates
            .render(
                CARD_TEMPLATE,
                &CardContext {
                    category,
                    iso_time: report.created_at().to_rfc3339(),
                    timestamp: &timestamp,
                    description: report.description(),
                    location: &location,
                },
            )
            .map_err(|e| RenderError(format!("card for report {}: {e}", report.id())))?;

        Ok(ReportCard {
            id: report.id(),
            category: category.to_string(),
            timestamp,
            description: report.description().map(String::from),
            location,
            html,
        })
    }

    fn marker(&self, report: &Report) -> Result<MarkerView, RenderError> {
        let popup_html = self
            .templates
            .render(
                POPUP_TEMPLATE,
                &PopupContext {
                    category: report.category().label(),
                    description: report.description(),
                    coordinates: report.location().to_string(),
                },
            )
            .map_err(|e| RenderError(format!("popup for report {}: {e}", report.id())))?;

        Ok(MarkerView {
            id: report.id(),
            location: report.location(),
            popup_html,
        })
    }
}

/// Relative time for recent reports, absolute UTC time otherwise.
///
/// Timestamps in the future (clock skew) read as "Just now".
pub fn format_timestamp(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    if age < chrono::Duration::minutes(1) {
        "Just now".to_string()
    } else if age < chrono::Duration::hours(1) {
        format!("{} min ago", age.num_minutes())
    } else {
        created_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}
