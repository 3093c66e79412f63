//! Issue categories offered by the report form.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of issue being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pothole,
    Streetlight,
    Garbage,
    Flooding,
    Vandalism,
    Other,
}

impl Category {
    /// Every category, in the order the select lists them.
    pub const ALL: [Category; 6] = [
        Category::Pothole,
        Category::Streetlight,
        Category::Garbage,
        Category::Flooding,
        Category::Vandalism,
        Category::Other,
    ];

    /// Form value of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Pothole => "pothole",
            Category::Streetlight => "streetlight",
            Category::Garbage => "garbage",
            Category::Flooding => "flooding",
            Category::Vandalism => "vandalism",
            Category::Other => "other",
        }
    }

    /// Human-readable label for lists and popups.
    pub const fn label(self) -> &'static str {
        match self {
            Category::Pothole => "Pothole",
            Category::Streetlight => "Broken Streetlight",
            Category::Garbage => "Uncollected Garbage",
            Category::Flooding => "Flooding",
            Category::Vandalism => "Vandalism",
            Category::Other => "Other",
        }
    }

    /// Interprets the value of the category select.
    ///
    /// The empty placeholder option means nothing is selected.
    pub fn parse_selection(value: &str) -> Result<Option<Category>, ValidationError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
