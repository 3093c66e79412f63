//! Location method selection.
//!
//! Exactly one method is active. Only explicit user selection changes it;
//! the reset that accompanies every selection is applied by the controller.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the pending coordinate is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocationMethod {
    /// Device geolocation
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// Click on the map
    #[serde(rename = "map")]
    MapPin,
    /// Typed latitude/longitude
    #[serde(rename = "manual")]
    Manual,
}

impl LocationMethod {
    pub const ALL: [LocationMethod; 3] = [
        LocationMethod::Auto,
        LocationMethod::MapPin,
        LocationMethod::Manual,
    ];

    /// Value of the radio input.
    pub const fn as_str(self) -> &'static str {
        match self {
            LocationMethod::Auto => "auto",
            LocationMethod::MapPin => "map",
            LocationMethod::Manual => "manual",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LocationMethod::Auto => "Use my location",
            LocationMethod::MapPin => "Pin on map",
            LocationMethod::Manual => "Enter coordinates",
        }
    }

    /// Whether the method depends on a working map.
    pub const fn requires_map(self) -> bool {
        matches!(self, LocationMethod::MapPin)
    }

    /// Which input panel is shown for this method.
    pub const fn panels(self) -> PanelVisibility {
        PanelVisibility {
            auto: matches!(self, LocationMethod::Auto),
            map: matches!(self, LocationMethod::MapPin),
            manual: matches!(self, LocationMethod::Manual),
        }
    }
}

impl FromStr for LocationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| format!("unknown location method: {s:?}"))
    }
}

impl fmt::Display for LocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Visibility of the three method panels; exactly one is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelVisibility {
    pub auto: bool,
    pub map: bool,
    pub manual: bool,
}

/// The three-state method switch.
#[derive(Debug, Clone, Default)]
pub struct MethodSelector {
    active: LocationMethod,
}

impl MethodSelector {
    pub fn active(&self) -> LocationMethod {
        self.active
    }

    /// Switches to `method`. Re-selecting the active method succeeds.
    ///
    /// Refused when the method needs a map and none is available; the
    /// active method is then left unchanged.
    pub fn select(
        &mut self,
        method: LocationMethod,
        map_available: bool,
    ) -> Result<LocationMethod, ValidationError> {
        if method.requires_map() && !map_available {
            return Err(ValidationError::MethodUnavailable(method));
        }
        self.active = method;
        Ok(method)
    }

    /// Returns to [`LocationMethod::Auto`], which never needs a map.
    pub fn reset(&mut self) {
        self.active = LocationMethod::default();
    }

    /// Errors unless `method` is the active one.
    pub fn require(&self, method: LocationMethod) -> Result<(), ValidationError> {
        if self.active == method {
            Ok(())
        } else {
            Err(ValidationError::WrongMethod {
                attempted: method,
                active: self.active,
            })
        }
    }
}
