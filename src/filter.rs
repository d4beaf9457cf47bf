use std::collections::BTreeSet;
use std::fmt;

/// Sentinel accepted on the command line for "no gender filter".
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenderFilter {
    #[default]
    All,
    Only(String),
}

impl GenderFilter {
    /// `all` (any case) maps to the sentinel, anything else is taken
    /// verbatim.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(raw.to_string())
        }
    }

    pub fn matches(&self, gender: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(g) => g == gender,
        }
    }
}

impl fmt::Display for GenderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All genders"),
            Self::Only(g) => f.write_str(g),
        }
    }
}

/// Current selection of the two dashboard controls. An empty location set
/// means no location filter, never "no rows".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub locations: BTreeSet<String>,
    pub gender: GenderFilter,
}

impl FilterState {
    /// Initial state of a fresh session: every location ticked, all genders.
    pub fn with_locations<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            gender: GenderFilter::All,
        }
    }

    pub fn location_matches(&self, location: &str) -> bool {
        self.locations.is_empty() || self.locations.contains(location)
    }

    pub fn gender_matches(&self, gender: &str) -> bool {
        self.gender.matches(gender)
    }

    /// Flip one location in or out of the selection.
    pub fn toggle_location(&mut self, location: &str) {
        if !self.locations.remove(location) {
            self.locations.insert(location.to_string());
        }
    }

    pub fn is_location_selected(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    pub fn describe(&self) -> String {
        let locations = if self.locations.is_empty() {
            "all locations".to_string()
        } else {
            self.locations.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        format!("{locations} / {}", self.gender)
    }
}
