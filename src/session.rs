//! One viewer's dashboard session: the filter controls' state plus the
//! wiring that turns every control change into a fresh set of charts.

use crate::charts::{render_all, ChartOptions, DashboardCharts};
use crate::dataset::Dataset;
use crate::filter::{FilterState, GenderFilter};
use crate::pipeline::compute;

/// A change made through one of the two filter controls.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    ToggleLocation(String),
    SetLocations(Vec<String>),
    SelectAllLocations,
    /// Empties the selection, which filters nothing.
    ClearLocations,
    SetGender(GenderFilter),
}

/// Everything pushed to the renderer after a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardUpdate {
    pub filter: FilterState,
    pub rows: usize,
    pub charts: DashboardCharts,
}

/// Receives each new set of charts. The terminal UI implements this; so
/// does any `FnMut(&DashboardUpdate)` closure.
pub trait ChartSink {
    fn replace(&mut self, update: &DashboardUpdate);
}

impl<F: FnMut(&DashboardUpdate)> ChartSink for F {
    fn replace(&mut self, update: &DashboardUpdate) {
        self(update)
    }
}

pub struct Session<'a, S: ChartSink> {
    dataset: &'a Dataset,
    options: ChartOptions,
    filter: FilterState,
    sink: S,
}

impl<'a, S: ChartSink> Session<'a, S> {
    /// Start with every location selected and all genders, and push the
    /// initial render to `sink`.
    pub fn new(dataset: &'a Dataset, options: ChartOptions, sink: S) -> Self {
        let filter = FilterState::with_locations(dataset.locations());
        Self::with_filter(dataset, options, filter, sink)
    }

    pub fn with_filter(dataset: &'a Dataset, options: ChartOptions, filter: FilterState, sink: S) -> Self {
        let mut session = Self {
            dataset,
            options,
            filter,
            sink,
        };
        session.refresh();
        session
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Apply one control change, then recompute and re-render once.
    pub fn apply(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::ToggleLocation(location) => self.filter.toggle_location(&location),
            FilterEvent::SetLocations(locations) => {
                self.filter.locations = locations.into_iter().collect();
            }
            FilterEvent::SelectAllLocations => {
                self.filter.locations = self
                    .dataset
                    .locations()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
            FilterEvent::ClearLocations => self.filter.locations.clear(),
            FilterEvent::SetGender(gender) => self.filter.gender = gender,
        }
        self.refresh();
    }

    /// Recompute the view for the current filter and push it to the sink.
    pub fn refresh(&mut self) {
        let view = compute(self.dataset, &self.filter);
        tracing::debug!(
            filter = %self.filter.describe(),
            rows = view.len(),
            "recomputed dashboard"
        );
        if view.is_empty() {
            tracing::debug!("filter selects no transactions");
        }
        let update = DashboardUpdate {
            filter: self.filter.clone(),
            rows: view.len(),
            charts: render_all(&view, &self.options),
        };
        self.sink.replace(&update);
    }
}
