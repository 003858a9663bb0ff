//! Chart view models: the death trend line chart and the unemployment bar
//! chart. Both re-aggregate from their records on every selection change.

use crate::charts::series::{year_axis_label, PlotKind, SeriesPlot};
use crate::data::{DeathRecord, UnemploymentRecord, UnemploymentYearly};
use crate::filter::{Selection, SelectionListener};
use crate::stats::{Aggregator, DeathMetric};
use std::sync::Arc;

pub const UNEMPLOYMENT_AXIS_LABEL: &str = "Rate of Unemployment (%)";

/// Line chart of a death metric per year.
#[derive(Debug, Clone)]
pub struct DeathTrendChart {
    records: Arc<Vec<DeathRecord>>,
    metric: DeathMetric,
    selection: Selection,
    plot: SeriesPlot,
}

impl Default for DeathTrendChart {
    fn default() -> Self {
        Self::new()
    }
}

impl DeathTrendChart {
    pub fn new() -> Self {
        let metric = DeathMetric::default();
        Self {
            records: Arc::new(Vec::new()),
            metric,
            selection: Selection::Unselected,
            plot: SeriesPlot::new(PlotKind::Line, metric.axis_label()),
        }
    }

    pub fn set_records(&mut self, records: Arc<Vec<DeathRecord>>) {
        self.records = records;
        self.refresh();
    }

    pub fn metric(&self) -> DeathMetric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: DeathMetric) {
        if metric != self.metric {
            self.metric = metric;
            self.refresh();
        }
    }

    pub fn plot(&self) -> &SeriesPlot {
        &self.plot
    }

    /// Recompute the series from scratch for the current metric and selection.
    pub fn refresh(&mut self) {
        self.plot = SeriesPlot {
            kind: PlotKind::Line,
            points: Aggregator::aggregate_deaths(&self.records, &self.selection, self.metric),
            x_label: year_axis_label(&self.selection),
            y_label: self.metric.axis_label().to_string(),
        };
    }
}

impl SelectionListener for DeathTrendChart {
    fn selection_changed(&mut self, selection: &Selection) {
        self.selection = selection.clone();
        self.refresh();
    }
}

/// Bar chart of yearly mean unemployment.
#[derive(Debug, Clone)]
pub struct UnemploymentChart {
    records: Arc<Vec<UnemploymentRecord>>,
    yearly: Vec<UnemploymentYearly>,
    selection: Selection,
    plot: SeriesPlot,
}

impl Default for UnemploymentChart {
    fn default() -> Self {
        Self::new()
    }
}

impl UnemploymentChart {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            yearly: Vec::new(),
            selection: Selection::Unselected,
            plot: SeriesPlot::new(PlotKind::Bar, UNEMPLOYMENT_AXIS_LABEL),
        }
    }

    pub fn set_records(&mut self, records: Arc<Vec<UnemploymentRecord>>) {
        self.yearly = Aggregator::yearly_unemployment(&records);
        self.records = records;
        self.refresh();
    }

    pub fn plot(&self) -> &SeriesPlot {
        &self.plot
    }

    /// Monthly rates behind a bar; empty in the nationwide view.
    pub fn monthly_breakdown(&self, year: i32) -> Vec<(u32, f64)> {
        match self.selection.state() {
            Some(state) => Aggregator::monthly_unemployment(&self.records, state, year),
            None => Vec::new(),
        }
    }

    pub fn refresh(&mut self) {
        self.plot = SeriesPlot {
            kind: PlotKind::Bar,
            points: Aggregator::aggregate_unemployment(&self.yearly, &self.selection),
            x_label: year_axis_label(&self.selection),
            y_label: UNEMPLOYMENT_AXIS_LABEL.to_string(),
        };
    }
}

impl SelectionListener for UnemploymentChart {
    fn selection_changed(&mut self, selection: &Selection) {
        self.selection = selection.clone();
        self.refresh();
    }
}
