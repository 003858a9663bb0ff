//! Plot-ready series shared by the interactive and static chart backends.

use crate::data::YearValue;
use crate::filter::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// Connected line with a dot per year.
    Line,
    /// One bar per point; points sharing a year overlap.
    Bar,
}

/// An ordered `(year, value)` series plus its axis metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlot {
    pub kind: PlotKind,
    pub points: Vec<YearValue>,
    pub x_label: String,
    pub y_label: String,
}

impl SeriesPlot {
    pub fn new(kind: PlotKind, y_label: impl Into<String>) -> Self {
        Self {
            kind,
            points: Vec::new(),
            x_label: year_axis_label(&Selection::Unselected),
            y_label: y_label.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Year extent; `(0, 1)` when there is nothing to plot.
    pub fn x_range(&self) -> (f64, f64) {
        let mut years = self.points.iter().map(|p| p.year as f64);
        let Some(first) = years.next() else {
            return (0.0, 1.0);
        };
        let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    /// Upper bound of the value axis, which always starts at zero.
    pub fn y_max(&self) -> f64 {
        let max = self
            .points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }
}

/// "Year", or "Year - <state>" while a state is selected.
pub fn year_axis_label(selection: &Selection) -> String {
    match selection.state() {
        Some(state) => format!("Year - {}", state),
        None => "Year".to_string(),
    }
}
