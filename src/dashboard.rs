//! Dashboard State
//! Dataset slots, the cross-filter coordinator and the three linked views.

use crate::charts::{ChoroplethMap, DeathTrendChart, UnemploymentChart};
use crate::data::{Dataset, DeathRecord, LoadEvent, UnemploymentRecord};
use crate::filter::{Click, ClickRouter, Coordinator, Selection};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct Dashboard {
    coordinator: Coordinator,
    pub trend: DeathTrendChart,
    pub unemployment: UnemploymentChart,
    pub map: ChoroplethMap,
    deaths_data: Dataset<Arc<Vec<DeathRecord>>>,
    unemployment_data: Dataset<Arc<Vec<UnemploymentRecord>>>,
    boundary_count: Dataset<usize>,
}

impl Dashboard {
    pub fn new(map_width: u32, map_height: u32) -> Self {
        Self {
            coordinator: Coordinator::new(),
            trend: DeathTrendChart::new(),
            unemployment: UnemploymentChart::new(),
            map: ChoroplethMap::new(map_width, map_height),
            deaths_data: Dataset::Loading,
            unemployment_data: Dataset::Loading,
            boundary_count: Dataset::Loading,
        }
    }

    pub fn selection(&self) -> &Selection {
        self.coordinator.selection()
    }

    /// Feed one finished load into its slot and the views that use it.
    pub fn apply(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Deaths(Ok(table)) => {
                info!(rows = table.rows.len(), skipped = table.rows_skipped, "Death records ready");
                let records = Arc::new(table.rows);
                self.map.set_deaths(&records);
                self.trend.set_records(Arc::clone(&records));
                self.deaths_data = Dataset::Ready(records);
            }
            LoadEvent::Deaths(Err(e)) => {
                error!(error = %e, "Death records failed to load");
                self.deaths_data = Dataset::Failed(e.to_string());
            }
            LoadEvent::Unemployment(Ok(table)) => {
                info!(rows = table.rows.len(), skipped = table.rows_skipped, "Unemployment records ready");
                let records = Arc::new(table.rows);
                self.unemployment.set_records(Arc::clone(&records));
                self.unemployment_data = Dataset::Ready(records);
            }
            LoadEvent::Unemployment(Err(e)) => {
                error!(error = %e, "Unemployment records failed to load");
                self.unemployment_data = Dataset::Failed(e.to_string());
            }
            LoadEvent::Boundaries(Ok(boundaries)) => {
                if boundaries.is_empty() {
                    warn!("Boundary collection has no polygon regions");
                }
                info!(regions = boundaries.len(), "Boundaries ready");
                self.map.set_boundaries(&boundaries);
                self.boundary_count = Dataset::Ready(boundaries.len());
            }
            LoadEvent::Boundaries(Err(e)) => {
                error!(error = %e, "Boundaries failed to load");
                self.boundary_count = Dataset::Failed(e.to_string());
            }
        }
    }

    /// All loads have finished, successfully or not.
    pub fn is_ready(&self) -> bool {
        !self.deaths_data.is_loading()
            && !self.unemployment_data.is_loading()
            && !self.boundary_count.is_loading()
    }

    /// Route a resolved click through the coordinator to every view.
    pub fn handle_click(&mut self, click: Click) -> bool {
        self.coordinator.dispatch(
            click,
            &mut [&mut self.trend, &mut self.unemployment, &mut self.map],
        )
    }

    /// Resolve one UI frame's clicks and dispatch the result, if any.
    ///
    /// `pointer_clicked` is any primary click in the window. A click that hit
    /// no region and no control is a background click.
    pub fn resolve_frame(&mut self, router: ClickRouter, pointer_clicked: bool) -> bool {
        match router.resolve(pointer_clicked) {
            Some(click) => self.handle_click(click),
            None => false,
        }
    }

    /// One human-readable status line per dataset.
    pub fn status_lines(&self) -> Vec<(&'static str, String)> {
        fn line<T>(data: &Dataset<T>, ready: impl Fn(&T) -> String) -> String {
            match data {
                Dataset::Loading => "Loading...".to_string(),
                Dataset::Ready(value) => ready(value),
                Dataset::Failed(reason) => format!("Error: {}", reason),
            }
        }

        vec![
            (
                "Overdose deaths",
                line(&self.deaths_data, |r| format!("{} rows", r.len())),
            ),
            (
                "Unemployment",
                line(&self.unemployment_data, |r| format!("{} rows", r.len())),
            ),
            (
                "Boundaries",
                line(&self.boundary_count, |n| format!("{} regions", n)),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;
    use crate::data::{spawn_loads, DataLoader, LoaderError, Source, YearValue};
    use crate::stats::{Aggregator, DeathMetric};
    use std::collections::HashMap;

    const DEATHS_CSV: &str = "\
State,Year,Deaths,Population,Crude Rate,Prescriptions Dispensed by US Retailers in that year (millions)
Texas,2015,1186,27469114,4.3,240.99
Texas,2016,1375,27862596,4.9,225.0
Ohio,2015,3050,11613423,26.3,240.99
";

    const UNEMPLOYMENT_CSV: &str = "\
State/Area,Year,Month,Percent (%) of Labor Force Unemployed in State/Area
Texas,2020,1,5.0
Texas,2020,2,6.0
Texas,2020,3,7.0
Ohio,2020,1,4.0
";

    const BOUNDARIES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "Texas"},
         "geometry": {"type": "Polygon", "coordinates": [[[-106.6, 31.9], [-94.0, 31.9], [-94.0, 36.5], [-106.6, 36.5], [-106.6, 31.9]]]}}
    ]}"#;

    struct MemorySource(HashMap<&'static str, &'static str>);

    impl Source for MemorySource {
        fn fetch(&self, location: &str) -> Result<Vec<u8>, LoaderError> {
            self.0
                .get(location)
                .map(|body| body.as_bytes().to_vec())
                .ok_or_else(|| LoaderError::Fetch {
                    location: location.to_string(),
                    reason: "connection refused".to_string(),
                })
        }
    }

    fn sources() -> SourcesConfig {
        SourcesConfig {
            deaths: "deaths.csv".into(),
            unemployment: "unemployment.csv".into(),
            boundaries: "map.json".into(),
        }
    }

    fn load(files: &[(&'static str, &'static str)]) -> Dashboard {
        let loader = DataLoader::new(Arc::new(MemorySource(files.iter().copied().collect())));
        let rx = spawn_loads(loader, &sources());

        let mut dashboard = Dashboard::new(400, 250);
        for _ in 0..3 {
            dashboard.apply(rx.recv().unwrap());
        }
        dashboard
    }

    #[test]
    fn loads_join_and_feed_views() {
        let dashboard = load(&[
            ("deaths.csv", DEATHS_CSV),
            ("unemployment.csv", UNEMPLOYMENT_CSV),
            ("map.json", BOUNDARIES),
        ]);

        assert!(dashboard.is_ready());
        assert_eq!(dashboard.trend.plot().points.len(), 2);
        assert_eq!(dashboard.unemployment.plot().points.len(), 2);
        assert_eq!(dashboard.map.regions().len(), 1);
        assert_eq!(dashboard.map.max_deaths(), 3050.0);
    }

    #[test]
    fn one_failed_load_leaves_the_others_intact() {
        let dashboard = load(&[("deaths.csv", DEATHS_CSV), ("map.json", BOUNDARIES)]);

        assert!(dashboard.is_ready());
        assert!(dashboard.unemployment.plot().is_empty());
        assert!(!dashboard.trend.plot().is_empty());

        let status = dashboard.status_lines();
        assert_eq!(status[0].1, "3 rows");
        assert!(status[1].1.starts_with("Error: "));
        assert_eq!(status[2].1, "1 regions");
    }

    #[test]
    fn clicking_texas_then_background_reaggregates_both_charts() {
        let mut dashboard = load(&[
            ("deaths.csv", DEATHS_CSV),
            ("unemployment.csv", UNEMPLOYMENT_CSV),
            ("map.json", BOUNDARIES),
        ]);
        let nationwide_trend = dashboard.trend.plot().clone();
        let nationwide_bars = dashboard.unemployment.plot().clone();

        assert!(dashboard.handle_click(Click::Region("Texas".into())));
        assert_eq!(dashboard.selection(), &Selection::Selected("Texas".into()));
        assert_eq!(dashboard.map.highlighted(), Some("Texas"));

        let texas = Selection::Selected("Texas".into());
        let deaths = crate::data::DataLoader::map_csv::<crate::data::loader::DeathRowMapper>(
            DEATHS_CSV.as_bytes().to_vec(),
        )
        .unwrap()
        .rows;
        assert_eq!(
            dashboard.trend.plot().points,
            Aggregator::aggregate_deaths(&deaths, &texas, DeathMetric::DeathRate)
        );
        assert_eq!(dashboard.trend.plot().x_label, "Year - Texas");
        assert_eq!(dashboard.unemployment.plot().points, vec![YearValue::new(2020, 6.0)]);
        assert_eq!(dashboard.unemployment.plot().x_label, "Year - Texas");

        assert!(dashboard.handle_click(Click::Background));
        assert_eq!(dashboard.selection(), &Selection::Unselected);
        assert_eq!(dashboard.map.highlighted(), None);
        assert_eq!(dashboard.trend.plot(), &nationwide_trend);
        assert_eq!(dashboard.unemployment.plot(), &nationwide_bars);
    }

    #[test]
    fn click_outside_regions_and_controls_clears_selection() {
        let mut dashboard = Dashboard::new(400, 250);
        dashboard.handle_click(Click::Region("Texas".into()));

        // A frame without any click leaves the selection alone.
        assert!(!dashboard.resolve_frame(ClickRouter::new(), false));
        assert_eq!(dashboard.selection(), &Selection::Selected("Texas".into()));

        // A click on a control is consumed.
        let mut router = ClickRouter::new();
        router.consume();
        assert!(!dashboard.resolve_frame(router, true));
        assert_eq!(dashboard.selection(), &Selection::Selected("Texas".into()));

        // A click on a region wins over the frame click.
        let mut router = ClickRouter::new();
        router.region_clicked("Ohio");
        assert!(dashboard.resolve_frame(router, true));
        assert_eq!(dashboard.selection(), &Selection::Selected("Ohio".into()));

        // A click anywhere else, charts and panels included, resets.
        assert!(dashboard.resolve_frame(ClickRouter::new(), true));
        assert_eq!(dashboard.selection(), &Selection::Unselected);
        assert_eq!(dashboard.map.highlighted(), None);
        assert_eq!(dashboard.trend.plot().x_label, "Year");
    }

    #[test]
    fn selection_made_before_data_arrives_is_applied_on_load() {
        let mut dashboard = Dashboard::new(400, 250);
        dashboard.handle_click(Click::Region("Ohio".into()));

        let loader = DataLoader::new(Arc::new(MemorySource(
            [("deaths.csv", DEATHS_CSV)].into_iter().collect(),
        )));
        dashboard.apply(LoadEvent::Deaths(loader.load_deaths("deaths.csv")));

        assert_eq!(dashboard.trend.plot().points.len(), 1);
        assert_eq!(dashboard.trend.plot().points[0].year, 2015);
        assert!(!dashboard.is_ready());
    }
}
