//! Aggregation Module
//! Groups death and unemployment rows by state/year and reduces them to the
//! series the charts and the map are drawn from.

use crate::data::{DeathRecord, UnemploymentRecord, UnemploymentYearly, YearValue};
use crate::filter::Selection;
use std::collections::BTreeMap;

/// Metric plotted by the death trend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeathMetric {
    #[default]
    DeathRate,
    CrudeRate,
    Prescriptions,
}

/// How a metric collapses a year's rows into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
}

impl DeathMetric {
    pub const ALL: [DeathMetric; 3] = [
        DeathMetric::DeathRate,
        DeathMetric::CrudeRate,
        DeathMetric::Prescriptions,
    ];

    /// Name shown in the metric selector.
    pub fn label(self) -> &'static str {
        match self {
            DeathMetric::DeathRate => "Opioid Overdose Death Rate",
            DeathMetric::CrudeRate => "Crude Rate",
            DeathMetric::Prescriptions => "Prescriptions Dispensed by US Retailers",
        }
    }

    pub fn axis_label(self) -> &'static str {
        match self {
            DeathMetric::DeathRate => "Opioid Overdose Death Rate (%)",
            DeathMetric::CrudeRate => "Crude Rate (%)",
            DeathMetric::Prescriptions => "Prescriptions Dispensed by US Retailers (millions)",
        }
    }

    /// File-name friendly identifier.
    pub fn slug(self) -> &'static str {
        match self {
            DeathMetric::DeathRate => "death_rate",
            DeathMetric::CrudeRate => "crude_rate",
            DeathMetric::Prescriptions => "prescriptions",
        }
    }

    pub fn reduction(self) -> Reduction {
        match self {
            DeathMetric::CrudeRate => Reduction::Mean,
            DeathMetric::DeathRate | DeathMetric::Prescriptions => Reduction::Sum,
        }
    }

    fn value_of(self, record: &DeathRecord) -> f64 {
        match self {
            DeathMetric::DeathRate => record.death_rate,
            DeathMetric::CrudeRate => record.crude_rate,
            DeathMetric::Prescriptions => record.prescriptions,
        }
    }
}

/// Sum of the non-NaN values, independent of their order. Empty sums are 0.
pub fn stable_sum(values: &[f64]) -> f64 {
    let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    present.sort_by(f64::total_cmp);
    present.iter().sum()
}

/// Mean of the non-NaN values, or `None` if there are none.
pub fn stable_mean(values: &[f64]) -> Option<f64> {
    let count = values.iter().filter(|v| !v.is_nan()).count();
    if count == 0 {
        return None;
    }
    Some(stable_sum(values) / count as f64)
}

/// Pure aggregation functions over loaded records.
pub struct Aggregator;

impl Aggregator {
    /// Per-year series of `metric` over the records passing `selection`,
    /// ascending by year.
    pub fn aggregate_deaths(
        records: &[DeathRecord],
        selection: &Selection,
        metric: DeathMetric,
    ) -> Vec<YearValue> {
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for record in records.iter().filter(|r| selection.matches(&r.state)) {
            by_year
                .entry(record.year)
                .or_default()
                .push(metric.value_of(record));
        }

        by_year
            .into_iter()
            .filter_map(|(year, values)| {
                let value = match metric.reduction() {
                    Reduction::Sum => Some(stable_sum(&values)),
                    Reduction::Mean => stable_mean(&values),
                };
                value.map(|v| YearValue::new(year, v))
            })
            .collect()
    }

    /// Collapse monthly rows into a yearly mean per state, ordered by state.
    ///
    /// A (state, year) with no usable rate is dropped.
    pub fn yearly_unemployment(records: &[UnemploymentRecord]) -> Vec<UnemploymentYearly> {
        let mut grouped: BTreeMap<&str, BTreeMap<i32, Vec<f64>>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.state.as_str())
                .or_default()
                .entry(record.year)
                .or_default()
                .push(record.rate);
        }

        grouped
            .into_iter()
            .map(|(state, years)| UnemploymentYearly {
                state: state.to_string(),
                data: years
                    .into_iter()
                    .filter_map(|(year, rates)| {
                        stable_mean(&rates).map(|mean| YearValue::new(year, mean))
                    })
                    .collect(),
            })
            .collect()
    }

    /// Yearly unemployment for the selection.
    ///
    /// A selected state yields only its own sequence (empty if unknown). No
    /// selection yields every state's sequence flattened and sorted by year,
    /// states in name order within a year.
    pub fn aggregate_unemployment(
        yearly: &[UnemploymentYearly],
        selection: &Selection,
    ) -> Vec<YearValue> {
        match selection {
            Selection::Selected(state) => yearly
                .iter()
                .find(|entry| &entry.state == state)
                .map(|entry| entry.data.clone())
                .unwrap_or_default(),
            Selection::Unselected => {
                let mut all: Vec<YearValue> =
                    yearly.iter().flat_map(|entry| entry.data.iter().copied()).collect();
                all.sort_by_key(|point| point.year);
                all
            }
        }
    }

    /// Monthly rates behind one (state, year) bar, ascending by month.
    pub fn monthly_unemployment(
        records: &[UnemploymentRecord],
        state: &str,
        year: i32,
    ) -> Vec<(u32, f64)> {
        let mut months: Vec<(u32, f64)> = records
            .iter()
            .filter(|r| r.state == state && r.year == year && !r.rate.is_nan())
            .filter_map(|r| r.month.map(|m| (m, r.rate)))
            .collect();
        months.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        months
    }

    /// Total deaths per state, for choropleth coloring.
    pub fn aggregate_deaths_by_state(records: &[DeathRecord]) -> BTreeMap<String, f64> {
        let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.state.as_str())
                .or_default()
                .push(record.deaths);
        }

        grouped
            .into_iter()
            .map(|(state, deaths)| (state.to_string(), stable_sum(&deaths)))
            .collect()
    }

    /// Color scale domain `[0, max total]`; `[0, 0]` when there are no states.
    pub fn color_domain(deaths_by_state: &BTreeMap<String, f64>) -> (f64, f64) {
        let max = deaths_by_state
            .values()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        (0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death(state: &str, year: i32, deaths: f64, population: f64, crude: f64, rx: f64) -> DeathRecord {
        DeathRecord::new(state, year, deaths, population, crude, rx)
    }

    fn sample() -> Vec<DeathRecord> {
        vec![
            death("Ohio", 2015, 3050.0, 11_613_423.0, 26.3, 240.0),
            death("Ohio", 2016, 4329.0, 11_614_373.0, 37.3, 225.0),
            death("Texas", 2015, 1186.0, 27_469_114.0, 4.3, 240.0),
            death("Texas", 2016, 1375.0, 27_862_596.0, 4.9, 225.0),
            death("Maine", 2016, 376.0, 1_331_479.0, f64::NAN, 225.0),
            death("Utah", 2014, 289.0, 2_942_902.0, f64::NAN, 245.0),
        ]
    }

    fn unemployment(state: &str, year: i32, month: u32, rate: f64) -> UnemploymentRecord {
        UnemploymentRecord::new(state, year, Some(month), rate)
    }

    #[test]
    fn death_rate_sums_per_year_ascending() {
        let records = sample();
        let series = Aggregator::aggregate_deaths(&records, &Selection::Unselected, DeathMetric::DeathRate);

        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2014, 2015, 2016]);

        let expected_2015 = stable_sum(&[records[0].death_rate, records[2].death_rate]);
        assert_eq!(series[1].value, expected_2015);
    }

    #[test]
    fn crude_rate_mean_ignores_nan_and_omits_all_nan_years() {
        let series = Aggregator::aggregate_deaths(&sample(), &Selection::Unselected, DeathMetric::CrudeRate);

        // 2014 only has Utah with a NaN crude rate.
        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2015, 2016]);
        assert!((series[1].value - (37.3 + 4.9) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn prescriptions_sum() {
        let series = Aggregator::aggregate_deaths(
            &sample(),
            &Selection::Selected("Texas".into()),
            DeathMetric::Prescriptions,
        );
        assert_eq!(series, vec![YearValue::new(2015, 240.0), YearValue::new(2016, 225.0)]);
    }

    #[test]
    fn filter_keeps_only_selected_state() {
        let records = sample();
        let series = Aggregator::aggregate_deaths(
            &records,
            &Selection::Selected("Ohio".into()),
            DeathMetric::DeathRate,
        );

        assert_eq!(
            series,
            vec![
                YearValue::new(2015, records[0].death_rate),
                YearValue::new(2016, records[1].death_rate),
            ]
        );
    }

    #[test]
    fn null_selection_equals_grouping_everything() {
        let records = sample();
        for metric in DeathMetric::ALL {
            let unselected = Aggregator::aggregate_deaths(&records, &Selection::Unselected, metric);

            let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
            for r in &records {
                by_year.entry(r.year).or_default().push(metric.value_of(r));
            }
            let manual: Vec<YearValue> = by_year
                .into_iter()
                .filter_map(|(year, vals)| {
                    let v = match metric.reduction() {
                        Reduction::Sum => Some(stable_sum(&vals)),
                        Reduction::Mean => stable_mean(&vals),
                    };
                    v.map(|v| YearValue::new(year, v))
                })
                .collect();

            assert_eq!(unselected, manual, "metric {:?}", metric);
        }
    }

    #[test]
    fn order_independent() {
        let records = sample();
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        for metric in DeathMetric::ALL {
            for selection in [Selection::Unselected, Selection::Selected("Ohio".into())] {
                let a = Aggregator::aggregate_deaths(&records, &selection, metric);
                let b = Aggregator::aggregate_deaths(&reversed, &selection, metric);
                let c = Aggregator::aggregate_deaths(&rotated, &selection, metric);
                assert_eq!(a, b);
                assert_eq!(a, c);
                assert_eq!(a, Aggregator::aggregate_deaths(&records, &selection, metric));
            }
        }
    }

    #[test]
    fn zero_population_rate_is_excluded_from_sum() {
        let records = vec![
            death("Ohio", 2015, 10.0, 1000.0, 1.0, 1.0),
            death("Ohio", 2015, 5.0, 0.0, 1.0, 1.0),
        ];
        let series = Aggregator::aggregate_deaths(&records, &Selection::Unselected, DeathMetric::DeathRate);
        assert_eq!(series, vec![YearValue::new(2015, 1.0)]);
    }

    #[test]
    fn empty_inputs_give_empty_series() {
        for metric in DeathMetric::ALL {
            assert!(Aggregator::aggregate_deaths(&[], &Selection::Unselected, metric).is_empty());
            assert!(Aggregator::aggregate_deaths(&[], &Selection::Selected("Ohio".into()), metric).is_empty());
            assert!(Aggregator::aggregate_deaths(&sample(), &Selection::Selected("Narnia".into()), metric)
                .is_empty());
        }
        assert!(Aggregator::yearly_unemployment(&[]).is_empty());
        assert!(Aggregator::aggregate_unemployment(&[], &Selection::Unselected).is_empty());
        assert!(Aggregator::aggregate_deaths_by_state(&[]).is_empty());
    }

    #[test]
    fn monthly_rates_collapse_to_yearly_mean() {
        let records = vec![
            unemployment("Ohio", 2020, 1, 5.0),
            unemployment("Ohio", 2020, 2, 6.0),
            unemployment("Ohio", 2020, 3, 7.0),
        ];
        let yearly = Aggregator::yearly_unemployment(&records);

        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].state, "Ohio");
        assert_eq!(yearly[0].data, vec![YearValue::new(2020, 6.0)]);
    }

    #[test]
    fn unemployment_selection_and_flattening() {
        let records = vec![
            unemployment("Texas", 2021, 1, 6.0),
            unemployment("Ohio", 2020, 1, 5.0),
            unemployment("Texas", 2020, 1, 7.0),
            unemployment("Ohio", 2021, 1, 4.0),
            unemployment("Utah", 2021, 1, f64::NAN),
        ];
        let yearly = Aggregator::yearly_unemployment(&records);

        let texas = Aggregator::aggregate_unemployment(&yearly, &Selection::Selected("Texas".into()));
        assert_eq!(texas, vec![YearValue::new(2020, 7.0), YearValue::new(2021, 6.0)]);

        // Utah's only year is all NaN and is dropped.
        let utah = Aggregator::aggregate_unemployment(&yearly, &Selection::Selected("Utah".into()));
        assert!(utah.is_empty());

        let unknown = Aggregator::aggregate_unemployment(&yearly, &Selection::Selected("Narnia".into()));
        assert!(unknown.is_empty());

        let all = Aggregator::aggregate_unemployment(&yearly, &Selection::Unselected);
        assert_eq!(
            all,
            vec![
                YearValue::new(2020, 5.0),
                YearValue::new(2020, 7.0),
                YearValue::new(2021, 4.0),
                YearValue::new(2021, 6.0),
            ]
        );
    }

    #[test]
    fn monthly_breakdown_is_sorted_and_skips_unknown_months() {
        let records = vec![
            unemployment("Ohio", 2020, 3, 7.0),
            unemployment("Ohio", 2020, 1, 5.0),
            UnemploymentRecord::new("Ohio", 2020, None, 9.0),
            unemployment("Ohio", 2021, 1, 4.0),
        ];
        assert_eq!(
            Aggregator::monthly_unemployment(&records, "Ohio", 2020),
            vec![(1, 5.0), (3, 7.0)]
        );
    }

    #[test]
    fn color_domain_uses_max_state_total() {
        let records = vec![
            death("A", 2015, 4.0, 100.0, 1.0, 1.0),
            death("A", 2016, 6.0, 100.0, 1.0, 1.0),
            death("B", 2015, 50.0, 100.0, 1.0, 1.0),
            death("C", 2015, 5.0, 100.0, 1.0, 1.0),
            death("C", 2016, f64::NAN, 100.0, 1.0, 1.0),
        ];
        let totals = Aggregator::aggregate_deaths_by_state(&records);

        assert_eq!(totals["A"], 10.0);
        assert_eq!(totals["C"], 5.0);
        assert_eq!(Aggregator::color_domain(&totals), (0.0, 50.0));
        assert_eq!(Aggregator::color_domain(&BTreeMap::new()), (0.0, 0.0));
    }
}
