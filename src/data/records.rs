//! Typed Records
//! Row types produced by the loader and consumed by the aggregator.

/// One overdose-death row per (state, year).
#[derive(Debug, Clone, PartialEq)]
pub struct DeathRecord {
    pub state: String,
    pub year: i32,
    pub deaths: f64,
    pub population: f64,
    /// Deaths as a percentage of population, derived at load time.
    pub death_rate: f64,
    pub crude_rate: f64,
    pub prescriptions: f64,
}

impl DeathRecord {
    /// Build a record, deriving `death_rate` from deaths and population.
    pub fn new(
        state: impl Into<String>,
        year: i32,
        deaths: f64,
        population: f64,
        crude_rate: f64,
        prescriptions: f64,
    ) -> Self {
        Self {
            state: state.into(),
            year,
            deaths,
            population,
            death_rate: Self::derive_death_rate(deaths, population),
            crude_rate,
            prescriptions,
        }
    }

    /// `deaths / population * 100`, or NaN when the population is not positive.
    pub fn derive_death_rate(deaths: f64, population: f64) -> f64 {
        if population > 0.0 && deaths.is_finite() && population.is_finite() {
            (deaths / population) * 100.0
        } else {
            f64::NAN
        }
    }
}

/// One unemployment row per (state, year, month).
#[derive(Debug, Clone, PartialEq)]
pub struct UnemploymentRecord {
    pub state: String,
    pub year: i32,
    pub month: Option<u32>,
    pub rate: f64,
}

impl UnemploymentRecord {
    pub fn new(state: impl Into<String>, year: i32, month: Option<u32>, rate: f64) -> Self {
        Self {
            state: state.into(),
            year,
            month,
            rate,
        }
    }
}

/// A single plotted point: one value for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Yearly mean unemployment for one state, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct UnemploymentYearly {
    pub state: String,
    pub data: Vec<YearValue>,
}
