//! Dataset Loader Module
//! Fetches the overdose, unemployment and boundary resources and maps them into
//! typed records. CSV parsing goes through Polars.

use crate::data::geometry::{BoundaryCollection, GeometryError};
use crate::data::records::{DeathRecord, UnemploymentRecord};
use crate::data::source::Source;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Invalid boundary geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Rows mapped from one CSV resource.
#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    /// Rows dropped because a grouping key (state or year) was unusable.
    pub rows_skipped: usize,
}

/// Column-major view over a parsed CSV, restricted to the columns a mapper asked for.
pub struct ColumnTable {
    height: usize,
    text: HashMap<&'static str, Vec<Option<String>>>,
    numeric: HashMap<&'static str, Vec<f64>>,
}

/// One row of a [`ColumnTable`].
pub struct CsvRow<'a> {
    table: &'a ColumnTable,
    index: usize,
}

impl CsvRow<'_> {
    /// Trimmed, non-empty text value of a text column.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.table
            .text
            .get(column)
            .and_then(|values| values.get(self.index))
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// Numeric value of a numeric column; unparsable text and blanks are NaN.
    pub fn number(&self, column: &str) -> f64 {
        self.table
            .numeric
            .get(column)
            .and_then(|values| values.get(self.index))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Numeric value interpreted as a whole number, if it is one.
    pub fn whole(&self, column: &str) -> Option<i64> {
        let v = self.number(column);
        if v.is_finite() && v.fract() == 0.0 {
            Some(v as i64)
        } else {
            None
        }
    }
}

/// Maps rows of a named-column CSV into a typed record.
pub trait RowMapper {
    type Row;

    const TEXT_COLUMNS: &'static [&'static str];
    const NUMERIC_COLUMNS: &'static [&'static str];

    /// Returns `None` when the row cannot be keyed and must be skipped.
    fn map_row(row: &CsvRow<'_>) -> Option<Self::Row>;
}

/// Overdose-death CSV schema.
pub struct DeathRowMapper;

impl DeathRowMapper {
    pub const STATE: &'static str = "State";
    pub const YEAR: &'static str = "Year";
    pub const DEATHS: &'static str = "Deaths";
    pub const POPULATION: &'static str = "Population";
    pub const CRUDE_RATE: &'static str = "Crude Rate";
    pub const PRESCRIPTIONS: &'static str =
        "Prescriptions Dispensed by US Retailers in that year (millions)";
}

impl RowMapper for DeathRowMapper {
    type Row = DeathRecord;

    const TEXT_COLUMNS: &'static [&'static str] = &[Self::STATE];
    const NUMERIC_COLUMNS: &'static [&'static str] = &[
        Self::YEAR,
        Self::DEATHS,
        Self::POPULATION,
        Self::CRUDE_RATE,
        Self::PRESCRIPTIONS,
    ];

    fn map_row(row: &CsvRow<'_>) -> Option<DeathRecord> {
        let state = row.text(Self::STATE)?;
        let year = i32::try_from(row.whole(Self::YEAR)?).ok()?;

        Some(DeathRecord::new(
            state,
            year,
            row.number(Self::DEATHS),
            row.number(Self::POPULATION),
            row.number(Self::CRUDE_RATE),
            row.number(Self::PRESCRIPTIONS),
        ))
    }
}

/// Unemployment CSV schema.
pub struct UnemploymentRowMapper;

impl UnemploymentRowMapper {
    pub const STATE: &'static str = "State/Area";
    pub const YEAR: &'static str = "Year";
    pub const MONTH: &'static str = "Month";
    pub const RATE: &'static str = "Percent (%) of Labor Force Unemployed in State/Area";
}

impl RowMapper for UnemploymentRowMapper {
    type Row = UnemploymentRecord;

    const TEXT_COLUMNS: &'static [&'static str] = &[Self::STATE];
    const NUMERIC_COLUMNS: &'static [&'static str] = &[Self::YEAR, Self::MONTH, Self::RATE];

    fn map_row(row: &CsvRow<'_>) -> Option<UnemploymentRecord> {
        let state = row.text(Self::STATE)?;
        let year = i32::try_from(row.whole(Self::YEAR)?).ok()?;
        let month = row
            .whole(Self::MONTH)
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m));

        Some(UnemploymentRecord::new(
            state,
            year,
            month,
            row.number(Self::RATE),
        ))
    }
}

/// Loads dataset resources through a [`Source`].
#[derive(Clone)]
pub struct DataLoader {
    source: Arc<dyn Source>,
}

impl DataLoader {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self { source }
    }

    /// Parse CSV bytes into a DataFrame. Malformed cells become nulls.
    pub fn read_csv(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    /// Extract the columns a mapper needs from a DataFrame.
    pub fn column_table<M: RowMapper>(df: &DataFrame) -> Result<ColumnTable, LoaderError> {
        let mut text = HashMap::new();
        for &name in M::TEXT_COLUMNS {
            let column = df
                .column(name)
                .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
            let as_text = column.cast(&DataType::String)?;
            let values: Vec<Option<String>> = as_text
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_string()))
                .collect();
            text.insert(name, values);
        }

        let mut numeric = HashMap::new();
        for &name in M::NUMERIC_COLUMNS {
            let column = df
                .column(name)
                .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
            let as_f64 = column.cast(&DataType::Float64)?;
            let values: Vec<f64> = as_f64
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            numeric.insert(name, values);
        }

        Ok(ColumnTable {
            height: df.height(),
            text,
            numeric,
        })
    }

    /// Map every row of a CSV payload with `M`.
    pub fn map_csv<M: RowMapper>(bytes: Vec<u8>) -> Result<LoadedTable<M::Row>, LoaderError> {
        let df = Self::read_csv(bytes)?;
        let table = Self::column_table::<M>(&df)?;

        let mut rows = Vec::with_capacity(table.height);
        let mut rows_skipped = 0;
        for index in 0..table.height {
            let row = CsvRow {
                table: &table,
                index,
            };
            match M::map_row(&row) {
                Some(record) => rows.push(record),
                None => rows_skipped += 1,
            }
        }

        Ok(LoadedTable { rows, rows_skipped })
    }

    /// Fetch a CSV location and map its rows with `M`.
    pub fn load<M: RowMapper>(&self, location: &str) -> Result<LoadedTable<M::Row>, LoaderError> {
        let bytes = self.source.fetch(location)?;
        let table = Self::map_csv::<M>(bytes)?;

        if table.rows_skipped > 0 {
            warn!(
                %location,
                skipped = table.rows_skipped,
                "Skipped rows without a usable state or year"
            );
        }
        info!(%location, rows = table.rows.len(), "Loaded CSV resource");
        Ok(table)
    }

    pub fn load_deaths(&self, location: &str) -> Result<LoadedTable<DeathRecord>, LoaderError> {
        self.load::<DeathRowMapper>(location)
    }

    pub fn load_unemployment(
        &self,
        location: &str,
    ) -> Result<LoadedTable<UnemploymentRecord>, LoaderError> {
        self.load::<UnemploymentRowMapper>(location)
    }

    /// Fetch and parse the GeoJSON boundary collection.
    pub fn load_boundaries(&self, location: &str) -> Result<BoundaryCollection, LoaderError> {
        let bytes = self.source.fetch(location)?;
        let boundaries = BoundaryCollection::from_geojson_slice(&bytes)?;
        info!(%location, regions = boundaries.len(), "Loaded boundary geometry");
        Ok(boundaries)
    }
}
