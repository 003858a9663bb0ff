//! Data module - resource fetching, CSV/GeoJSON parsing and typed records

pub mod geometry;
pub mod loader;
pub mod records;
pub mod source;
pub mod tasks;

pub use geometry::{BoundaryCollection, StateBoundary};
pub use loader::{DataLoader, LoadedTable, LoaderError};
pub use records::{DeathRecord, UnemploymentRecord, UnemploymentYearly, YearValue};
pub use source::{LocationSource, Source};
pub use tasks::{spawn_loads, Dataset, LoadEvent};
