//! Filter module - cross-filter selection state

mod coordinator;

pub use coordinator::{Click, ClickRouter, Coordinator, Selection, SelectionListener};
