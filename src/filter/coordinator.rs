//! Cross-Filter Coordinator
//! Owns the selected state and routes map clicks into selection transitions.

use tracing::info;

/// Current cross-filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nationwide view: aggregate across all states.
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    pub fn state(&self) -> Option<&str> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(name) => Some(name),
        }
    }

    /// Whether a record for `state` passes this filter.
    pub fn matches(&self, state: &str) -> bool {
        match self {
            Selection::Unselected => true,
            Selection::Selected(name) => name == state,
        }
    }
}

/// A resolved click, after region hits have had their chance to stop propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Click {
    Region(String),
    Background,
}

/// Receives every selection change.
pub trait SelectionListener {
    fn selection_changed(&mut self, selection: &Selection);
}

/// Collects the click candidates of one UI frame and resolves them in order.
///
/// A region hit is resolved first and stops propagation, so the background
/// handler never sees a click that landed on a region. Clicks consumed by
/// controls (metric selector, buttons) never reach the background either.
#[derive(Debug, Default)]
pub struct ClickRouter {
    region: Option<String>,
    consumed: bool,
}

impl ClickRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A click landed on the named map region.
    pub fn region_clicked(&mut self, name: impl Into<String>) {
        if self.region.is_none() {
            self.region = Some(name.into());
        }
        self.consumed = true;
    }

    /// A control handled the click; it must not reset the selection.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Resolve the frame. `pointer_clicked` is whether any primary click happened.
    pub fn resolve(self, pointer_clicked: bool) -> Option<Click> {
        if let Some(name) = self.region {
            return Some(Click::Region(name));
        }
        if pointer_clicked && !self.consumed {
            return Some(Click::Background);
        }
        None
    }
}

/// Two-state selection machine: `Unselected` and `Selected(state)`.
#[derive(Debug, Default)]
pub struct Coordinator {
    selection: Selection,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply a click. Listeners are notified only when the selection changes.
    ///
    /// Returns whether a transition happened.
    pub fn dispatch(&mut self, click: Click, listeners: &mut [&mut dyn SelectionListener]) -> bool {
        let next = match click {
            Click::Region(name) => Selection::Selected(name),
            Click::Background => Selection::Unselected,
        };

        if next == self.selection {
            return false;
        }

        info!(from = ?self.selection, to = ?next, "Selection changed");
        self.selection = next;
        for listener in listeners.iter_mut() {
            listener.selection_changed(&self.selection);
        }
        true
    }
}
