use crate::id::ElementId;
use serde::Serialize;

/// The single active selection.
///
/// Whether a handle is attached is decided by the session from the lock
/// state of the selected element; a locked element can still be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Selected(ElementId),
}

impl Selection {
    /// Select `id`. Returns `false` when it was already selected.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.is_selected(id) {
            return false;
        }
        *self = Self::Selected(id);
        true
    }

    /// Clear the selection. Returns the previously selected ID.
    pub fn clear(&mut self) -> Option<ElementId> {
        std::mem::take(self).selected()
    }

    pub fn selected(&self) -> Option<ElementId> {
        match self {
            Self::None => None,
            Self::Selected(id) => Some(*id),
        }
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected() == Some(id)
    }
}
