//! Ordered element store.
//!
//! The sequence order is the z-order: index 0 draws first, the last element
//! draws on top. There is no separate z-index. Decorations live beside the
//! sequence and are never returned by element queries.

use crate::attr::Attribute;
use crate::config::{EditorConfig, Limits};
use crate::error::EditError;
use crate::id::ElementId;
use crate::model::*;
use serde::Serialize;
use std::fmt;

/// Direction of a single-step z-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Towards the top (drawn later).
    Up,
    Down,
}

impl ReorderDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for ReorderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "top",
            Self::Down => "bottom",
        })
    }
}

/// Read-only view of everything that gets rendered or exported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub decorations: Vec<Decoration>,
    /// Bottom to top.
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone)]
pub struct SceneStore {
    elements: Vec<Element>,
    decorations: Vec<Decoration>,
    background: Color,
    width: f32,
    height: f32,
}

impl SceneStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            elements: Vec::new(),
            decorations: config.build_decorations(),
            background: config.background,
            width: config.canvas_width,
            height: config.canvas_height,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Bottom-to-top iteration over user elements.
    pub fn iterate(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            width: self.width,
            height: self.height,
            background: self.background,
            decorations: self.decorations.clone(),
            elements: self.elements.clone(),
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append on top with a fresh ID. New elements start unlocked.
    pub fn add(&mut self, draft: NewElement) -> ElementId {
        let id = ElementId::fresh(draft.kind.shape_kind().id_prefix());
        self.elements.push(Element::from_draft(id, draft));
        log::debug!("added {id:?} at index {}", self.elements.len() - 1);
        id
    }

    /// Remove an element. Unknown IDs are a silent no-op (`Ok(None)`).
    pub fn remove(&mut self, id: ElementId) -> Result<Option<Element>, EditError> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        if self.elements[index].is_locked() {
            return Err(EditError::Locked(id));
        }
        log::debug!("removed {id:?} from index {index}");
        Ok(Some(self.elements.remove(index)))
    }

    /// Deep-copy an element on top of the stack, offset by `offset` on both
    /// axes. The copy is unlocked and shares nothing with the source.
    pub fn duplicate(&mut self, id: ElementId, offset: f32) -> Result<ElementId, EditError> {
        let source = self.unlocked(id)?;
        let new_id = ElementId::fresh(source.shape_kind().id_prefix());
        let mut copy = source.with_id(new_id);
        copy.position = copy.position.offset(offset, offset);
        self.elements.push(copy);
        log::debug!("duplicated {id:?} as {new_id:?}");
        Ok(new_id)
    }

    pub fn move_up(&mut self, id: ElementId) -> Result<usize, EditError> {
        self.reorder(id, ReorderDirection::Up)
    }

    pub fn move_down(&mut self, id: ElementId) -> Result<usize, EditError> {
        self.reorder(id, ReorderDirection::Down)
    }

    /// Swap with the adjacent element. Returns the new index. At the
    /// boundary the store is left unchanged and `AtBoundary` is returned.
    pub fn reorder(&mut self, id: ElementId, dir: ReorderDirection) -> Result<usize, EditError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        if self.elements[index].is_locked() {
            return Err(EditError::Locked(id));
        }
        let target = match dir {
            ReorderDirection::Up if index + 1 < self.elements.len() => index + 1,
            ReorderDirection::Down if index > 0 => index - 1,
            _ => return Err(EditError::AtBoundary(id, dir)),
        };
        self.elements.swap(index, target);
        Ok(target)
    }

    /// Lock or unlock. The only mutation a locked element accepts.
    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> Result<(), EditError> {
        let el = self
            .elements
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        el.set_locked(locked);
        Ok(())
    }

    /// Run a lock-checked mutation. The closure works on a copy that only
    /// replaces the stored element when it returns `Ok`.
    pub fn update<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element) -> Result<R, EditError>,
    ) -> Result<R, EditError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        if self.elements[index].is_locked() {
            return Err(EditError::Locked(id));
        }
        let mut draft = self.elements[index].clone();
        let out = f(&mut draft)?;
        self.elements[index] = draft;
        Ok(out)
    }

    pub fn apply_attribute(
        &mut self,
        id: ElementId,
        attr: &Attribute,
        limits: &Limits,
    ) -> Result<(), EditError> {
        self.update(id, |el| el.apply(attr, limits))
    }

    pub fn translate(&mut self, id: ElementId, dx: f32, dy: f32) -> Result<(), EditError> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(EditError::DegenerateGeometry(format!(
                "non-finite translation ({dx}, {dy})"
            )));
        }
        self.update(id, |el| {
            el.position = el.position.offset(dx, dy);
            Ok(())
        })
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn unlocked(&self, id: ElementId) -> Result<&Element, EditError> {
        let el = self
            .get(id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        if el.is_locked() {
            return Err(EditError::Locked(id));
        }
        Ok(el)
    }
}
