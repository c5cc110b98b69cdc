//! Editing session: the single owner of scene, selection, and handle.
//!
//! Every mutation goes through [`Session::apply`] (panel intents),
//! [`Session::handle_input`] (canvas pointer and keyboard), or the
//! transform gesture methods. Each returns the list of [`Change`]s the host
//! must re-render; nothing else mutates the scene.

use crate::fonts::{CachedFont, FontCache, FontFormat, FontRegistry};
use crate::gesture::{PointerTarget, SelectTool, ToolAction};
use crate::input::{InputEvent, Modifiers};
use crate::metrics::TextMeasure;
use crate::picture::decode_image;
use crate::projection::{self, PanelState};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::templates;
use crate::transform::TransformEngine;
use serde::Serialize;
use smallvec::SmallVec;
use tk_core::attr::Attribute;
use tk_core::config::EditorConfig;
use tk_core::error::EditError;
use tk_core::id::ElementId;
use tk_core::model::*;
use tk_core::scene::{ReorderDirection, SceneSnapshot, SceneStore};
use tk_core::selection::Selection;
use tk_render::handle::hit_test_handle;
use tk_render::hit::hit_test;

/// A request from the panels (or a resolved shortcut).
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add(NewElement),
    /// Insert the default template for a kind. Pictures need image bytes
    /// and go through [`Session::add_picture`] instead.
    AddDefault(ShapeKind),
    /// Raw panel value, parsed by [`Attribute::parse`].
    SetAttribute {
        id: ElementId,
        key: String,
        value: String,
    },
    SetLocked {
        id: ElementId,
        locked: bool,
    },
    Duplicate(ElementId),
    Delete(ElementId),
    Reorder {
        id: ElementId,
        direction: ReorderDirection,
    },
    Select(Option<ElementId>),
    Move {
        id: ElementId,
        dx: f32,
        dy: f32,
    },
    SetBackground(Color),
}

/// Something the host has to re-render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    Added { id: ElementId },
    Removed { id: ElementId },
    Updated { id: ElementId },
    Reordered { id: ElementId, index: usize },
    SelectionChanged { id: Option<ElementId> },
    /// The handle moved to another element, or detached (`None`).
    HandleChanged { id: Option<ElementId> },
    BackgroundChanged { color: Color },
}

/// A delete the host should confirm with the user before sending
/// `Intent::Delete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteRequest {
    pub id: ElementId,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Applied {
    pub changes: SmallVec<[Change; 4]>,
    pub confirm: Option<DeleteRequest>,
}

impl Applied {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.confirm.is_none()
    }

    /// The first element added by this operation.
    pub fn added(&self) -> Option<ElementId> {
        self.changes.iter().find_map(|c| match c {
            Change::Added { id } => Some(*id),
            _ => None,
        })
    }

    fn push(&mut self, change: Change) {
        self.changes.push(change);
    }
}

/// An in-flight resize or rotation.
#[derive(Debug, Clone, Copy)]
struct Gesture {
    id: ElementId,
    last: BoundingBox,
}

pub struct Session {
    config: EditorConfig,
    store: SceneStore,
    selection: Selection,
    engine: TransformEngine,
    fonts: FontRegistry,
    font_cache: FontCache,
    measure: Box<dyn TextMeasure>,
    tool: SelectTool,
    gesture: Option<Gesture>,
}

impl Session {
    pub fn new(config: EditorConfig, measure: Box<dyn TextMeasure>) -> Self {
        let engine = TransformEngine::new(config.limits.clone(), config.text_resize_mode);
        Self {
            store: SceneStore::new(&config),
            selection: Selection::default(),
            engine,
            fonts: FontRegistry::new(),
            font_cache: FontCache::new(),
            measure,
            tool: SelectTool::new(config.handle.clone()),
            gesture: None,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.store.snapshot()
    }

    /// Replace the text-metrics collaborator. Existing boxes keep their
    /// last measured size until the next text mutation.
    pub fn set_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.measure = measure;
    }

    /// Box of the attached handle, if any.
    pub fn handle_box(&self) -> Option<BoundingBox> {
        let id = self.engine.attached()?;
        self.store.get(id).map(|el| self.engine.element_box(el))
    }

    pub fn panels(&self) -> PanelState {
        PanelState {
            layers: projection::layers(&self.store, &self.selection),
            properties: projection::properties(&self.store, &self.selection),
            handle: projection::handle_view(&self.store, &self.engine, &self.config.handle),
            background: self.store.background(),
            fonts: self.fonts.families().to_vec(),
        }
    }

    // ─── Intents ─────────────────────────────────────────────────────────

    /// Apply one intent. A rejected intent leaves the session unchanged.
    pub fn apply(&mut self, intent: Intent) -> Result<Applied, EditError> {
        let mut out = Applied::default();
        match self.apply_into(intent.clone(), &mut out) {
            Ok(()) => Ok(out),
            Err(e) => {
                log::debug!("rejected {intent:?}: {e}");
                Err(e)
            }
        }
    }

    fn apply_into(&mut self, intent: Intent, out: &mut Applied) -> Result<(), EditError> {
        match intent {
            Intent::Add(draft) => {
                self.add(draft, out)?;
            }
            Intent::AddDefault(kind) => {
                let draft = templates::for_kind(kind).ok_or_else(|| EditError::InvalidValue {
                    key: "kind".into(),
                    reason: format!("{kind} needs image data"),
                })?;
                self.add(draft, out)?;
            }
            Intent::SetAttribute { id, key, value } => {
                let attr = Attribute::parse(&key, &value)?;
                if let Attribute::FontFamily(family) = &attr {
                    self.check_family(family)?;
                }
                let (engine, measure) = (&self.engine, self.measure.as_ref());
                self.store.update(id, |el| {
                    el.apply(&attr, engine.limits())?;
                    if attr.affects_text_metrics() {
                        engine.refit_text(el, measure);
                    }
                    Ok(())
                })?;
                out.push(Change::Updated { id });
            }
            Intent::SetLocked { id, locked } => {
                if locked && self.gesture.is_some_and(|g| g.id == id) {
                    self.settle_gesture(None, out);
                }
                self.store.set_locked(id, locked)?;
                if !locked {
                    self.refit(id)?;
                }
                out.push(Change::Updated { id });
                self.sync_handle(out);
            }
            Intent::Duplicate(id) => {
                let copy = self
                    .store
                    .duplicate(id, self.engine.limits().duplicate_offset)?;
                out.push(Change::Added { id: copy });
                self.select(Some(copy), out);
            }
            Intent::Delete(id) => {
                if self.store.remove(id)?.is_none() {
                    return Ok(());
                }
                out.push(Change::Removed { id });
                if self.gesture.is_some_and(|g| g.id == id) {
                    self.gesture = None;
                    self.tool.cancel();
                }
                if self.selection.is_selected(id) {
                    self.select(None, out);
                }
            }
            Intent::Reorder { id, direction } => {
                let index = self.store.reorder(id, direction)?;
                out.push(Change::Reordered { id, index });
            }
            Intent::Select(target) => {
                if let Some(id) = target
                    && !self.store.contains(id)
                {
                    return Err(EditError::UnknownElement(id.to_string()));
                }
                self.select(target, out);
            }
            Intent::Move { id, dx, dy } => {
                self.store.translate(id, dx, dy)?;
                out.push(Change::Updated { id });
            }
            Intent::SetBackground(color) => {
                self.store.set_background(color);
                out.push(Change::BackgroundChanged { color });
            }
        }
        Ok(())
    }

    fn add(&mut self, mut draft: NewElement, out: &mut Applied) -> Result<ElementId, EditError> {
        draft.validate(self.engine.limits())?;
        if let ElementKind::Text(t) = &draft.kind {
            self.check_family(&t.font_family)?;
        }
        let id = self.store.add(draft);
        self.refit(id)?;
        out.push(Change::Added { id });
        self.select(Some(id), out);
        Ok(id)
    }

    /// Unknown families are rejected; pending ones are accepted and render
    /// with the fallback font until the load finishes.
    fn check_family(&self, family: &str) -> Result<(), EditError> {
        if self.fonts.is_available(family) || self.fonts.is_pending(family) {
            Ok(())
        } else {
            Err(EditError::InvalidValue {
                key: "fontFamily".into(),
                reason: format!("font `{family}` is not registered"),
            })
        }
    }

    /// Re-measure a text element. No-op for other kinds.
    fn refit(&mut self, id: ElementId) -> Result<(), EditError> {
        let (engine, measure) = (&self.engine, self.measure.as_ref());
        self.store.update(id, |el| {
            engine.refit_text(el, measure);
            Ok(())
        })
    }

    /// Request confirmation before deleting `id`.
    pub fn request_delete(&self, id: ElementId) -> Result<DeleteRequest, EditError> {
        let el = self
            .store
            .get(id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        if el.is_locked() {
            return Err(EditError::Locked(id));
        }
        Ok(DeleteRequest {
            id,
            label: el.display_name(),
        })
    }

    // ─── Selection & handle ──────────────────────────────────────────────

    fn select(&mut self, target: Option<ElementId>, out: &mut Applied) {
        let changed = match target {
            Some(id) => self.selection.select(id),
            None => self.selection.clear().is_some(),
        };
        if changed {
            out.push(Change::SelectionChanged { id: target });
        }
        self.sync_handle(out);
    }

    /// Attach the handle to the selected element when it is unlocked,
    /// detach it otherwise.
    fn sync_handle(&mut self, out: &mut Applied) {
        let want = self
            .selection
            .selected()
            .filter(|id| self.store.get(*id).is_some_and(|el| !el.is_locked()));
        self.settle_gesture(want, out);
        if want == self.engine.attached() {
            return;
        }
        match want {
            Some(id) => self.engine.attach(id),
            None => self.engine.detach(),
        }
        out.push(Change::HandleChanged { id: want });
    }

    // ─── Transform gesture ───────────────────────────────────────────────

    /// Commit the in-flight gesture unless it belongs to `keep`. Runs
    /// whenever the handle is about to leave its element.
    fn settle_gesture(&mut self, keep: Option<ElementId>, out: &mut Applied) {
        let Some(gesture) = self.gesture.filter(|g| Some(g.id) != keep) else {
            return;
        };
        self.tool.cancel();
        match self.end_transform() {
            Ok(Some(_)) => out.push(Change::Updated { id: gesture.id }),
            Ok(None) => {}
            Err(e) => log::debug!("dropped transform of {:?}: {e}", gesture.id),
        }
    }

    /// Start resizing or rotating the element the handle is attached to.
    /// Returns the box at gesture start.
    pub fn begin_transform(&mut self, id: ElementId) -> Result<BoundingBox, EditError> {
        let el = self
            .store
            .get(id)
            .ok_or_else(|| EditError::UnknownElement(id.to_string()))?;
        if el.is_locked() {
            return Err(EditError::Locked(id));
        }
        if self.engine.attached() != Some(id) {
            return Err(EditError::InvalidValue {
                key: "transform".into(),
                reason: format!("{id} has no attached handle"),
            });
        }
        let start = self.engine.element_box(el);
        self.gesture = Some(Gesture { id, last: start });
        log::trace!("begin transform of {id:?} at {start:?}");
        Ok(start)
    }

    /// Propose a box for the element being transformed and return the box
    /// actually applied. On `Err` the element keeps its last applied box.
    pub fn propose_transform(&mut self, new: &BoundingBox) -> Result<BoundingBox, EditError> {
        let gesture = self.gesture.as_mut().ok_or_else(|| EditError::InvalidValue {
            key: "transform".into(),
            reason: "no transform in progress".into(),
        })?;
        if self.engine.attached() != Some(gesture.id) {
            return Err(EditError::InvalidValue {
                key: "transform".into(),
                reason: format!("{} has no attached handle", gesture.id),
            });
        }
        let (engine, measure) = (&self.engine, self.measure.as_ref());
        let old = gesture.last;
        let applied = self
            .store
            .update(gesture.id, |el| engine.try_propose(el, &old, new, measure))?;
        gesture.last = applied;
        Ok(applied)
    }

    /// Finish the gesture and bake transient scale into the element.
    /// Returns the committed box, or `None` without a gesture.
    pub fn end_transform(&mut self) -> Result<Option<BoundingBox>, EditError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(None);
        };
        let engine = &self.engine;
        let committed = self.store.update(gesture.id, |el| {
            engine.commit(el);
            Ok(engine.element_box(el))
        })?;
        log::debug!("transformed {:?} to {committed:?}", gesture.id);
        Ok(Some(committed))
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    /// Route a pointer or key event. Pointer coordinates are model units.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<Applied, EditError> {
        if let InputEvent::Key { key, modifiers } = event {
            return self.handle_key(key, modifiers);
        }
        let target = match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_target(*x, *y),
            _ => PointerTarget::Empty,
        };
        let mut out = Applied::default();
        for action in self.tool.handle(event, target) {
            self.run_tool_action(action, &mut out)?;
        }
        Ok(out)
    }

    /// Handle anchors win over element bodies; decorations are never hit.
    fn pointer_target(&self, x: f32, y: f32) -> PointerTarget {
        if let Some(id) = self.engine.attached()
            && let Some(el) = self.store.get(id)
        {
            let current = self.engine.element_box(el);
            if let Some(anchor) = hit_test_handle(&current, x, y, &self.config.handle) {
                return PointerTarget::Anchor {
                    id,
                    anchor,
                    current,
                };
            }
        }
        match hit_test(self.store.iterate(), x, y) {
            Some(id) => PointerTarget::Element {
                id,
                draggable: self.store.get(id).is_some_and(|el| !el.is_locked()),
            },
            None => PointerTarget::Empty,
        }
    }

    fn run_tool_action(&mut self, action: ToolAction, out: &mut Applied) -> Result<(), EditError> {
        match action {
            ToolAction::Select(target) => self.select(target, out),
            ToolAction::Duplicate(id) => self.apply_into(Intent::Duplicate(id), out)?,
            ToolAction::MoveSelected { dx, dy } => {
                let Some(id) = self.selection.selected() else {
                    return Ok(());
                };
                match self.store.translate(id, dx, dy) {
                    Ok(()) => out.push(Change::Updated { id }),
                    Err(e) => log::debug!("drag of {id:?} ignored: {e}"),
                }
            }
            ToolAction::BeginTransform(id) => {
                if let Err(e) = self.begin_transform(id) {
                    self.tool.cancel();
                    return Err(e);
                }
            }
            ToolAction::Propose { id, new } => match self.propose_transform(&new) {
                Ok(_) => out.push(Change::Updated { id }),
                Err(e @ EditError::DegenerateGeometry(_)) => {
                    log::debug!("proposal for {id:?} ignored: {e}");
                }
                Err(e) => return Err(e),
            },
            ToolAction::EndTransform(id) => {
                if self.end_transform()?.is_some() {
                    out.push(Change::Updated { id });
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &str, modifiers: &Modifiers) -> Result<Applied, EditError> {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Ok(Applied::default());
        };
        let Some(id) = self.selection.selected() else {
            return Ok(Applied::default());
        };
        let intent = match action {
            ShortcutAction::Delete => {
                return Ok(Applied {
                    changes: SmallVec::new(),
                    confirm: Some(self.request_delete(id)?),
                });
            }
            ShortcutAction::Duplicate => Intent::Duplicate(id),
            ShortcutAction::MoveUp => Intent::Reorder {
                id,
                direction: ReorderDirection::Up,
            },
            ShortcutAction::MoveDown => Intent::Reorder {
                id,
                direction: ReorderDirection::Down,
            },
            ShortcutAction::ToggleLock => Intent::SetLocked {
                id,
                locked: self.store.get(id).is_some_and(|el| !el.is_locked()),
            },
            ShortcutAction::Deselect => Intent::Select(None),
            ShortcutAction::Nudge { dx, dy } => Intent::Move { id, dx, dy },
        };
        self.apply(intent)
    }

    // ─── Resources ───────────────────────────────────────────────────────

    /// First phase of a font upload: validate the bytes, mark the family
    /// pending and keep the bytes in the font cache.
    pub fn register_font(&mut self, name: &str, bytes: &[u8]) -> Result<FontFormat, EditError> {
        let format = self.fonts.begin(name, bytes)?;
        self.font_cache.insert(name, bytes.to_vec())?;
        Ok(format)
    }

    /// Every uploaded font that loaded (or is loading), as a MessagePack
    /// blob the host can persist.
    pub fn font_cache_bytes(&self) -> Result<Vec<u8>, EditError> {
        self.font_cache.to_bytes()
    }

    /// Start registering every font in a persisted cache. Returns the fonts
    /// now pending; the host loads each one and calls
    /// [`Session::font_load_finished`]. Entries that fail validation are
    /// skipped.
    pub fn restore_fonts(&mut self, bytes: &[u8]) -> Result<Vec<CachedFont>, EditError> {
        let cache = FontCache::from_bytes(bytes)?;
        let mut pending = Vec::with_capacity(cache.fonts().len());
        for font in cache.fonts() {
            match self.register_font(&font.name, &font.bytes) {
                Ok(_) => pending.push(font.clone()),
                Err(e) => log::warn!("skipping cached font `{}`: {e}", font.name),
            }
        }
        Ok(pending)
    }

    /// Second phase: the host finished decoding the face. On success every
    /// unlocked text element using the family is re-measured; locked ones
    /// are re-measured when unlocked.
    pub fn font_load_finished(
        &mut self,
        name: &str,
        outcome: Result<(), String>,
    ) -> Result<Applied, EditError> {
        let was_pending = self.fonts.is_pending(name);
        if let Err(e) = self.fonts.finish(name, outcome) {
            if was_pending {
                self.font_cache.remove(name);
            }
            return Err(e);
        }
        let users: Vec<ElementId> = self
            .store
            .iterate()
            .filter(|el| !el.is_locked())
            .filter(|el| el.as_text().is_some_and(|t| t.font_family == name))
            .map(Element::id)
            .collect();
        let mut out = Applied::default();
        for id in users {
            self.refit(id)?;
            out.push(Change::Updated { id });
        }
        Ok(out)
    }

    /// Insert a picture from encoded image bytes. The host keeps the
    /// decoded pixels under `key`.
    pub fn add_picture(&mut self, key: &str, bytes: &[u8]) -> Result<Applied, EditError> {
        let info = decode_image(bytes).inspect_err(|e| log::warn!("image `{key}`: {e}"))?;
        let draft = templates::picture(key, &info, self.engine.limits());
        let mut out = Applied::default();
        self.add(draft, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ApproxMeasure, FontQuery, MeasureError, TextExtent};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(EditorConfig::default(), Box::new(ApproxMeasure::default()))
    }

    fn add(s: &mut Session, kind: ShapeKind) -> ElementId {
        s.apply(Intent::AddDefault(kind)).unwrap().added().unwrap()
    }

    #[test]
    fn add_selects_and_attaches() {
        let mut s = session();
        let applied = s.apply(Intent::AddDefault(ShapeKind::Rectangle)).unwrap();
        let id = applied.added().unwrap();
        assert_eq!(
            applied.changes.as_slice(),
            &[
                Change::Added { id },
                Change::SelectionChanged { id: Some(id) },
                Change::HandleChanged { id: Some(id) },
            ]
        );
        assert_eq!(s.engine().attached(), Some(id));
    }

    #[test]
    fn added_text_is_measured() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Text);
        let t = s.store().get(id).and_then(Element::as_text).unwrap();
        // 20 chars × 40 × 0.5 + 2, 40 + 2.
        assert_eq!((t.content_width(), t.content_height()), (402.0, 42.0));
    }

    #[test]
    fn set_attribute_refits_text() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Text);
        s.apply(Intent::SetAttribute {
            id,
            key: "text".into(),
            value: "Hi".into(),
        })
        .unwrap();
        let t = s.store().get(id).and_then(Element::as_text).unwrap();
        assert_eq!(t.content_width(), 42.0);
    }

    #[test]
    fn add_rejects_non_finite_placement() {
        let mut s = session();
        let draft = templates::for_kind(ShapeKind::Ellipse).unwrap().at(f32::NAN, 10.0);
        assert!(matches!(
            s.apply(Intent::Add(draft)),
            Err(EditError::InvalidValue { .. })
        ));
        assert_eq!(s.store().len(), 0);
        assert_eq!(s.selection(), Selection::None);
    }

    #[test]
    fn unknown_font_family_is_rejected() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Text);
        let err = s
            .apply(Intent::SetAttribute {
                id,
                key: "fontFamily".into(),
                value: "Nope".into(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), tk_core::ErrorKind::InvalidOperation);
    }

    #[test]
    fn locking_detaches_and_unlocking_reattaches() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Ellipse);
        let applied = s.apply(Intent::SetLocked { id, locked: true }).unwrap();
        assert!(applied
            .changes
            .contains(&Change::HandleChanged { id: None }));
        assert_eq!(s.selection().selected(), Some(id));
        assert_eq!(s.engine().attached(), None);

        s.apply(Intent::SetLocked { id, locked: false }).unwrap();
        assert_eq!(s.engine().attached(), Some(id));
    }

    #[test]
    fn deleting_selected_clears_selection() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Line);
        let applied = s.apply(Intent::Delete(id)).unwrap();
        assert!(applied.changes.contains(&Change::Removed { id }));
        assert_eq!(s.selection(), Selection::None);
        assert_eq!(s.engine().attached(), None);
        // A second delete is a silent no-op.
        assert!(s.apply(Intent::Delete(id)).unwrap().is_empty());
    }

    #[test]
    fn delete_key_asks_for_confirmation() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Rectangle);
        let applied = s
            .handle_input(&InputEvent::key("Delete", Modifiers::NONE))
            .unwrap();
        assert_eq!(
            applied.confirm,
            Some(DeleteRequest {
                id,
                label: "Rectangle".into()
            })
        );
        assert!(s.store().contains(id));
    }

    #[test]
    fn shortcuts_act_on_selection() {
        let mut s = session();
        let a = add(&mut s, ShapeKind::Rectangle);
        s.handle_input(&InputEvent::key("d", Modifiers::NONE.with_cmd()))
            .unwrap();
        assert_eq!(s.store().len(), 2);
        let copy = s.selection().selected().unwrap();
        assert_ne!(copy, a);

        s.handle_input(&InputEvent::key("ArrowRight", Modifiers::NONE.with_shift()))
            .unwrap();
        assert_eq!(s.store().get(copy).unwrap().position, Point::new(80.0, 70.0));

        s.handle_input(&InputEvent::key("l", Modifiers::NONE.with_cmd()))
            .unwrap();
        assert!(s.store().get(copy).unwrap().is_locked());
        s.handle_input(&InputEvent::key("Escape", Modifiers::NONE))
            .unwrap();
        assert_eq!(s.selection(), Selection::None);
    }

    #[test]
    fn click_and_drag_moves_topmost() {
        let mut s = session();
        let rect = add(&mut s, ShapeKind::Rectangle);
        s.apply(Intent::Select(None)).unwrap();

        let none = Modifiers::NONE;
        s.handle_input(&InputEvent::pointer_down(100.0, 100.0, none))
            .unwrap();
        assert_eq!(s.selection().selected(), Some(rect));
        s.handle_input(&InputEvent::pointer_move(110.0, 105.0, none))
            .unwrap();
        s.handle_input(&InputEvent::pointer_up(110.0, 105.0, none))
            .unwrap();
        assert_eq!(s.store().get(rect).unwrap().position, Point::new(60.0, 55.0));

        s.handle_input(&InputEvent::pointer_down(600.0, 10.0, none))
            .unwrap();
        assert_eq!(s.selection(), Selection::None);
    }

    #[test]
    fn corner_drag_resizes_rectangle() {
        let mut s = session();
        let rect = add(&mut s, ShapeKind::Rectangle);
        let none = Modifiers::NONE;
        // Bottom-right corner of the 150×100 rectangle at (50, 50).
        s.handle_input(&InputEvent::pointer_down(200.0, 150.0, none))
            .unwrap();
        s.handle_input(&InputEvent::pointer_move(250.0, 170.0, none))
            .unwrap();
        s.handle_input(&InputEvent::pointer_up(250.0, 170.0, none))
            .unwrap();
        match &s.store().get(rect).unwrap().kind {
            ElementKind::Rectangle(r) => {
                assert!((r.width - 200.0).abs() < 1e-3);
                assert!((r.height - 120.0).abs() < 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(s.store().get(rect).unwrap().scale, Scale::IDENTITY);
    }

    #[test]
    fn transform_requires_attached_handle() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Rectangle);
        s.apply(Intent::SetLocked { id, locked: true }).unwrap();
        assert_eq!(s.begin_transform(id), Err(EditError::Locked(id)));
        assert!(s.propose_transform(&BoundingBox::new(0.0, 0.0, 50.0, 50.0, 0.0)).is_err());
        assert_eq!(s.end_transform(), Ok(None));
    }

    #[test]
    fn selecting_another_element_commits_the_transform() {
        let mut s = session();
        let a = add(&mut s, ShapeKind::Rectangle);
        let b = add(&mut s, ShapeKind::Ellipse);
        s.apply(Intent::Select(Some(a))).unwrap();
        let start = s.begin_transform(a).unwrap();
        let doubled = BoundingBox::new(start.x, start.y, 300.0, 200.0, 0.0);
        s.propose_transform(&doubled).unwrap();

        let applied = s.apply(Intent::Select(Some(b))).unwrap();
        assert!(applied.changes.contains(&Change::Updated { id: a }));
        assert_eq!(s.engine().attached(), Some(b));

        let el = s.store().get(a).unwrap();
        assert_eq!(el.scale, Scale::IDENTITY);
        match &el.kind {
            ElementKind::Rectangle(r) => assert_eq!((r.width, r.height), (300.0, 200.0)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(s.propose_transform(&doubled).is_err());
        assert_eq!(s.end_transform(), Ok(None));
    }

    #[test]
    fn locking_mid_transform_commits_first() {
        let mut s = session();
        let a = add(&mut s, ShapeKind::Rectangle);
        let start = s.begin_transform(a).unwrap();
        s.propose_transform(&BoundingBox::new(start.x, start.y, 300.0, 100.0, 0.0))
            .unwrap();
        s.apply(Intent::SetLocked { id: a, locked: true }).unwrap();

        let el = s.store().get(a).unwrap();
        assert!(el.is_locked());
        assert_eq!(el.scale, Scale::IDENTITY);
        assert_eq!(s.end_transform(), Ok(None));
    }

    #[test]
    fn duplicate_during_transform_leaves_both_at_rest() {
        let mut s = session();
        let a = add(&mut s, ShapeKind::Rectangle);
        let start = s.begin_transform(a).unwrap();
        s.propose_transform(&BoundingBox::new(start.x, start.y, 300.0, 200.0, 0.0))
            .unwrap();
        let copy = s.apply(Intent::Duplicate(a)).unwrap().added().unwrap();
        assert_eq!(s.end_transform(), Ok(None));

        for id in [a, copy] {
            let el = s.store().get(id).unwrap();
            assert_eq!(el.scale, Scale::IDENTITY);
            match &el.kind {
                ElementKind::Rectangle(r) => assert_eq!((r.width, r.height), (300.0, 200.0)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    /// Width depends on every style input so a missed refit shows up.
    struct StyleSensitive;

    impl TextMeasure for StyleSensitive {
        fn measure(&self, q: &FontQuery<'_>) -> Result<TextExtent, MeasureError> {
            let mut advance = 0.5;
            if q.style.bold {
                advance *= 1.1;
            }
            if q.style.italic {
                advance *= 1.2;
            }
            let chars = q.text.chars().count() as f32;
            Ok(TextExtent {
                width: chars * q.size * advance + q.family.len() as f32,
                height: q.size,
            })
        }
    }

    #[test]
    fn text_style_changes_refit_the_box() {
        let cases = [
            ("fontSize", "60", true),
            ("bold", "true", true),
            ("italic", "true", true),
            ("fontFamily", "Courier New", true),
            ("align", "center", false),
        ];
        for (key, value, resizes) in cases {
            let mut s = Session::new(EditorConfig::default(), Box::new(StyleSensitive));
            let id = add(&mut s, ShapeKind::Text);
            let size = |s: &Session| {
                let t = s.store().get(id).and_then(Element::as_text).unwrap();
                (t.content_width(), t.content_height())
            };
            let before = size(&s);
            s.apply(Intent::SetAttribute {
                id,
                key: key.into(),
                value: value.into(),
            })
            .unwrap();
            assert_eq!(size(&s) != before, resizes, "{key}={value}");
        }
    }

    #[test]
    fn font_load_refits_users_of_the_family() {
        let mut s = session();
        let id = add(&mut s, ShapeKind::Text);
        s.register_font("Brand", &[0x00, 0x01, 0x00, 0x00]).unwrap();
        s.apply(Intent::SetAttribute {
            id,
            key: "fontFamily".into(),
            value: "Brand".into(),
        })
        .unwrap();
        let applied = s.font_load_finished("Brand", Ok(())).unwrap();
        assert_eq!(applied.changes.as_slice(), &[Change::Updated { id }]);
        assert!(s.panels().fonts.iter().any(|f| f == "Brand"));
    }

    #[test]
    fn cached_fonts_restore_into_a_new_session() {
        const TTF: &[u8] = &[0x00, 0x01, 0x00, 0x00];
        let mut s = session();
        s.register_font("Brand", TTF).unwrap();
        s.font_load_finished("Brand", Ok(())).unwrap();
        s.register_font("Broken", TTF).unwrap();
        assert!(s.font_load_finished("Broken", Err("bad face".into())).is_err());
        let blob = s.font_cache_bytes().unwrap();

        let mut restored = session();
        let pending = restored.restore_fonts(&blob).unwrap();
        assert_eq!(
            pending.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["Brand"]
        );
        assert!(restored.fonts().is_pending("Brand"));
        restored.font_load_finished("Brand", Ok(())).unwrap();
        assert!(restored.fonts().is_available("Brand"));
        assert!(restored.restore_fonts(b"not messagepack").is_err());
    }

    #[test]
    fn pictures_need_bytes() {
        let mut s = session();
        assert!(s.apply(Intent::AddDefault(ShapeKind::Picture)).is_err());
        let err = s.add_picture("img", b"not an image").unwrap_err();
        assert_eq!(err.kind(), tk_core::ErrorKind::ResourceLoadFailure);
        assert!(s.store().is_empty());
    }
}
