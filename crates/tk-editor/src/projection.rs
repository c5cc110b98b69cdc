//! Panel projection: scene + selection → serializable UI views.
//!
//! Views are rebuilt from scratch after every change; they hold no state of
//! their own. Panels send changes back as session `Intent`s.

use crate::transform::TransformEngine;
use serde::Serialize;
use tk_core::config::HandleConfig;
use tk_core::id::ElementId;
use tk_core::model::*;
use tk_core::scene::SceneStore;
use tk_core::selection::Selection;
use tk_render::handle::anchor_positions;

/// One row of the layers list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    pub id: ElementId,
    pub label: String,
    pub kind: ShapeKind,
    pub locked: bool,
    pub active: bool,
}

/// Layers, topmost first.
pub fn layers(store: &SceneStore, selection: &Selection) -> Vec<LayerEntry> {
    store
        .iterate()
        .rev()
        .map(|el| LayerEntry {
            id: el.id(),
            label: el.display_name(),
            kind: el.shape_kind(),
            locked: el.is_locked(),
            active: selection.is_selected(el.id()),
        })
        .collect()
}

/// The properties panel for the selected element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesView {
    pub id: ElementId,
    pub kind: ShapeKind,
    /// `false` while locked: every control but the lock toggle is disabled.
    pub editable: bool,
    pub locked: bool,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub shadow: Option<Shadow>,
    /// Kind-specific attributes.
    pub attributes: ElementKind,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

pub fn properties(store: &SceneStore, selection: &Selection) -> Option<PropertiesView> {
    let id = selection.selected()?;
    let el = store.get(id)?;
    let index = store.index_of(id)?;
    let editable = !el.is_locked();
    Some(PropertiesView {
        id,
        kind: el.shape_kind(),
        editable,
        locked: el.is_locked(),
        x: el.position.x,
        y: el.position.y,
        rotation: el.rotation,
        shadow: el.shadow,
        attributes: el.kind.clone(),
        can_move_up: editable && index + 1 < store.len(),
        can_move_down: editable && index > 0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorView {
    pub name: &'static str,
    pub x: f32,
    pub y: f32,
}

/// The transform handle overlay. Absent when nothing is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandleView {
    pub id: ElementId,
    #[serde(rename = "box")]
    pub bounds: BoundingBox,
    pub anchors: Vec<AnchorView>,
}

pub fn handle_view(
    store: &SceneStore,
    engine: &TransformEngine,
    cfg: &HandleConfig,
) -> Option<HandleView> {
    let id = engine.attached()?;
    let el = store.get(id)?;
    if el.is_locked() {
        return None;
    }
    let bounds = engine.element_box(el);
    let anchors = anchor_positions(&bounds, cfg)
        .into_iter()
        .map(|(a, p)| AnchorView {
            name: a.name(),
            x: p.x as f32,
            y: p.y as f32,
        })
        .collect();
    Some(HandleView {
        id,
        bounds,
        anchors,
    })
}

/// Everything the panels render, in one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub layers: Vec<LayerEntry>,
    pub properties: Option<PropertiesView>,
    pub handle: Option<HandleView>,
    pub background: Color,
    pub fonts: Vec<String>,
}
