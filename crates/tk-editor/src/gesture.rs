//! Pointer gestures on the canvas.
//!
//! The select tool turns pointer events into `ToolAction`s that the session
//! applies. It never touches the scene itself; the session resolves what is
//! under the pointer and passes it in as a `PointerTarget`.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Element | Resize anchor | Rotation anchor |
//! |----------|---------|---------------|-----------------|
//! | **Shift** | Axis-constrain drag | Keep aspect ratio (corners) | Snap angle |
//! | **Alt** | Duplicate on click | — | — |

use crate::input::InputEvent;
use kurbo::{Point, Vec2};
use smallvec::{SmallVec, smallvec};
use tk_core::config::HandleConfig;
use tk_core::id::ElementId;
use tk_core::model::BoundingBox;
use tk_render::handle::{Anchor, resize_box, rotate_box};

/// What lies under the pointer at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// An anchor of the attached transform handle.
    Anchor {
        id: ElementId,
        anchor: Anchor,
        current: BoundingBox,
    },
    /// An element body. Locked elements are selectable but not draggable.
    Element { id: ElementId, draggable: bool },
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolAction {
    Select(Option<ElementId>),
    Duplicate(ElementId),
    /// Translate whatever is selected.
    MoveSelected { dx: f32, dy: f32 },
    BeginTransform(ElementId),
    Propose { id: ElementId, new: BoundingBox },
    EndTransform(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    Moving {
        origin: (f32, f32),
        applied: (f32, f32),
    },
    Resizing {
        id: ElementId,
        anchor: Anchor,
        start_box: BoundingBox,
        origin: (f32, f32),
    },
    Rotating {
        id: ElementId,
        start_box: BoundingBox,
    },
}

pub type Actions = SmallVec<[ToolAction; 2]>;

pub struct SelectTool {
    drag: Drag,
    handle: HandleConfig,
}

impl SelectTool {
    pub fn new(handle: HandleConfig) -> Self {
        Self {
            drag: Drag::Idle,
            handle,
        }
    }

    /// Whether a move, resize, or rotation is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag != Drag::Idle
    }

    /// Element currently being resized or rotated.
    pub fn transforming(&self) -> Option<ElementId> {
        match self.drag {
            Drag::Resizing { id, .. } | Drag::Rotating { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Abandon the current drag without emitting anything.
    pub fn cancel(&mut self) {
        self.drag = Drag::Idle;
    }

    pub fn handle(&mut self, event: &InputEvent, target: PointerTarget) -> Actions {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => match target {
                PointerTarget::Anchor {
                    id,
                    anchor: Anchor::Rotate,
                    current,
                } => {
                    self.drag = Drag::Rotating {
                        id,
                        start_box: current,
                    };
                    smallvec![ToolAction::BeginTransform(id)]
                }
                PointerTarget::Anchor {
                    id,
                    anchor,
                    current,
                } => {
                    self.drag = Drag::Resizing {
                        id,
                        anchor,
                        start_box: current,
                        origin: (*x, *y),
                    };
                    smallvec![ToolAction::BeginTransform(id)]
                }
                PointerTarget::Element { id, draggable } => {
                    self.drag = if draggable {
                        Drag::Moving {
                            origin: (*x, *y),
                            applied: (0.0, 0.0),
                        }
                    } else {
                        Drag::Idle
                    };
                    let mut out: Actions = smallvec![ToolAction::Select(Some(id))];
                    if modifiers.alt && draggable {
                        out.push(ToolAction::Duplicate(id));
                    }
                    out
                }
                PointerTarget::Empty => {
                    self.drag = Drag::Idle;
                    smallvec![ToolAction::Select(None)]
                }
            },

            InputEvent::PointerMove { x, y, modifiers } => match &mut self.drag {
                Drag::Idle => SmallVec::new(),
                Drag::Moving { origin, applied } => {
                    let mut total = (x - origin.0, y - origin.1);
                    // Shift: constrain to the dominant axis of the whole drag.
                    if modifiers.shift {
                        if total.0.abs() > total.1.abs() {
                            total.1 = 0.0;
                        } else {
                            total.0 = 0.0;
                        }
                    }
                    let (dx, dy) = (total.0 - applied.0, total.1 - applied.1);
                    *applied = total;
                    if dx == 0.0 && dy == 0.0 {
                        SmallVec::new()
                    } else {
                        smallvec![ToolAction::MoveSelected { dx, dy }]
                    }
                }
                Drag::Resizing {
                    id,
                    anchor,
                    start_box,
                    origin,
                } => {
                    let delta = Vec2::new((x - origin.0) as f64, (y - origin.1) as f64);
                    let new = resize_box(start_box, *anchor, delta, modifiers.shift);
                    smallvec![ToolAction::Propose { id: *id, new }]
                }
                Drag::Rotating { id, start_box } => {
                    let pointer = Point::new(*x as f64, *y as f64);
                    let new = rotate_box(start_box, pointer, modifiers.shift, &self.handle);
                    smallvec![ToolAction::Propose { id: *id, new }]
                }
            },

            InputEvent::PointerUp { .. } => {
                let drag = std::mem::replace(&mut self.drag, Drag::Idle);
                match drag {
                    Drag::Resizing { id, .. } | Drag::Rotating { id, .. } => {
                        smallvec![ToolAction::EndTransform(id)]
                    }
                    _ => SmallVec::new(),
                }
            }

            InputEvent::Key { .. } => SmallVec::new(),
        }
    }
}
