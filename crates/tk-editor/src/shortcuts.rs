//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Modifiers are
//! platform-aware: ⌘ on macOS and Ctrl elsewhere both count as "cmd".
//!
//! | Keys | Action |
//! |------|--------|
//! | Delete / Backspace | delete (asks for confirmation) |
//! | cmd+D | duplicate |
//! | cmd+] / cmd+[ | move up / down one layer |
//! | cmd+L | toggle lock |
//! | Escape | deselect |
//! | arrows | nudge 1 unit, 10 with Shift |

use crate::input::Modifiers;

/// Nudge distance with Shift held.
const NUDGE_LARGE: f32 = 10.0;
const NUDGE_SMALL: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    Delete,
    Duplicate,
    MoveUp,
    MoveDown,
    ToggleLock,
    Deselect,
    Nudge { dx: f32, dy: f32 },
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action, or `None` if unbound.
    pub fn resolve(key: &str, mods: &Modifiers) -> Option<ShortcutAction> {
        if mods.cmd() {
            return match key {
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "]" => Some(ShortcutAction::MoveUp),
                "[" => Some(ShortcutAction::MoveDown),
                "l" | "L" => Some(ShortcutAction::ToggleLock),
                _ => None,
            };
        }

        let step = if mods.shift { NUDGE_LARGE } else { NUDGE_SMALL };
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "ArrowLeft" => Some(ShortcutAction::Nudge { dx: -step, dy: 0.0 }),
            "ArrowRight" => Some(ShortcutAction::Nudge { dx: step, dy: 0.0 }),
            "ArrowUp" => Some(ShortcutAction::Nudge { dx: 0.0, dy: -step }),
            "ArrowDown" => Some(ShortcutAction::Nudge { dx: 0.0, dy: step }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_cmd_combos() {
        let cmd = Modifiers::NONE.with_cmd();
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            ShortcutMap::resolve("d", &cmd),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(
            ShortcutMap::resolve("D", &meta),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(ShortcutMap::resolve("]", &cmd), Some(ShortcutAction::MoveUp));
        assert_eq!(ShortcutMap::resolve("[", &meta), Some(ShortcutAction::MoveDown));
        assert_eq!(
            ShortcutMap::resolve("l", &cmd),
            Some(ShortcutAction::ToggleLock)
        );
        assert_eq!(ShortcutMap::resolve("x", &cmd), None);
    }

    #[test]
    fn resolve_delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Delete", &Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", &Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", &Modifiers::NONE),
            Some(ShortcutAction::Deselect)
        );
        // Plain letters are left to text inputs.
        assert_eq!(ShortcutMap::resolve("d", &Modifiers::NONE), None);
    }

    #[test]
    fn arrows_nudge_with_shift_multiplier() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", &Modifiers::NONE),
            Some(ShortcutAction::Nudge { dx: -1.0, dy: 0.0 })
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", &Modifiers::NONE.with_shift()),
            Some(ShortcutAction::Nudge { dx: 0.0, dy: 10.0 })
        );
    }
}
