//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and tests share it.

use crate::input::Modifiers;
use sp_core::RotateDirection;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolPen,
    ToolText,
    ToolEraser,
    ToolLine,

    // ── Edit ──
    Undo,
    Delete,
    Deselect,

    // ── Page ──
    Rotate(RotateDirection),
    NextPage,
    PrevPage,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role. There is no
/// redo binding: page history is undo-only.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "z" | "Z" if !modifiers.shift => Some(ShortcutAction::Undo),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }

        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "p" | "P" | "d" | "D" => Some(ShortcutAction::ToolPen),
            "t" | "T" => Some(ShortcutAction::ToolText),
            "e" | "E" => Some(ShortcutAction::ToolEraser),
            "l" | "L" => Some(ShortcutAction::ToolLine),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "[" => Some(ShortcutAction::Rotate(RotateDirection::Left)),
            "]" => Some(ShortcutAction::Rotate(RotateDirection::Right)),
            "PageDown" => Some(ShortcutAction::NextPage),
            "PageUp" => Some(ShortcutAction::PrevPage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", Modifiers::NONE),
            Some(ShortcutAction::ToolSelect)
        );
        assert_eq!(
            ShortcutMap::resolve("P", Modifiers::NONE),
            Some(ShortcutAction::ToolPen)
        );
        assert_eq!(
            ShortcutMap::resolve("e", Modifiers::NONE),
            Some(ShortcutAction::ToolEraser)
        );
        assert_eq!(
            ShortcutMap::resolve("l", Modifiers::NONE),
            Some(ShortcutAction::ToolLine)
        );
    }

    #[test]
    fn resolve_undo_on_both_platforms() {
        assert_eq!(ShortcutMap::resolve("z", CMD), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", CTRL), Some(ShortcutAction::Undo));
        // Plain z is not undo
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
    }

    #[test]
    fn no_redo_binding() {
        let cmd_shift = Modifiers { shift: true, ..CMD };
        assert_eq!(ShortcutMap::resolve("z", cmd_shift), None);
        assert_eq!(ShortcutMap::resolve("y", CTRL), None);
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn resolve_page_actions() {
        assert_eq!(
            ShortcutMap::resolve("[", Modifiers::NONE),
            Some(ShortcutAction::Rotate(RotateDirection::Left))
        );
        assert_eq!(
            ShortcutMap::resolve("]", Modifiers::NONE),
            Some(ShortcutAction::Rotate(RotateDirection::Right))
        );
        assert_eq!(
            ShortcutMap::resolve("PageDown", Modifiers::NONE),
            Some(ShortcutAction::NextPage)
        );
        assert_eq!(
            ShortcutMap::resolve("PageUp", Modifiers::NONE),
            Some(ShortcutAction::PrevPage)
        );
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("F13", Modifiers::NONE), None);
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("v", alt), None);
    }
}
