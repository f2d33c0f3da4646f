//! Press-to-release drag of one section in custom-layout mode.
//!
//! The section follows the pointer *delta* from the press point, so the spot
//! that was grabbed stays under the cursor. Release always commits whatever
//! position was last computed.

use crate::edit::Edit;
use crate::layout::{LayoutPosition, Section};
use crate::model::InvoiceState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub section: Section,
    pointer_start: LayoutPosition,
    position_start: LayoutPosition,
}

impl DragSession {
    pub fn position_for(&self, pointer: LayoutPosition) -> LayoutPosition {
        LayoutPosition::new(
            self.position_start.x + (pointer.x - self.pointer_start.x),
            self.position_start.y + (pointer.y - self.pointer_start.y),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    /// Starts dragging `section`. Ignored outside custom-layout mode and while
    /// another drag is active.
    pub fn press(&mut self, state: &InvoiceState, section: Section, pointer: LayoutPosition) {
        if !state.custom_layout {
            return;
        }
        if let DragState::Dragging(active) = self {
            tracing::debug!(active = %active.section, pressed = %section, "drag already active");
            return;
        }
        tracing::debug!(%section, "drag started");
        *self = DragState::Dragging(DragSession {
            section,
            pointer_start: pointer,
            position_start: state.layout.get(section),
        });
    }

    pub fn pointer_moved(&self, pointer: LayoutPosition) -> Option<Edit> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(Edit::MoveSection {
                section: session.section,
                position: session.position_for(pointer),
            }),
        }
    }

    pub fn release(&mut self) {
        if let DragState::Dragging(session) = self {
            tracing::debug!(section = %session.section, "drag released");
        }
        *self = DragState::Idle;
    }

    pub fn active_section(&self) -> Option<Section> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(session.section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_state() -> InvoiceState {
        let seed = toml::from_str(crate::settings::DEFAULT_SEED_TEMPLATE).unwrap();
        InvoiceState::from_seed(seed)
            .apply(Edit::SetCustomLayout(true))
            .unwrap()
    }

    #[test]
    fn press_in_flow_mode_is_ignored() {
        let state = custom_state().apply(Edit::SetCustomLayout(false)).unwrap();
        let mut drag = DragState::default();
        drag.press(&state, Section::Total, LayoutPosition::new(10.0, 10.0));
        assert_eq!(drag, DragState::Idle);
        assert!(drag.pointer_moved(LayoutPosition::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn move_tracks_pointer_delta() {
        let state = custom_state();
        let start = state.layout.get(Section::Total);
        let mut drag = DragState::default();
        drag.press(&state, Section::Total, LayoutPosition::new(600.0, 700.0));
        let edit = drag.pointer_moved(LayoutPosition::new(610.0, 680.0)).unwrap();
        assert_eq!(
            edit,
            Edit::MoveSection {
                section: Section::Total,
                position: LayoutPosition::new(start.x + 10.0, start.y - 20.0),
            }
        );
    }

    #[test]
    fn second_press_keeps_first_drag() {
        let state = custom_state();
        let mut drag = DragState::default();
        drag.press(&state, Section::Logo, LayoutPosition::new(0.0, 0.0));
        drag.press(&state, Section::Terms, LayoutPosition::new(5.0, 5.0));
        assert_eq!(drag.active_section(), Some(Section::Logo));
    }

    #[test]
    fn release_returns_to_idle() {
        let state = custom_state();
        let mut drag = DragState::default();
        drag.press(&state, Section::Company, LayoutPosition::new(1.0, 1.0));
        drag.release();
        assert_eq!(drag, DragState::Idle);
        drag.release();
        assert_eq!(drag, DragState::Idle);
    }
}
