//! The single owner of the invoice state. Every event goes through here, in
//! arrival order, and replaces the state as a whole.

use crate::drag::DragState;
use crate::edit::{Edit, EditError};
use crate::layout::{LayoutPosition, Section};
use crate::logo::{Logo, LogoError};
use crate::model::InvoiceState;

#[derive(Debug, Clone)]
pub struct Session {
    state: InvoiceState,
    drag: DragState,
}

impl Session {
    pub fn new(state: InvoiceState) -> Self {
        Session {
            state,
            drag: DragState::Idle,
        }
    }

    pub fn state(&self) -> &InvoiceState {
        &self.state
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn dispatch(&mut self, edit: Edit) -> Result<(), EditError> {
        let leaving_custom = matches!(edit, Edit::SetCustomLayout(false));
        self.state = self.state.apply(edit)?;
        if leaving_custom {
            self.drag.release();
        }
        Ok(())
    }

    /// Applies edits in order. A rejected edit is logged and skipped; the
    /// remaining edits still apply.
    pub fn dispatch_all(&mut self, edits: impl IntoIterator<Item = Edit>) {
        for edit in edits {
            if let Err(e) = self.dispatch(edit) {
                tracing::warn!("Edit rejected: {}", e);
            }
        }
    }

    /// Installs a freshly loaded logo. A failed load leaves the current logo
    /// in place and hands the error back.
    pub fn set_logo_from(&mut self, loaded: Result<Logo, LogoError>) -> Result<(), LogoError> {
        let logo = loaded?;
        self.state.logo = Some(logo);
        Ok(())
    }

    pub fn press(&mut self, section: Section, pointer: LayoutPosition) {
        self.drag.press(&self.state, section, pointer);
    }

    pub fn pointer_moved(&mut self, pointer: LayoutPosition) -> Result<(), EditError> {
        match self.drag.pointer_moved(pointer) {
            Some(edit) => self.dispatch(edit),
            None => Ok(()),
        }
    }

    pub fn release(&mut self) {
        self.drag.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> Session {
        let seed = toml::from_str(crate::settings::DEFAULT_SEED_TEMPLATE).unwrap();
        let mut session = Session::new(InvoiceState::from_seed(seed));
        session.dispatch(Edit::SetCustomLayout(true)).unwrap();
        session
    }

    #[test]
    fn drag_then_release_commits_last_position() {
        let mut s = session();
        let start = s.state().layout.get(Section::Payment);
        s.press(Section::Payment, LayoutPosition::new(100.0, 900.0));
        s.pointer_moved(LayoutPosition::new(130.0, 860.0)).unwrap();
        s.release();
        assert_eq!(
            s.state().layout.get(Section::Payment),
            LayoutPosition::new(start.x + 30.0, start.y - 40.0)
        );
        assert_eq!(*s.drag(), DragState::Idle);
    }

    #[test]
    fn release_without_move_keeps_position() {
        let mut s = session();
        let before = s.state().layout;
        s.press(Section::Logo, LayoutPosition::new(300.0, 60.0));
        s.release();
        assert_eq!(s.state().layout, before);
    }

    #[test]
    fn moves_after_release_are_ignored() {
        let mut s = session();
        s.press(Section::Logo, LayoutPosition::new(0.0, 0.0));
        s.pointer_moved(LayoutPosition::new(5.0, 5.0)).unwrap();
        s.release();
        let after = s.state().layout;
        s.pointer_moved(LayoutPosition::new(500.0, 500.0)).unwrap();
        assert_eq!(s.state().layout, after);
    }

    #[test]
    fn leaving_custom_mode_ends_drag() {
        let mut s = session();
        s.press(Section::Terms, LayoutPosition::new(0.0, 0.0));
        s.dispatch(Edit::SetCustomLayout(false)).unwrap();
        assert_eq!(*s.drag(), DragState::Idle);
    }

    #[test]
    fn rejected_edit_keeps_state() {
        let mut s = session();
        let before = s.state().clone();
        let err = s
            .dispatch(Edit::MoveSection {
                section: Section::Total,
                position: LayoutPosition::new(f64::INFINITY, 1.0),
            })
            .unwrap_err();
        assert!(matches!(err, EditError::NonFiniteCoordinate { .. }));
        assert_eq!(*s.state(), before);
    }

    #[test]
    fn batch_applies_in_order_and_skips_rejected() {
        let mut s = session();
        s.dispatch_all([
            Edit::Terms("Net 7".into()),
            Edit::MoveSection {
                section: Section::Logo,
                position: LayoutPosition::new(f64::NAN, 0.0),
            },
            Edit::Terms("Net 14".into()),
            Edit::AddItem,
        ]);
        assert_eq!(s.state().terms, "Net 14");
        assert_eq!(s.state().items.len(), 3);
        assert_eq!(s.state().layout.get(Section::Logo), LayoutPosition::new(297.0, 48.0));
    }

    fn logo(width: u32) -> Logo {
        crate::logo::decode("mark.png", crate::logo::tests::png_bytes(width, 2)).unwrap()
    }

    #[test]
    fn loaded_logo_replaces_current() {
        let mut s = session();
        s.set_logo_from(Ok(logo(2))).unwrap();
        s.set_logo_from(Ok(logo(5))).unwrap();
        assert_eq!(s.state().logo.as_ref().map(|l| l.width), Some(5));
    }

    #[test]
    fn failed_logo_load_keeps_previous_logo() {
        let mut s = session();
        s.set_logo_from(Ok(logo(3))).unwrap();
        let before = s.state().clone();
        let bytes_before = before.logo.as_ref().unwrap().bytes.clone();

        let err = s
            .set_logo_from(crate::logo::decode("notes.txt", b"not an image".to_vec()))
            .unwrap_err();
        assert!(matches!(err, LogoError::UnsupportedFormat));
        assert_eq!(*s.state(), before);
        let after = s.state().logo.as_ref().unwrap();
        assert!(std::sync::Arc::ptr_eq(&after.bytes, &bytes_before));
    }

    #[test]
    fn failed_logo_load_without_logo_stays_empty() {
        let mut s = session();
        let mut bytes = crate::logo::tests::png_bytes(8, 8);
        bytes.truncate(bytes.len() / 2);
        assert!(s.set_logo_from(crate::logo::decode("broken.png", bytes)).is_err());
        assert!(s.state().logo.is_none());
    }

    #[test]
    fn clearing_logo_removes_it() {
        let mut s = session();
        s.set_logo_from(Ok(logo(3))).unwrap();
        s.dispatch(Edit::SetLogo(None)).unwrap();
        assert!(s.state().logo.is_none());
    }

    proptest! {
        #[test]
        fn drag_is_path_independent(
            dx in -500i32..500,
            dy in -500i32..500,
            path in prop::collection::vec((-2000i32..2000, -2000i32..2000), 0..20),
        ) {
            let mut s = session();
            let start = s.state().layout.get(Section::ItemsTable);
            let press = LayoutPosition::new(200.0, 400.0);
            s.press(Section::ItemsTable, press);
            for (x, y) in path {
                s.pointer_moved(LayoutPosition::new(f64::from(x), f64::from(y))).unwrap();
            }
            s.pointer_moved(LayoutPosition::new(press.x + f64::from(dx), press.y + f64::from(dy))).unwrap();
            s.release();
            let end = s.state().layout.get(Section::ItemsTable);
            prop_assert_eq!(end, LayoutPosition::new(start.x + f64::from(dx), start.y + f64::from(dy)));
        }
    }
}
