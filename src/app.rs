//! Main application struct and eframe::App implementation

use eframe::egui;

use crate::editor::{EditorAction, EditorPanel};
use crate::export;
use crate::logo;
use crate::model::InvoiceState;
use crate::preview::{self, PointerEvent, PreviewContext};
use crate::session::Session;
use crate::settings::AppSettings;
use crate::theme::colors;

enum Status {
    Info(String),
    Error(String),
}

pub struct InvoiceApp {
    session: Session,
    editor: EditorPanel,
    settings: AppSettings,
    logo_texture: Option<((usize, usize), egui::TextureHandle)>,
    status: Option<Status>,
}

impl InvoiceApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: InvoiceState, settings: AppSettings) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            session: Session::new(state),
            editor: EditorPanel::default(),
            settings,
            logo_texture: None,
            status: None,
        }
    }

    /// Keeps the cached texture in step with the logo in the state.
    fn sync_logo_texture(&mut self, ctx: &egui::Context) {
        let Some(logo) = &self.session.state().logo else {
            self.logo_texture = None;
            return;
        };
        let key = logo.cache_key();
        if self.logo_texture.as_ref().is_some_and(|(cached, _)| *cached == key) {
            return;
        }
        match logo.to_rgba() {
            Ok(rgba) => {
                let size = [rgba.width() as usize, rgba.height() as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let texture = ctx.load_texture(&logo.name, image, egui::TextureOptions::LINEAR);
                self.logo_texture = Some((key, texture));
            }
            Err(e) => {
                tracing::error!("Failed to prepare logo texture: {}", e);
                self.logo_texture = None;
            }
        }
    }

    fn handle_actions(&mut self, actions: Vec<EditorAction>) {
        let mut edits = Vec::new();
        let mut commands = Vec::new();
        for action in actions {
            match action {
                EditorAction::Edit(edit) => edits.push(edit),
                other => commands.push(other),
            }
        }
        // Edits first, so a print in the same frame sees them.
        self.session.dispatch_all(edits);
        for command in commands {
            match command {
                EditorAction::PickLogo => self.pick_logo(),
                EditorAction::Print => self.print(),
                EditorAction::Edit(_) => {}
            }
        }
    }

    fn pick_logo(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Select Logo Image")
            .add_filter("Image", &["png", "jpg", "jpeg"])
            .pick_file()
        else {
            return;
        };
        match self.session.set_logo_from(logo::load(&path)) {
            Ok(()) => self.status = None,
            Err(e) => {
                tracing::warn!("Logo not changed: {}", e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    fn print(&mut self) {
        let root = self.settings.output_root();
        match export::export(self.session.state(), &self.settings, &root) {
            Ok(outcome) => {
                self.status = Some(Status::Info(format!("PDF generated: {}", outcome.pdf_path.display())));
                if self.settings.open_after_export {
                    export::open_and_reveal(&outcome.pdf_path);
                }
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Press(section, pointer) => self.session.press(section, pointer),
            PointerEvent::Move(pointer) => {
                if let Err(e) = self.session.pointer_moved(pointer) {
                    tracing::warn!("Drag update rejected: {}", e);
                }
            }
            PointerEvent::Release => self.session.release(),
        }
    }
}

impl eframe::App for InvoiceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_logo_texture(ctx);

        if let Some(status) = &self.status {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                let (text, color) = match status {
                    Status::Info(text) => (text, colors::SUCCESS),
                    Status::Error(text) => (text, colors::ERROR),
                };
                ui.label(egui::RichText::new(text).color(color));
            });
        }

        let actions = egui::SidePanel::left("editor")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| self.editor.show(ui, self.session.state()))
            .inner;

        let events = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::DESK).inner_margin(egui::Margin::same(24)))
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .id_salt("preview-scroll")
                    .show(ui, |ui| {
                        let cx = PreviewContext {
                            state: self.session.state(),
                            drag: self.session.drag(),
                            logo: self.logo_texture.as_ref().map(|(_, texture)| texture),
                            currency: &self.settings.currency,
                        };
                        preview::show(ui, &cx)
                    })
                    .inner
            })
            .inner;

        self.handle_actions(actions);
        for event in events {
            self.handle_pointer(event);
        }
    }
}
