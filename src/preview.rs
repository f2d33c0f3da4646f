//! On-screen rendering of the invoice page.
//!
//! Page coordinates are document pixels and map 1:1 to egui points, so the
//! layout map can be used directly. The only thing this module reports back
//! is pointer activity on the drag handles.

use egui::{
    pos2, vec2, Align, Color32, CursorIcon, Frame, Layout, Rect, RichText, Sense, Stroke,
    StrokeKind, TextureHandle, Ui, UiBuilder,
};

use crate::drag::DragState;
use crate::layout::{LayoutPosition, Section, PAGE_HEIGHT, PAGE_WIDTH};
use crate::model::{format_amount, InvoiceState};
use crate::theme::{colors, spacing};

const HANDLE_SIZE: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Section, LayoutPosition),
    Move(LayoutPosition),
    Release,
}

pub struct PreviewContext<'a> {
    pub state: &'a InvoiceState,
    pub drag: &'a DragState,
    pub logo: Option<&'a TextureHandle>,
    pub currency: &'a str,
}

pub fn show(ui: &mut Ui, cx: &PreviewContext<'_>) -> Vec<PointerEvent> {
    let mut events = Vec::new();

    ui.vertical_centered(|ui| {
        ui.label(RichText::new("Preview (A4 Size)").small().color(Color32::WHITE));
    });
    ui.add_space(spacing::SM);

    let (page_rect, _) = ui.allocate_exact_size(vec2(PAGE_WIDTH, PAGE_HEIGHT), Sense::hover());
    let painter = ui.painter_at(page_rect.expand(8.0));
    painter.rect_filled(page_rect.translate(vec2(3.0, 4.0)), 2.0, Color32::from_black_alpha(60));
    painter.rect_filled(page_rect, 2.0, colors::PAPER);

    if cx.state.custom_layout {
        custom_page(ui, cx, page_rect, &mut events);
    } else {
        flow_page(ui, cx, page_rect);
    }
    events
}

fn flow_page(ui: &mut Ui, cx: &PreviewContext<'_>, page_rect: Rect) {
    let content = page_rect.shrink(spacing::PAGE_MARGIN);
    let mut page = ui.new_child(
        UiBuilder::new()
            .id_salt("flow-page")
            .max_rect(content)
            .layout(Layout::top_down(Align::Min)),
    );
    page.set_clip_rect(page_rect);
    let ui = &mut page;

    ui.vertical_centered(|ui| section_ui(ui, Section::Logo, cx));
    ui.add_space(spacing::LG);
    ui.columns(2, |cols| {
        section_ui(&mut cols[0], Section::InvoiceMeta, cx);
        section_ui(&mut cols[1], Section::Customer, cx);
    });
    ui.add_space(spacing::LG);
    section_ui(ui, Section::ItemsTable, cx);
    ui.add_space(spacing::MD);
    ui.with_layout(Layout::right_to_left(Align::Min), |ui| {
        section_ui(ui, Section::Total, cx);
    });
    ui.add_space(spacing::LG);
    section_ui(ui, Section::Terms, cx);
    ui.add_space(spacing::LG);
    ui.columns(2, |cols| {
        section_ui(&mut cols[0], Section::Payment, cx);
        cols[1].with_layout(Layout::top_down(Align::Max), |ui| {
            section_ui(ui, Section::Company, cx);
        });
    });
}

fn custom_page(ui: &mut Ui, cx: &PreviewContext<'_>, page_rect: Rect, events: &mut Vec<PointerEvent>) {
    let to_page = |pos: egui::Pos2| page_position(page_rect.min, pos);

    for (section, position) in cx.state.layout.iter() {
        let origin = page_rect.min + vec2(position.x as f32, position.y as f32);
        let max_rect = Rect::from_min_size(origin, vec2(section.width(), PAGE_HEIGHT));
        let mut child = ui.new_child(
            UiBuilder::new()
                .id_salt(section.as_str())
                .max_rect(max_rect)
                .layout(Layout::top_down(Align::Min)),
        );
        child.set_clip_rect(page_rect);
        if section == Section::Logo {
            child.vertical_centered(|ui| section_ui(ui, section, cx));
        } else {
            section_ui(&mut child, section, cx);
        }

        let used = child.min_rect();
        let bottom = used.max.y.max(origin.y + HANDLE_SIZE);
        let bounds = Rect::from_min_max(origin, pos2(origin.x + section.width(), bottom));
        let handle_rect = Rect::from_min_size(
            pos2(bounds.right() - HANDLE_SIZE, bounds.top()),
            vec2(HANDLE_SIZE, HANDLE_SIZE),
        );

        let dragging = cx.drag.active_section() == Some(section);
        let hovered = dragging || ui.rect_contains_pointer(bounds.expand(4.0));
        let mut response = ui
            .interact(handle_rect, ui.id().with(("drag-handle", section.as_str())), Sense::drag())
            .on_hover_cursor(CursorIcon::Grab);

        if hovered {
            let painter = ui.painter_at(page_rect);
            painter.rect_stroke(bounds.expand(4.0), 4.0, Stroke::new(1.0, colors::HANDLE), StrokeKind::Outside);
            painter.rect_filled(handle_rect, 3.0, colors::HANDLE);
            painter.text(
                handle_rect.center(),
                egui::Align2::CENTER_CENTER,
                "✥",
                egui::FontId::proportional(12.0),
                Color32::WHITE,
            );
            response = response.on_hover_text(section.label());
        }

        if response.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin());
            if let Some(pointer) = press_point(origin, response.interact_pointer_pos()) {
                events.push(PointerEvent::Press(section, to_page(pointer)));
            }
        }
        if response.dragged() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
            if let Some(pointer) = response.interact_pointer_pos() {
                events.push(PointerEvent::Move(to_page(pointer)));
            }
        }
        if response.drag_stopped() {
            events.push(PointerEvent::Release);
        }
    }

    // A release outside any handle still ends the drag.
    if cx.drag.active_section().is_some() && !ui.input(|i| i.pointer.any_down()) {
        events.push(PointerEvent::Release);
    }
}

fn page_position(page_min: egui::Pos2, pos: egui::Pos2) -> LayoutPosition {
    let rel = pos - page_min;
    LayoutPosition::new(f64::from(rel.x), f64::from(rel.y))
}

/// Where the button went down, not where egui's drag threshold was crossed.
fn press_point(press_origin: Option<egui::Pos2>, current: Option<egui::Pos2>) -> Option<egui::Pos2> {
    press_origin.or(current)
}

fn section_ui(ui: &mut Ui, section: Section, cx: &PreviewContext<'_>) {
    let state = cx.state;
    match section {
        Section::Logo => match cx.logo {
            Some(texture) => {
                ui.add(egui::Image::new(texture).max_height(112.0));
            }
            None => {
                let mark = if state.company.name.trim().is_empty() {
                    "LOGO"
                } else {
                    state.company.name.as_str()
                };
                ui.label(RichText::new(mark).size(36.0).strong().color(colors::BRAND));
            }
        },
        Section::InvoiceMeta => {
            ui.label(RichText::new("INVOICE").size(30.0).strong().color(Color32::BLACK));
            ui.add_space(spacing::SM);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Invoice No:").color(colors::MUTED));
                ui.label(RichText::new(&state.invoice.number).strong().color(colors::TEXT));
            });
            ui.horizontal(|ui| {
                ui.label(RichText::new("Date:").color(colors::MUTED));
                ui.label(RichText::new(&state.invoice.date).color(colors::TEXT));
            });
        }
        Section::Customer => {
            ui.label(RichText::new("Billed To:").size(20.0).strong().color(Color32::BLACK));
            ui.add_space(spacing::XS);
            ui.label(RichText::new(&state.customer.name).strong().color(colors::TEXT));
            ui.label(RichText::new(&state.customer.address).color(colors::MUTED));
            ui.label(RichText::new(&state.customer.phone).color(colors::MUTED));
        }
        Section::ItemsTable => items_table(ui, cx),
        Section::Total => {
            Frame::new()
                .fill(colors::BRAND)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(24, 10))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Total").size(18.0).color(Color32::WHITE));
                        ui.add_space(spacing::LG);
                        ui.label(
                            RichText::new(format!("{} {}", cx.currency, format_amount(state.total())))
                                .size(20.0)
                                .strong()
                                .color(Color32::WHITE),
                        );
                    });
                });
        }
        Section::Terms => {
            ui.label(RichText::new("Terms and Conditions").size(18.0).strong().color(colors::TEXT));
            ui.label(RichText::new(&state.terms).color(colors::MUTED));
        }
        Section::Payment => {
            Frame::new()
                .stroke(Stroke::new(1.0, colors::BRAND))
                .corner_radius(egui::CornerRadius { nw: 16, ne: 16, sw: 0, se: 16 })
                .inner_margin(egui::Margin::same(16))
                .show(ui, |ui| {
                    ui.label(RichText::new("Payment Detail:").size(18.0).strong().color(Color32::BLACK));
                    ui.add_space(spacing::XS);
                    egui::Grid::new("payment-grid").num_columns(2).show(ui, |ui| {
                        let rows = [
                            ("Bank", &state.payment.bank_name),
                            ("Acc Name", &state.payment.account_name),
                            ("Acc No", &state.payment.account_number),
                        ];
                        for (label, value) in rows {
                            ui.label(RichText::new(label).color(colors::MUTED));
                            ui.label(RichText::new(format!(": {value}")).color(colors::TEXT));
                            ui.end_row();
                        }
                    });
                });
        }
        Section::Company => {
            ui.label(RichText::new(&state.company.name).size(24.0).strong().color(colors::TEXT));
            for line in [&state.company.address, &state.company.phone, &state.company.email] {
                ui.label(RichText::new(line).color(colors::MUTED));
            }
        }
    }
}

fn items_table(ui: &mut Ui, cx: &PreviewContext<'_>) {
    let width = ui.available_width();
    let columns = [5.0, 3.0, 2.0, 2.0].map(|share: f32| width * share / 12.0 - spacing::XS);
    let aligns = [Align::Min, Align::Max, Align::Center, Align::Max];

    let row = |ui: &mut Ui, cells: [RichText; 4]| {
        ui.horizontal(|ui| {
            for ((cell, w), align) in cells.into_iter().zip(columns).zip(aligns) {
                ui.allocate_ui_with_layout(vec2(w, 20.0), Layout::top_down(align), |ui| {
                    ui.label(cell);
                });
            }
        });
    };

    Frame::new()
        .fill(colors::BRAND)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            let header = ["Description", "Price", "Qty", "Amount"]
                .map(|h| RichText::new(h).strong().color(Color32::WHITE));
            row(ui, header);
        });
    ui.add_space(spacing::SM);

    for item in &cx.state.items {
        row(
            ui,
            [
                RichText::new(&item.description).color(colors::TEXT),
                RichText::new(format_amount(item.price)).color(colors::MUTED),
                RichText::new(format_amount(item.quantity)).color(colors::MUTED),
                RichText::new(format!("{} {}", cx.currency, format_amount(item.amount())))
                    .strong()
                    .color(colors::TEXT),
            ],
        );
        let y = ui.cursor().top();
        ui.painter().hline(ui.max_rect().x_range(), y, Stroke::new(1.0, colors::RULE));
        ui.add_space(spacing::XS);
    }

    if cx.state.items.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(spacing::LG);
            ui.label(RichText::new("No items added yet").italics().color(colors::MUTED));
            ui.add_space(spacing::LG);
        });
    }
}
