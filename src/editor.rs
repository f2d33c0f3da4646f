//! The form side of the window. Widgets read the current state and report
//! what the user changed; nothing here mutates the state directly.

use std::collections::HashMap;

use egui::{Align, Layout, RichText, TextEdit, Ui};

use crate::edit::{
    CompanyField, CustomerField, Edit, InvoiceField, ItemField, PaymentField,
};
use crate::model::{InvoiceState, ItemId};
use crate::theme::{colors, spacing};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    Edit(Edit),
    PickLogo,
    Print,
}

/// Editor panel. Keeps the raw text of numeric fields while they are being
/// typed into, so `"1."` is not reformatted to `"1"` under the cursor.
#[derive(Debug, Default)]
pub struct EditorPanel {
    drafts: HashMap<(ItemId, ItemField), String>,
}

fn heading(ui: &mut Ui, text: &str) {
    ui.add_space(spacing::MD);
    ui.label(RichText::new(text.to_uppercase()).small().strong().color(colors::MUTED));
    ui.add_space(spacing::XS);
}

fn text_field(ui: &mut Ui, label: &str, value: &str, multiline: bool) -> Option<String> {
    ui.label(label);
    let mut text = value.to_string();
    let widget = if multiline {
        TextEdit::multiline(&mut text).desired_rows(2)
    } else {
        TextEdit::singleline(&mut text)
    };
    let response = ui.add(widget.desired_width(f32::INFINITY));
    response.changed().then_some(text)
}

impl EditorPanel {
    pub fn show(&mut self, ui: &mut Ui, state: &InvoiceState) -> Vec<EditorAction> {
        let mut actions = Vec::new();

        ui.horizontal(|ui| {
            ui.heading("Edit Invoice");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(RichText::new("Print / PDF").strong()).clicked() {
                    actions.push(EditorAction::Print);
                }
            });
        });

        egui::ScrollArea::vertical().show(ui, |ui| {
            self.logo_section(ui, state, &mut actions);
            self.layout_section(ui, state, &mut actions);
            self.invoice_section(ui, state, &mut actions);
            self.customer_section(ui, state, &mut actions);
            self.items_section(ui, state, &mut actions);
            self.payment_section(ui, state, &mut actions);
            self.company_section(ui, state, &mut actions);
        });

        self.drafts.retain(|(id, _), _| state.item(*id).is_some());
        actions
    }

    fn logo_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Company Logo");
        ui.horizontal(|ui| {
            if ui.button("Upload Logo Image").clicked() {
                actions.push(EditorAction::PickLogo);
            }
            if let Some(logo) = &state.logo {
                ui.label(RichText::new(&logo.name).color(colors::MUTED));
                if ui.button(RichText::new("Remove").color(colors::ERROR)).clicked() {
                    actions.push(EditorAction::Edit(Edit::SetLogo(None)));
                }
            }
        });
        ui.label(RichText::new("Recommended: Transparent PNG").small().color(colors::MUTED));
    }

    fn layout_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Layout");
        let mut custom = state.custom_layout;
        if ui
            .checkbox(&mut custom, "Custom layout (drag sections on the page)")
            .changed()
        {
            actions.push(EditorAction::Edit(Edit::SetCustomLayout(custom)));
        }
        if state.custom_layout && ui.button("Reset positions").clicked() {
            actions.push(EditorAction::Edit(Edit::ResetLayout));
        }
    }

    fn invoice_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Invoice Details");
        ui.columns(2, |cols| {
            if let Some(v) = text_field(&mut cols[0], "Invoice Number", &state.invoice.number, false) {
                actions.push(EditorAction::Edit(Edit::Invoice(InvoiceField::Number, v)));
            }
            if let Some(v) = text_field(&mut cols[1], "Date", &state.invoice.date, false) {
                actions.push(EditorAction::Edit(Edit::Invoice(InvoiceField::Date, v)));
            }
        });
    }

    fn customer_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Customer Details");
        let fields = [
            (CustomerField::Name, "Name", &state.customer.name, false),
            (CustomerField::Address, "Address", &state.customer.address, true),
            (CustomerField::Phone, "Phone", &state.customer.phone, false),
        ];
        for (field, label, value, multiline) in fields {
            if let Some(v) = text_field(ui, label, value, multiline) {
                actions.push(EditorAction::Edit(Edit::Customer(field, v)));
            }
        }
    }

    fn items_section(&mut self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        ui.horizontal(|ui| {
            heading(ui, "Items");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button(RichText::new("+ Add Item").color(colors::BRAND)).clicked() {
                    actions.push(EditorAction::Edit(Edit::AddItem));
                }
            });
        });

        for (index, item) in state.items.iter().enumerate() {
            ui.push_id(item.id, |ui| {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("Item {}", index + 1)).monospace().small());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.small_button("Remove").clicked() {
                                actions.push(EditorAction::Edit(Edit::RemoveItem(item.id)));
                            }
                        });
                    });

                    let mut description = item.description.clone();
                    let response = ui.add(
                        TextEdit::singleline(&mut description)
                            .hint_text("Description")
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        actions.push(EditorAction::Edit(Edit::Item {
                            id: item.id,
                            field: ItemField::Description,
                            value: description,
                        }));
                    }

                    ui.columns(2, |cols| {
                        cols[0].label("Price");
                        if let Some(edit) = self.number_field(&mut cols[0], item.id, ItemField::Price, item.price) {
                            actions.push(EditorAction::Edit(edit));
                        }
                        cols[1].label("Qty");
                        if let Some(edit) =
                            self.number_field(&mut cols[1], item.id, ItemField::Quantity, item.quantity)
                        {
                            actions.push(EditorAction::Edit(edit));
                        }
                    });
                });
            });
            ui.add_space(spacing::XS);
        }
    }

    fn number_field(&mut self, ui: &mut Ui, id: ItemId, field: ItemField, value: f64) -> Option<Edit> {
        let key = (id, field);
        let mut text = self
            .drafts
            .get(&key)
            .cloned()
            .unwrap_or_else(|| value.to_string());
        let response = ui.add(TextEdit::singleline(&mut text).desired_width(f32::INFINITY));
        let edit = response.changed().then(|| {
            self.drafts.insert(key, text.clone());
            Edit::Item { id, field, value: text }
        });
        if response.lost_focus() {
            self.drafts.remove(&key);
        }
        edit
    }

    fn payment_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Payment Details");
        let fields = [
            (PaymentField::BankName, "Bank", &state.payment.bank_name),
            (PaymentField::AccountName, "Account Name", &state.payment.account_name),
            (PaymentField::AccountNumber, "Account Number", &state.payment.account_number),
        ];
        for (field, label, value) in fields {
            if let Some(v) = text_field(ui, label, value, false) {
                actions.push(EditorAction::Edit(Edit::Payment(field, v)));
            }
        }
    }

    fn company_section(&self, ui: &mut Ui, state: &InvoiceState, actions: &mut Vec<EditorAction>) {
        heading(ui, "Company & Terms");
        let fields = [
            (CompanyField::Name, "Company Name", &state.company.name, false),
            (CompanyField::Address, "Address", &state.company.address, true),
            (CompanyField::Phone, "Phone", &state.company.phone, false),
            (CompanyField::Email, "Email", &state.company.email, false),
        ];
        for (field, label, value, multiline) in fields {
            if let Some(v) = text_field(ui, label, value, multiline) {
                actions.push(EditorAction::Edit(Edit::Company(field, v)));
            }
        }
        if let Some(v) = text_field(ui, "Terms and Conditions", &state.terms, true) {
            actions.push(EditorAction::Edit(Edit::Terms(v)));
        }
        ui.add_space(spacing::LG);
    }
}
