//! Print rendering: the invoice as a Typst document, compiled to PDF.
//!
//! Custom-layout mode places every section at its stored offset on a
//! margin-less A4 page. Drag handles only exist in the on-screen preview.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, Local};
use serde::Serialize;
use serde_json::Value;
use slug::slugify;
use tera::{Context, Tera};
use thiserror::Error;

use crate::layout::Section;
use crate::model::{
    format_amount, CompanyDetails, CustomerDetails, InvoiceDetails, InvoiceState, PaymentDetails,
};
use crate::settings::AppSettings;

const INVOICE_TEMPLATE: &str = include_str!("../templates/invoice.typ.tera");
const TEMPLATE_NAME: &str = "invoice.typ";

/// Document pixels (96 dpi) to Typst points (72 dpi).
const PX_TO_PT: f64 = 0.75;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("'{0}' is not installed or not on PATH (see https://typst.app)")]
    TypstMissing(String),
    #[error("typst failed to compile {}: {stderr}", path.display())]
    CompileFailed { path: PathBuf, stderr: String },
}

#[derive(Serialize)]
struct ItemRow {
    description: String,
    price: String,
    quantity: String,
    amount: String,
}

#[derive(Serialize)]
struct PlacedSection {
    ident: String,
    x_pt: String,
    y_pt: String,
    width_pt: String,
}

#[derive(Serialize)]
struct DocumentContext<'a> {
    custom_layout: bool,
    invoice: &'a InvoiceDetails,
    customer: &'a CustomerDetails,
    payment: &'a PaymentDetails,
    company: &'a CompanyDetails,
    terms: &'a str,
    items: Vec<ItemRow>,
    total: String,
    logo_file: Option<&'a str>,
    mark: &'a str,
    sections: Vec<PlacedSection>,
}

/// Where an export landed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub typ_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// Emits `value` as a quoted Typst string literal, so user text never turns
/// into markup.
fn typst_str(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(Value::String(out))
}

fn section_ident(section: Section) -> String {
    format!("section-{}", section.as_str())
}

fn points(px: f64) -> String {
    format!("{:.2}", px * PX_TO_PT)
}

/// Renders the Typst source for `state`. `logo_file` is the logo's path
/// relative to the document, when one was written next to it.
pub fn render_typst(
    state: &InvoiceState,
    currency: &str,
    logo_file: Option<&str>,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, INVOICE_TEMPLATE)?;
    tera.register_filter("typst_str", typst_str);

    let items = state
        .items
        .iter()
        .map(|item| ItemRow {
            description: item.description.clone(),
            price: format_amount(item.price),
            quantity: format_amount(item.quantity),
            amount: format!("{} {}", currency, format_amount(item.amount())),
        })
        .collect();

    let sections = state
        .layout
        .iter()
        .map(|(section, position)| PlacedSection {
            ident: section_ident(section),
            x_pt: points(position.x),
            y_pt: points(position.y),
            width_pt: points(f64::from(section.width())),
        })
        .collect();

    let context_data = DocumentContext {
        custom_layout: state.custom_layout,
        invoice: &state.invoice,
        customer: &state.customer,
        payment: &state.payment,
        company: &state.company,
        terms: &state.terms,
        items,
        total: format!("{} {}", currency, format_amount(state.total())),
        logo_file: if state.logo.is_some() { logo_file } else { None },
        mark: &state.company.name,
        sections,
    };

    let context = Context::from_serialize(&context_data)?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

/// File stem for an invoice: `INV-<number>`.
pub fn file_stem(state: &InvoiceState) -> String {
    let number = slugify(&state.invoice.number);
    if number.is_empty() {
        "INV-draft".to_string()
    } else {
        format!("INV-{number}")
    }
}

/// `<root>/<year>/<customer>/`
pub fn output_dir(root: &Path, state: &InvoiceState, year: i32) -> PathBuf {
    let customer = slugify(&state.customer.name);
    let customer = if customer.is_empty() { "customer".to_string() } else { customer };
    root.join(year.to_string()).join(customer)
}

/// Writes the Typst source (and the logo, if any) into `dir` and returns the
/// path of the `.typ` file.
pub fn write_document(
    state: &InvoiceState,
    currency: &str,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let logo_file = match &state.logo {
        Some(logo) => {
            let name = format!("{stem}.logo.{}", logo.format.extension());
            let path = dir.join(&name);
            fs::write(&path, &logo.bytes).map_err(|source| ExportError::Io { path, source })?;
            Some(name)
        }
        None => None,
    };

    let rendered = render_typst(state, currency, logo_file.as_deref())?;
    let typ_path = dir.join(format!("{stem}.typ"));
    fs::write(&typ_path, rendered).map_err(|source| ExportError::Io {
        path: typ_path.clone(),
        source,
    })?;
    Ok(typ_path)
}

/// Renders `state` and compiles it to PDF under `root`.
pub fn export(
    state: &InvoiceState,
    settings: &AppSettings,
    root: &Path,
) -> Result<ExportOutcome, ExportError> {
    if Command::new(&settings.typst).arg("--version").output().is_err() {
        return Err(ExportError::TypstMissing(settings.typst.clone()));
    }

    let dir = output_dir(root, state, Local::now().year());
    let stem = file_stem(state);
    let typ_path = write_document(state, &settings.currency, &dir, &stem)?;
    let pdf_path = typ_path.with_extension("pdf");

    tracing::info!("Compiling {:?}", typ_path);
    let output = Command::new(&settings.typst)
        .arg("compile")
        .arg(&typ_path)
        .arg(&pdf_path)
        .output()
        .map_err(|_| ExportError::TypstMissing(settings.typst.clone()))?;
    if !output.status.success() {
        return Err(ExportError::CompileFailed {
            path: typ_path,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::info!("PDF generated: {:?}", pdf_path);
    Ok(ExportOutcome { typ_path, pdf_path })
}

/// Opens the file with the platform viewer and reveals its folder.
pub fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg("-R").arg(path).spawn().ok();
        Command::new("open").arg(path).spawn().ok();
    }

    #[cfg(target_os = "windows")]
    {
        Command::new("explorer")
            .arg(format!("/select,{}", path.to_string_lossy()))
            .spawn()
            .ok();
        Command::new("explorer").arg(path).spawn().ok();
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(parent) = path.parent() {
            Command::new("xdg-open").arg(parent).spawn().ok();
        }
        Command::new("xdg-open").arg(path).spawn().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{CustomerField, Edit};
    use crate::logo;

    fn sample() -> InvoiceState {
        let seed = toml::from_str(crate::settings::DEFAULT_SEED_TEMPLATE).unwrap();
        InvoiceState::from_seed(seed)
    }

    #[test]
    fn flow_document_has_items_and_total() {
        let doc = render_typst(&sample(), "Rs.", None).unwrap();
        assert!(doc.contains("\"Red velvet Cake\""));
        assert!(doc.contains("\"Rs. 3,740\""));
        assert!(doc.contains("\"Rs. 5,300\""));
        assert!(doc.contains("#section-items-table"));
        assert!(!doc.contains("#place("));
        assert!(!doc.contains("#image("));
    }

    #[test]
    fn custom_document_places_every_section() {
        let state = sample()
            .apply(Edit::SetCustomLayout(true))
            .unwrap()
            .update_layout_position_by_name("total", 100.0, 200.0)
            .unwrap();
        let doc = render_typst(&state, "Rs.", None).unwrap();
        assert_eq!(doc.matches("#place(").count(), 8);
        assert!(doc.contains("dx: 75.00pt, dy: 150.00pt, block(width: 180.00pt, section-total)"));
        assert!(!doc.contains("handle"));
    }

    #[test]
    fn empty_invoice_shows_placeholder() {
        let mut state = sample();
        state.items.clear();
        let doc = render_typst(&state, "Rs.", None).unwrap();
        assert!(doc.contains("No items added yet"));
        assert!(doc.contains("\"Rs. 0\""));
    }

    #[test]
    fn user_text_is_escaped() {
        let state = sample()
            .apply(Edit::Customer(CustomerField::Name, "#evil \"quote\" \\ [x]".into()))
            .and_then(|s| s.apply(Edit::Customer(CustomerField::Address, "Line 1\nLine 2".into())))
            .unwrap();
        let doc = render_typst(&state, "Rs.", None).unwrap();
        assert!(doc.contains(r##"#strong("#evil \"quote\" \\ [x]")"##));
        assert!(doc.contains(r#""Line 1\nLine 2""#));
    }

    #[test]
    fn logo_is_written_beside_document() {
        let dir = tempfile::tempdir().unwrap();
        let logo = logo::decode("mark.png", logo::tests::png_bytes(3, 3)).unwrap();
        let state = sample().apply(Edit::SetLogo(Some(logo))).unwrap();
        let typ = write_document(&state, "Rs.", dir.path(), "INV-0002").unwrap();
        assert!(dir.path().join("INV-0002.logo.png").exists());
        let doc = fs::read_to_string(typ).unwrap();
        assert!(doc.contains(r#"#image("INV-0002.logo.png", height: 84pt)"#));
    }

    #[test]
    fn output_paths_use_slugs() {
        let state = sample();
        assert_eq!(file_stem(&state), "INV-0002");
        assert_eq!(
            output_dir(Path::new("/out"), &state, 2025),
            PathBuf::from("/out/2025/kandy-fashion")
        );
    }

    #[test]
    fn missing_typst_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            typst: "definitely-not-typst-binary".into(),
            ..AppSettings::default()
        };
        let err = export(&sample(), &settings, dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::TypstMissing(_)));
    }
}
