use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::logo::Logo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub id: ItemId,
    pub description: String,
    pub price: f64,
    pub quantity: f64,
}

impl InvoiceItem {
    /// Line amount: price × quantity.
    pub fn amount(&self) -> f64 {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub number: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String, // may span several lines
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Item line as written in a seed file, before it gets an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedItem {
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

fn default_quantity() -> f64 {
    1.0
}

/// The configuration-file form of an invoice, used to pre-fill the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSeed {
    pub invoice: InvoiceDetails,
    pub customer: CustomerDetails,
    #[serde(default)]
    pub items: Vec<SeedItem>,
    pub payment: PaymentDetails,
    pub company: CompanyDetails,
    #[serde(default)]
    pub terms: String,
}

impl InvoiceSeed {
    /// Fills a blank invoice date with `today`, e.g. "22 December, 2025".
    pub fn with_default_date(mut self, today: NaiveDate) -> Self {
        if self.invoice.date.trim().is_empty() {
            self.invoice.date = today.format("%-d %B, %Y").to_string();
        }
        self
    }
}

/// The whole editable invoice. Replaced as a unit on every edit.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceState {
    pub invoice: InvoiceDetails,
    pub customer: CustomerDetails,
    pub items: Vec<InvoiceItem>,
    pub payment: PaymentDetails,
    pub company: CompanyDetails,
    pub terms: String,
    pub logo: Option<Logo>,
    pub custom_layout: bool,
    pub layout: Layout,
    next_id: u64,
}

impl InvoiceState {
    pub fn from_seed(seed: InvoiceSeed) -> Self {
        let mut state = InvoiceState {
            invoice: seed.invoice,
            customer: seed.customer,
            items: Vec::with_capacity(seed.items.len()),
            payment: seed.payment,
            company: seed.company,
            terms: seed.terms,
            logo: None,
            custom_layout: false,
            layout: Layout::default(),
            next_id: 1,
        };
        for item in seed.items {
            let id = state.fresh_id();
            state.items.push(InvoiceItem {
                id,
                description: item.description,
                price: non_negative(item.price),
                quantity: non_negative(item.quantity),
            });
        }
        state
    }

    /// Grand total, recomputed from the items on every call.
    pub fn total(&self) -> f64 {
        self.items.iter().map(InvoiceItem::amount).sum()
    }

    pub fn item(&self, id: ItemId) -> Option<&InvoiceItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn fresh_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Prices and quantities are finite and non-negative; anything else is 0.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Formats an amount the way the invoice prints it: thousands separators and
/// at most two decimals, trailing zeros dropped.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_seed() -> InvoiceSeed {
        toml::from_str(crate::settings::DEFAULT_SEED_TEMPLATE).unwrap()
    }

    #[test]
    fn sample_invoice_total() {
        let state = InvoiceState::from_seed(sample_seed());
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[0].amount(), 3740.0);
        assert_eq!(state.items[1].amount(), 1560.0);
        assert_eq!(state.total(), 5300.0);
    }

    #[test]
    fn from_seed_assigns_ids_in_order() {
        let state = InvoiceState::from_seed(sample_seed());
        assert!(state.items[0].id < state.items[1].id);
        assert_eq!(state.item(state.items[1].id).unwrap().description, "Marble Cake");
    }

    #[test]
    fn empty_invoice_totals_zero() {
        let mut seed = sample_seed();
        seed.items.clear();
        assert_eq!(InvoiceState::from_seed(seed).total(), 0.0);
    }

    #[test]
    fn seed_item_defaults() {
        let item: SeedItem = toml::from_str(r#"description = "Cupcake""#).unwrap();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 1.0);
    }

    #[test]
    fn seed_numbers_are_clamped_to_non_negative() {
        let mut seed = sample_seed();
        seed.items[0].price = -340.0;
        seed.items[0].quantity = f64::NAN;
        seed.items[1].price = f64::INFINITY;
        let state = InvoiceState::from_seed(seed);
        assert_eq!(state.items[0].price, 0.0);
        assert_eq!(state.items[0].quantity, 0.0);
        assert_eq!(state.items[1].price, 0.0);
        assert_eq!(state.items[1].quantity, 8.0);
        assert_eq!(state.total(), 0.0);
        assert_eq!(format_amount(state.total()), "0");
    }

    #[test]
    fn seed_toml_with_nan_and_negatives_totals_finite() {
        let item: SeedItem = toml::from_str("description = \"Bad\"\nprice = nan\nquantity = -2.0").unwrap();
        let mut seed = sample_seed();
        seed.items = vec![item];
        let state = InvoiceState::from_seed(seed);
        assert!(state.total().is_finite());
        assert_eq!(state.total(), 0.0);
    }

    #[test]
    fn blank_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let mut seed = sample_seed();
        seed.invoice.date = "  ".into();
        assert_eq!(seed.with_default_date(today).invoice.date, "7 March, 2025");
        let kept = sample_seed().with_default_date(today);
        assert_eq!(kept.invoice.date, "22 December, 2025");
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(5300.0), "5,300");
        assert_eq!(format_amount(3740.0), "3,740");
        assert_eq!(format_amount(340.0), "340");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(1234.5), "1,234.5");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-1500.0), "-1,500");
    }
}
