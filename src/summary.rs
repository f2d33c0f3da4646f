use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use crate::model::{format_amount, InvoiceState};

const BRAND: Color = Color::Rgb { r: 190, g: 24, b: 93 };

/// Item lines and grand total as a terminal table.
pub fn items_table(state: &InvoiceState, currency: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Description"),
        Cell::new("Price").set_alignment(CellAlignment::Right),
        Cell::new("Qty").set_alignment(CellAlignment::Right),
        Cell::new("Amount").set_alignment(CellAlignment::Right),
    ]);

    for (index, item) in state.items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.description),
            Cell::new(format_amount(item.price)).set_alignment(CellAlignment::Right),
            Cell::new(format_amount(item.quantity)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} {}", currency, format_amount(item.amount())))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    if state.items.is_empty() {
        table.add_row(vec![Cell::new(""), Cell::new("No items added yet")]);
    }

    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{} {}", currency, format_amount(state.total())))
            .add_attribute(Attribute::Bold)
            .fg(BRAND)
            .set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn show_summary(state: &InvoiceState, currency: &str) {
    println!(
        "\n--- Invoice {} ({}) for {} ---",
        state.invoice.number, state.invoice.date, state.customer.name
    );
    println!("{}", items_table(state, currency));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_items_and_total() {
        let seed = toml::from_str(crate::settings::DEFAULT_SEED_TEMPLATE).unwrap();
        let state = InvoiceState::from_seed(seed);
        let mut table = items_table(&state, "Rs.");
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("Red velvet Cake"));
        assert!(rendered.contains("Rs. 1,560"));
        assert!(rendered.contains("Rs. 5,300"));
    }
}
