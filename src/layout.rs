//! Named invoice sections and their positions in custom-layout mode.
//!
//! Coordinates are document pixels on an A4 page at 96 dpi. Positions are not
//! clamped: a section may sit partly (or entirely) off the page.

use std::fmt;
use std::str::FromStr;

use crate::edit::EditError;

pub const PAGE_WIDTH: f32 = 794.0;
pub const PAGE_HEIGHT: f32 = 1123.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Logo,
    InvoiceMeta,
    Customer,
    ItemsTable,
    Total,
    Terms,
    Payment,
    Company,
}

impl Section {
    /// Every section, in flow-mode document order.
    pub const ALL: [Section; 8] = [
        Section::Logo,
        Section::InvoiceMeta,
        Section::Customer,
        Section::ItemsTable,
        Section::Total,
        Section::Terms,
        Section::Payment,
        Section::Company,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Logo => "logo",
            Section::InvoiceMeta => "invoice-meta",
            Section::Customer => "customer",
            Section::ItemsTable => "items-table",
            Section::Total => "total",
            Section::Terms => "terms",
            Section::Payment => "payment",
            Section::Company => "company",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Logo => "Logo",
            Section::InvoiceMeta => "Invoice details",
            Section::Customer => "Billed to",
            Section::ItemsTable => "Items",
            Section::Total => "Total",
            Section::Terms => "Terms",
            Section::Payment => "Payment",
            Section::Company => "Company",
        }
    }

    /// Width the section is rendered at when positioned freely.
    pub fn width(self) -> f32 {
        match self {
            Section::Logo => 200.0,
            Section::InvoiceMeta => 320.0,
            Section::Customer => 320.0,
            Section::ItemsTable => 698.0,
            Section::Total => 240.0,
            Section::Terms => 420.0,
            Section::Payment => 340.0,
            Section::Company => 300.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| EditError::UnknownSection(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPosition {
    pub x: f64,
    pub y: f64,
}

impl LayoutPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        LayoutPosition { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One position per section, indexed by [`Section`], so no section can be
/// missing or duplicated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    positions: [LayoutPosition; 8],
}

impl Default for Layout {
    fn default() -> Self {
        // Roughly where flow mode puts each section.
        Layout {
            positions: [
                LayoutPosition::new(297.0, 48.0),
                LayoutPosition::new(48.0, 200.0),
                LayoutPosition::new(426.0, 200.0),
                LayoutPosition::new(48.0, 350.0),
                LayoutPosition::new(506.0, 660.0),
                LayoutPosition::new(48.0, 740.0),
                LayoutPosition::new(48.0, 880.0),
                LayoutPosition::new(446.0, 880.0),
            ],
        }
    }
}

impl Layout {
    pub fn get(&self, section: Section) -> LayoutPosition {
        self.positions[section.index()]
    }

    pub(crate) fn set(&mut self, section: Section, position: LayoutPosition) {
        self.positions[section.index()] = position;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, LayoutPosition)> + '_ {
        Section::ALL.into_iter().map(|section| (section, self.get(section)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_round_trip() {
        for section in Section::ALL {
            assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
        }
    }

    #[test]
    fn unknown_section_name_is_rejected() {
        let err = "footer".parse::<Section>().unwrap_err();
        assert!(matches!(err, EditError::UnknownSection(name) if name == "footer"));
    }

    #[test]
    fn all_has_no_duplicates() {
        let mut names: Vec<_> = Section::ALL.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn default_layout_covers_every_section() {
        let layout = Layout::default();
        assert_eq!(layout.iter().count(), 8);
        assert!(layout.iter().all(|(_, pos)| pos.is_finite()));
        assert_eq!(layout.get(Section::Logo), LayoutPosition::new(297.0, 48.0));
    }

    #[test]
    fn set_touches_one_section() {
        let mut layout = Layout::default();
        let before = layout;
        layout.set(Section::Terms, LayoutPosition::new(-20.0, 2000.0));
        for (section, pos) in layout.iter() {
            if section == Section::Terms {
                assert_eq!(pos, LayoutPosition::new(-20.0, 2000.0));
            } else {
                assert_eq!(pos, before.get(section));
            }
        }
    }
}
