//! Theme and styling constants

/// Spacing constants
pub mod spacing {
    pub const XS: f32 = 4.0;
    pub const SM: f32 = 8.0;
    pub const MD: f32 = 16.0;
    pub const LG: f32 = 24.0;
    /// Page padding in flow mode.
    pub const PAGE_MARGIN: f32 = 48.0;
}

/// Invoice palette
pub mod colors {
    use egui::Color32;

    pub const BRAND: Color32 = Color32::from_rgb(190, 24, 93);
    pub const PAPER: Color32 = Color32::from_rgb(253, 251, 247);
    pub const DESK: Color32 = Color32::from_rgb(107, 114, 128);
    pub const TEXT: Color32 = Color32::from_rgb(31, 41, 55);
    pub const MUTED: Color32 = Color32::from_rgb(75, 85, 99);
    pub const RULE: Color32 = Color32::from_rgb(229, 231, 235);
    pub const HANDLE: Color32 = Color32::from_rgb(59, 130, 246);
    pub const ERROR: Color32 = Color32::from_rgb(185, 28, 28);
    pub const SUCCESS: Color32 = Color32::from_rgb(4, 120, 87);
}
