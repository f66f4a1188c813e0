//! Colors, font sizes and spacing for the viewer window

use eframe::egui::Color32;

pub struct Theme;

impl Theme {
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(24, 24, 27);
    pub const BG_SECONDARY: Color32 = Color32::from_rgb(39, 39, 42);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(244, 244, 245);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(212, 212, 216);
    pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(59, 130, 246);
    pub const RED: Color32 = Color32::from_rgb(239, 68, 68);

    /// Scrim drawn behind an open dialog
    pub fn dialog_scrim() -> Color32 {
        Color32::from_black_alpha(140)
    }
}

pub struct FontSize;

impl FontSize {
    pub const SM: f32 = 12.0;
    pub const MD: f32 = 14.0;
    pub const LG: f32 = 16.0;
    pub const XL: f32 = 18.0;
}

pub struct Spacing;

impl Spacing {
    pub const XS: f32 = 4.0;
    pub const MD: f32 = 12.0;
    pub const LG: f32 = 16.0;
    pub const XL: f32 = 20.0;
}

pub struct Radius;

impl Radius {
    pub const SM: f32 = 6.0;
    pub const LG: f32 = 10.0;
}
