//! Modal message dialog

use eframe::egui::{self, Align2, Color32, RichText, Rounding, Stroke, Vec2};

use super::theme::{FontSize, Radius, Spacing, Theme};
use crate::viewer::{Notice, NoticeKind};

/// Draw `notice` centered over a dimmed window. Returns true once dismissed.
pub fn show(ctx: &egui::Context, notice: &Notice) -> bool {
    let screen_rect = ctx.screen_rect();

    egui::Area::new(egui::Id::new("dialog_scrim"))
        .fixed_pos(screen_rect.min)
        .order(egui::Order::Middle)
        .interactable(false)
        .show(ctx, |ui| {
            ui.painter().rect_filled(screen_rect, 0.0, Theme::dialog_scrim());
        });

    let (icon, accent) = match notice.kind {
        NoticeKind::Info => ("ℹ", Theme::ACCENT_PRIMARY),
        NoticeKind::Error => ("✕", Theme::RED),
    };

    let mut dismissed = false;

    egui::Window::new(RichText::new(&notice.title).size(FontSize::MD).strong())
        .id(egui::Id::new("notice_dialog"))
        .order(egui::Order::Foreground)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .max_width(screen_rect.width() - 2.0 * Spacing::LG)
        .frame(
            egui::Frame::window(&ctx.style())
                .fill(Theme::BG_SECONDARY)
                .rounding(Rounding::same(Radius::LG))
                .stroke(Stroke::new(1.0, accent.gamma_multiply(0.5))),
        )
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(icon).size(FontSize::LG).color(accent));
                ui.add_space(Spacing::XS);
                ui.label(
                    RichText::new(&notice.message)
                        .size(FontSize::SM)
                        .color(Theme::TEXT_SECONDARY),
                );
            });

            ui.add_space(Spacing::MD);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let ok = ui.add(
                    egui::Button::new(RichText::new("OK").size(FontSize::SM).color(Color32::WHITE))
                        .fill(accent)
                        .rounding(Rounding::same(Radius::SM))
                        .min_size(Vec2::new(64.0, 24.0)),
                );
                if ok.clicked() {
                    dismissed = true;
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape)) {
        dismissed = true;
    }

    dismissed
}
