//! Main viewer window
//!
//! All database calls run on the UI thread via `Runtime::block_on`, so the
//! window does not repaint while a lookup is in flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eframe::egui::{self, RichText, Rounding, Vec2};
use tokio::runtime::Runtime;

use super::dialog;
use super::theme::{FontSize, Radius, Spacing, Theme};
use crate::core::BalanceOutcome;
use crate::settings::Settings;
use crate::viewer::{Notice, Viewer};

const WINDOW_TITLE: &str = "JoyBank Account Viewer";
const WINDOW_SIZE: [f32; 2] = [400.0, 200.0];

/// How the GUI session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Closed,
    InitFailed,
}

/// Open the viewer window and block until it is closed
pub fn run(settings: Settings, runtime: Runtime) -> anyhow::Result<RunOutcome> {
    let init_failed = Arc::new(AtomicBool::new(false));
    let app_init_failed = init_failed.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            Ok(Box::new(ViewerApp::new(
                cc,
                &settings,
                runtime,
                app_init_failed,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;

    if init_failed.load(Ordering::SeqCst) {
        Ok(RunOutcome::InitFailed)
    } else {
        Ok(RunOutcome::Closed)
    }
}

struct ViewerApp {
    runtime: Runtime,
    viewer: Option<Viewer>,
    /// Dropdown entries, sorted
    names: Vec<String>,
    selected: Option<usize>,
    balance_text: String,
    dialogs: VecDeque<Notice>,
}

impl ViewerApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        settings: &Settings,
        runtime: Runtime,
        init_failed: Arc<AtomicBool>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let mut dialogs = VecDeque::new();

        let viewer = match runtime.block_on(Viewer::start(settings)) {
            Ok((viewer, notice)) => {
                dialogs.extend(notice);
                Some(viewer)
            }
            Err(e) => {
                tracing::error!("{}", e);
                init_failed.store(true, Ordering::SeqCst);
                dialogs.push_back(Notice::from(&e));
                None
            }
        };

        let names = viewer.as_ref().map(Viewer::display_names).unwrap_or_default();

        Self {
            runtime,
            viewer,
            names,
            selected: None,
            balance_text: BalanceOutcome::idle_label().to_string(),
            dialogs,
        }
    }

    fn on_user_select(&mut self, index: usize) {
        let Some(name) = self.names.get(index).cloned() else {
            return;
        };
        let Some(viewer) = &self.viewer else {
            return;
        };

        let selection = self.runtime.block_on(viewer.select(&name));
        self.balance_text = selection.outcome.to_string();
        self.dialogs.extend(selection.notice);
    }

    fn show_main(&mut self, ui: &mut egui::Ui) -> Option<usize> {
        let mut picked = None;

        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("Select a user:")
                    .size(FontSize::LG)
                    .color(Theme::TEXT_SECONDARY),
            );
            ui.add_space(Spacing::XS);

            let selected_text = self
                .selected
                .and_then(|i| self.names.get(i))
                .map(String::as_str)
                .unwrap_or("");

            egui::ComboBox::from_id_salt("user_select")
                .selected_text(selected_text)
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    // Re-picking the current entry refreshes the balance,
                    // so react to clicks rather than value changes.
                    for (i, name) in self.names.iter().enumerate() {
                        if ui
                            .selectable_value(&mut self.selected, Some(i), name)
                            .clicked()
                        {
                            picked = Some(i);
                        }
                    }
                });

            ui.add_space(Spacing::XL);

            egui::Frame::none()
                .fill(Theme::BG_SECONDARY)
                .rounding(Rounding::same(Radius::LG))
                .inner_margin(Spacing::MD)
                .show(ui, |ui| {
                    ui.set_min_size(Vec2::new(ui.available_width(), 0.0));
                    ui.label(
                        RichText::new(&self.balance_text)
                            .size(FontSize::XL)
                            .color(Theme::TEXT_PRIMARY)
                            .strong(),
                    );
                });
        });

        picked
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.dialogs.front() else {
            return;
        };

        if dialog::show(ctx, notice) {
            let fatal = notice.fatal;
            self.dialogs.pop_front();
            if fatal {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let modal_open = !self.dialogs.is_empty();
        let mut selected = None;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(Theme::BG_PRIMARY)
                    .inner_margin(Spacing::XL),
            )
            .show(ctx, |ui| {
                ui.add_enabled_ui(!modal_open, |ui| {
                    selected = self.show_main(ui);
                });
            });

        if let Some(index) = selected {
            self.on_user_select(index);
        }

        self.show_dialog(ctx);
    }
}
