// AlertSleuth - gui.rs
//
// Top-level eframe::App implementation.
// Wires together all UI panels and manages the load lifecycle.

use crate::app::load::{LoadManager, LoadProgress};
use crate::app::state::AppState;
use crate::core::export::{self, ExportFormat};
use crate::ui;
use std::path::Path;

/// The AlertSleuth application.
pub struct AlertSleuthApp {
    pub state: AppState,
    pub load_manager: LoadManager,
}

impl AlertSleuthApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            load_manager: LoadManager::new(),
        }
    }

    fn start_load(&mut self) {
        self.state.pending_reload = false;
        self.state.status_message = format!("Loading workbook from {}\u{2026}", self.state.source);
        self.load_manager.start_load(
            self.state.source.clone(),
            self.state.layout.clone(),
            self.state.max_download_bytes,
        );
    }

    fn handle_progress(&mut self, msg: LoadProgress) {
        match msg {
            LoadProgress::Fetching { source } => {
                self.state.status_message = format!("Fetching {source}\u{2026}");
            }
            LoadProgress::Fetched { bytes } => {
                self.state.status_message =
                    format!("Reading sheets ({:.1} MB)\u{2026}", bytes as f64 / 1_048_576.0);
            }
            LoadProgress::Completed { dataset } => {
                self.state.set_dataset(*dataset);
            }
            LoadProgress::Failed { error } => {
                self.state.set_load_failed(error);
            }
        }
    }

    /// Export entry point: asks for confirmation above the large-export
    /// threshold, otherwise goes straight to the save dialog.
    fn request_export(&mut self, format: ExportFormat) {
        let count = self.state.export_count();
        if count > self.state.large_export_threshold {
            self.state.pending_large_export = Some((format, count));
        } else {
            self.export(format);
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let Some(records) = self.state.exportable_records() else {
            self.state.status_message = "Nothing to export: enter search criteria first.".into();
            return;
        };
        let suggested = Path::new(&self.state.export_file_name)
            .with_extension(format.extension())
            .to_string_lossy()
            .into_owned();
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(suggested.as_str())
            .save_file()
        else {
            return;
        };
        match export::export_to_file(format, &records, &self.state.layout.columns, &dest) {
            Ok(n) => {
                self.state.status_message =
                    format!("Exported {n} records to {}.", dest.display());
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                self.state.status_message = format!("Export failed: {e}");
            }
        }
    }

    fn render_large_export_confirm(&mut self, ctx: &egui::Context) {
        let Some((format, count)) = self.state.pending_large_export else {
            return;
        };
        let mut decision: Option<bool> = None;
        egui::Window::new("Large export")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "You are about to export {count} records. This may take a while."
                    ))
                    .color(ui::theme::WARNING_TEXT),
                );
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Export").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });
        if let Some(proceed) = decision {
            self.state.pending_large_export = None;
            if proceed {
                self.export(format);
            }
        }
    }
}

impl eframe::App for AlertSleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.pending_reload {
            self.start_load();
        }

        // Poll for load progress
        let messages = self.load_manager.poll_progress();
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.handle_progress(msg);
        }
        // Keep polling while the background thread is working.
        if had_messages {
            ctx.request_repaint();
        } else if self.load_manager.is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let loading = self.load_manager.is_loading();
        let can_export = self.state.export_count() > 0;

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    ui.add_enabled_ui(!loading, |ui| {
                        if ui.button("Reload workbook").clicked() {
                            self.state.pending_reload = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    // Export sub-menu -- enabled only when there are results
                    ui.add_enabled_ui(can_export, |ui| {
                        ui.menu_button("Export", |ui| {
                            for format in [ExportFormat::Xlsx, ExportFormat::Csv, ExportFormat::Json]
                            {
                                if ui.button(format!("{}\u{2026}", format.label())).clicked() {
                                    self.request_export(format);
                                    ui.close_menu();
                                }
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(egui::Frame::default().fill(ui::theme::STATUS_BG).inner_margin(4.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if loading {
                        ui.spinner();
                    }
                    ui.label(
                        egui::RichText::new(&self.state.status_message)
                            .color(ui::theme::STATUS_TEXT),
                    );
                    if !self.state.warnings.is_empty() {
                        ui.separator();
                        ui.label(
                            egui::RichText::new(format!(
                                "\u{26a0} {} warning(s)",
                                self.state.warnings.len()
                            ))
                            .color(ui::theme::WARNING_TEXT),
                        )
                        .on_hover_text(self.state.warnings.join("\n"));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let total = self.state.records().len();
                        if self.state.outcome.is_applied() && total > 0 {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{}/{total} records",
                                    self.state.outcome.len()
                                ))
                                .color(ui::theme::STATUS_TEXT),
                            );
                        }
                    });
                });
            });

        // Left sidebar
        egui::SidePanel::left("sidebar")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("sidebar_filters")
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui::panels::filters::render(ui, &mut self.state);
                    });
            });

        // Central panel (results)
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::results::render(ui, &self.state);
        });

        // Dialogs
        self.render_large_export_confirm(ctx);
        ui::panels::about::render(ctx, &mut self.state);
    }
}
