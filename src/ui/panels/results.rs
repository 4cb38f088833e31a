// AlertSleuth - ui/panels/results.rs
//
// Central results view: loading / failed / waiting / no-results states and
// the virtual-scrolling results table.
//
// Uses egui's `ScrollArea::show_rows` so only visible rows are laid out,
// keeping "show all" usable on large workbooks.

use crate::app::state::{AppState, ResultsView};
use crate::core::model::Record;
use crate::core::present::{self, Link};
use crate::ui::theme;

/// Render the results panel (central area).
pub fn render(ui: &mut egui::Ui, state: &AppState) {
    let headers = state.layout.columns.projected();
    match state.results_view() {
        ResultsView::Loading => {
            ui.centered_and_justified(|ui| {
                ui.horizontal_centered(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading workbook from {}\u{2026}", state.source));
                });
            });
        }
        ResultsView::LoadFailed(error) => {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "The workbook could not be loaded.\n\n{error}\n\nUse File \u{2192} Reload workbook to try again."
                    ))
                    .color(theme::ERROR_TEXT),
                );
            });
        }
        ResultsView::WaitingForInput => {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new(
                        "Enter words to search in the title or pick CPV codes to see results.",
                    )
                    .color(theme::HINT_TEXT),
                );
            });
        }
        ResultsView::NoResults => {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("No results match the current search.")
                        .color(theme::WARNING_TEXT),
                );
            });
        }
        ResultsView::Rows(rows) => {
            ui.label(egui::RichText::new(format!("Results found: {}", rows.len())).strong());
            ui.separator();
            render_header(ui, &headers);
            ui.separator();
            render_rows(ui, &rows);
        }
    }
}

fn render_header(ui: &mut egui::Ui, headers: &[&str; 6]) {
    let title_width = title_column_width(ui);
    let widths = [
        theme::DATE_COL_WIDTH,
        title_width,
        theme::LINK_COL_WIDTH,
        theme::LINK_COL_WIDTH,
        theme::SOURCE_COL_WIDTH,
        theme::CODES_COL_WIDTH,
    ];
    ui.horizontal(|ui| {
        for (header, width) in headers.iter().zip(widths) {
            ui.add_sized(
                [width, theme::ROW_HEIGHT],
                egui::Label::new(egui::RichText::new(*header).strong()).truncate(),
            );
        }
    });
}

fn render_rows(ui: &mut egui::Ui, rows: &[&Record]) {
    let title_width = title_column_width(ui);
    egui::ScrollArea::vertical()
        .id_salt("results_table")
        .auto_shrink([false; 2])
        .show_rows(ui, theme::ROW_HEIGHT, rows.len(), |ui, row_range| {
            for idx in row_range {
                let Some(record) = rows.get(idx) else {
                    continue;
                };
                ui.horizontal(|ui| {
                    ui.add_sized(
                        [theme::DATE_COL_WIDTH, theme::ROW_HEIGHT],
                        egui::Label::new(present::date_text(record)),
                    );
                    ui.add_sized(
                        [title_width, theme::ROW_HEIGHT],
                        egui::Label::new(record.title.as_str()).truncate(),
                    )
                    .on_hover_text(record.title.as_str());
                    link_cell(ui, present::url_link(record));
                    link_cell(ui, present::document_link(record));
                    ui.add_sized(
                        [theme::SOURCE_COL_WIDTH, theme::ROW_HEIGHT],
                        egui::Label::new(
                            egui::RichText::new(record.source_sheet.as_str())
                                .small()
                                .color(theme::source_colour(record.source_sheet.as_str())),
                        )
                        .truncate(),
                    );
                    let codes = record.classification_codes.as_deref().unwrap_or_default();
                    ui.add_sized(
                        [theme::CODES_COL_WIDTH, theme::ROW_HEIGHT],
                        egui::Label::new(egui::RichText::new(codes).small()).truncate(),
                    )
                    .on_hover_text(codes);
                });
            }
        });
}

fn link_cell(ui: &mut egui::Ui, link: Link<'_>) {
    let size = [theme::LINK_COL_WIDTH, theme::ROW_HEIGHT];
    match link {
        Link::Available { label, url } => {
            ui.add_sized(size, egui::Hyperlink::from_label_and_url(label, url))
                .on_hover_text(url);
        }
        Link::Missing => {
            ui.add_sized(
                size,
                egui::Label::new(
                    egui::RichText::new(crate::util::constants::NO_LINK_PLACEHOLDER)
                        .color(theme::HINT_TEXT),
                ),
            );
        }
    }
}

/// Title column gets whatever the fixed columns leave, with a floor.
fn title_column_width(ui: &egui::Ui) -> f32 {
    let fixed = theme::DATE_COL_WIDTH
        + 2.0 * theme::LINK_COL_WIDTH
        + theme::SOURCE_COL_WIDTH
        + theme::CODES_COL_WIDTH
        + 6.0 * ui.spacing().item_spacing.x;
    (ui.available_width() - fixed).max(200.0)
}
