// AlertSleuth - ui/panels/filters.rs
//
// Filter controls sidebar: title search, CPV multi-select, show-all toggle.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the filter controls.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Search");
    ui.separator();

    ui.label(format!("Total records available: {}", state.records().len()));
    ui.add_space(4.0);

    // Title search: every word must appear in the title.
    ui.label("Words in the title:");
    let text_response = ui.add(
        egui::TextEdit::singleline(&mut state.filter_state.query)
            .hint_text("e.g. suministro hospital")
            .desired_width(f32::INFINITY),
    );
    if text_response.changed() {
        state.apply_filters();
    }

    ui.add_space(8.0);
    ui.separator();

    render_code_picker(ui, state);

    ui.add_space(8.0);
    ui.separator();

    ui.checkbox(&mut state.show_all, "Show all records")
        .on_hover_text("Renders the whole table; slow for large workbooks.");

    ui.add_space(4.0);
    if ui.button("Clear Filters").clicked() {
        state.clear_filters();
    }
}

/// CPV multi-select: a narrowing field above a virtual-scroll checkbox list.
fn render_code_picker(ui: &mut egui::Ui, state: &mut AppState) {
    let selected = state.filter_state.selected_codes.len();
    ui.horizontal(|ui| {
        ui.label("CPV codes:");
        if selected > 0 {
            ui.label(egui::RichText::new(format!("{selected} selected")).small().weak());
            if ui.small_button("None").clicked() {
                state.filter_state.selected_codes.clear();
                state.apply_filters();
            }
        }
    });

    ui.add(
        egui::TextEdit::singleline(&mut state.code_search)
            .hint_text("Narrow list\u{2026}")
            .desired_width(f32::INFINITY),
    );

    // Snapshot labels so toggling can borrow `state` mutably afterwards.
    let rows: Vec<(String, bool)> = state
        .visible_codes()
        .into_iter()
        .map(|c| {
            let checked = state.filter_state.selected_codes.contains(&c.label);
            (c.label.clone(), checked)
        })
        .collect();

    if rows.is_empty() {
        ui.label(egui::RichText::new("No CPV codes match.").small().color(theme::HINT_TEXT));
        return;
    }

    let mut toggled: Option<String> = None;
    egui::ScrollArea::vertical()
        .id_salt("cpv_code_list")
        .max_height(theme::CODE_LIST_HEIGHT)
        .auto_shrink([false, true])
        .show_rows(ui, theme::ROW_HEIGHT, rows.len(), |ui, row_range| {
            for idx in row_range {
                let Some((label, checked)) = rows.get(idx) else {
                    continue;
                };
                let mut checked = *checked;
                if ui
                    .checkbox(&mut checked, egui::RichText::new(label.as_str()).small())
                    .on_hover_text(label.as_str())
                    .changed()
                {
                    toggled = Some(label.clone());
                }
            }
        });

    if let Some(label) = toggled {
        state.toggle_code(&label);
    }
}
