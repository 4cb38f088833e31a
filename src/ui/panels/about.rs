// AlertSleuth - ui/panels/about.rs
//
// About dialog, opened from Help -> About.
// Rendered as a centred, non-resizable, non-collapsible window.

use crate::app::state::AppState;
use crate::util::constants;

/// Render the About dialog (if `state.show_about` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_about {
        return;
    }

    let mut open = true;
    egui::Window::new(format!("About {}", constants::APP_NAME))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .min_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(format!("\u{1f50d}  {}", constants::APP_NAME))
                        .size(28.0)
                        .strong(),
                );
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(format!("v{}", constants::APP_VERSION))
                        .size(14.0)
                        .weak(),
                );
            });

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);

            ui.vertical_centered(|ui| {
                ui.label("Search BOE and DOUE alert workbooks");
                ui.label("by title words and CPV codes.");
            });

            ui.add_space(10.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Workbook source:").small().weak());
                ui.label(egui::RichText::new(state.source.to_string()).small().monospace());
                ui.label(
                    egui::RichText::new(format!(
                        "Sheets: {}",
                        state.layout.sheets.join(", ")
                    ))
                    .small()
                    .weak(),
                );
            });

            ui.add_space(8.0);
            ui.separator();
            ui.add_space(6.0);

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
            });

            ui.add_space(8.0);
        });

    if !open {
        state.show_about = false;
    }
}
