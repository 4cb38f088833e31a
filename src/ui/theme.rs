// AlertSleuth - ui/theme.rs
//
// Colours for result states and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Load failure banner text.
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 38, 38); // Red 600

/// "No results" and large-export warnings.
pub const WARNING_TEXT: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600

/// Neutral hint text ("waiting for input", link placeholder).
pub const HINT_TEXT: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500

/// Source sheet column: BOE rows vs DOUE rows.
pub fn source_colour(sheet: &str) -> Color32 {
    if sheet.starts_with("DOUE") {
        Color32::from_rgb(59, 130, 246) // Blue 500
    } else {
        Color32::from_rgb(16, 185, 129) // Emerald 500
    }
}

/// Status bar colours.
pub const STATUS_BG: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 320.0;
pub const CODE_LIST_HEIGHT: f32 = 320.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;

/// Results table column widths: date, URL, document, source, CPVs.
/// The title column takes the remaining width.
pub const DATE_COL_WIDTH: f32 = 90.0;
pub const LINK_COL_WIDTH: f32 = 110.0;
pub const SOURCE_COL_WIDTH: f32 = 190.0;
pub const CODES_COL_WIDTH: f32 = 180.0;
