//! Navy / coral look: palette, egui visuals, optional custom font and the
//! glowing title-bar buttons.

use std::path::Path;
use eframe::egui::{
    self, Align2, Color32, FontData, FontDefinitions, FontFamily, FontId, Response, Rounding, Sense, Stroke, Ui,
    Visuals,
};

pub const NAVY: Color32 = Color32::from_rgb(0x0f, 0x1f, 0x2d);
pub const RED: Color32 = Color32::from_rgb(0xb2, 0x22, 0x22);
pub const CORAL: Color32 = Color32::from_rgb(0xff, 0x63, 0x47);
pub const CREAM: Color32 = Color32::from_rgb(0xff, 0xf5, 0xee);
pub const TRACK: Color32 = Color32::from_rgb(0x32, 0x43, 0x55);
pub const FIELD: Color32 = Color32::from_rgb(0x13, 0x24, 0x35);
pub const GOLD: Color32 = Color32::from_rgb(0xff, 0xe0, 0x70);

/// Seconds the hover glow takes to fade in or out
const GLOW_SECS: f32 = 0.18;
/// Glow reach in pixels at full strength
const GLOW_RADIUS: f32 = 9.0;

pub fn visuals() -> Visuals {
    let mut v = Visuals::dark();
    v.override_text_color = Some(CREAM);
    v.panel_fill = NAVY;
    v.window_fill = NAVY;
    v.extreme_bg_color = FIELD;
    v.faint_bg_color = FIELD;
    v.selection.bg_fill = RED;
    v.selection.stroke = Stroke::new(1.0, CORAL);
    v.window_rounding = Rounding::same(14.0);
    v.window_stroke = Stroke::new(1.0, TRACK);

    let w = &mut v.widgets;
    w.inactive.weak_bg_fill = RED;
    w.inactive.bg_fill = FIELD;
    w.inactive.bg_stroke = Stroke::new(2.0, CORAL);
    w.hovered.weak_bg_fill = CORAL;
    w.hovered.bg_stroke = Stroke::new(2.0, CORAL);
    w.active.weak_bg_fill = CORAL.gamma_multiply(0.67);
    w.active.bg_stroke = Stroke::new(2.0, CORAL);
    for state in [&mut w.inactive, &mut w.hovered, &mut w.active, &mut w.open] {
        state.rounding = Rounding::same(8.0);
    }
    v
}

/// Applies the palette and, when `font` points at a readable file, makes it
/// the proportional font.
pub fn apply(ctx: &egui::Context, font: Option<&Path>) {
    ctx.set_visuals(visuals());
    let mut style = (*ctx.style()).clone();
    style.spacing.button_padding = egui::vec2(20.0, 8.0);
    style.spacing.item_spacing = egui::vec2(12.0, 12.0);
    ctx.set_style(style);

    let Some(path) = font else { return };
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut fonts = FontDefinitions::default();
            fonts.font_data.insert("custom".to_owned(), FontData::from_owned(bytes));
            fonts.families.entry(FontFamily::Proportional).or_default().insert(0, "custom".to_owned());
            ctx.set_fonts(fonts);
            log::info!("Using UI font {}", path.display());
        }
        Err(e) => log::warn!("Could not read font {}: {}", path.display(), e),
    }
}

/// Small square button whose glow fades in while hovered.
pub fn glow_button(ui: &mut Ui, text: &str, glow: Color32, idle_text: Color32, hover_fill: Color32) -> Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(24.0, 24.0), Sense::click());
    let strength = ui.ctx().animate_bool_with_time(response.id, response.hovered(), GLOW_SECS);

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        for step in (1..=4).rev() {
            let reach = GLOW_RADIUS * strength * step as f32 / 4.0;
            let alpha = strength * 0.18;
            painter.rect_filled(rect.expand(reach), 4.0 + reach, glow.gamma_multiply(alpha));
        }
        let fill = if response.is_pointer_button_down_on() {
            hover_fill.gamma_multiply(0.67)
        } else if response.hovered() {
            hover_fill
        } else {
            Color32::TRANSPARENT
        };
        painter.rect_filled(rect, 4.0, fill);
        let text_color = if response.hovered() { CREAM } else { idle_text };
        painter.text(rect.center(), Align2::CENTER_CENTER, text, FontId::proportional(16.0), text_color);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_applied_to_widgets() {
        let v = visuals();
        assert_eq!(v.panel_fill, NAVY);
        assert_eq!(v.override_text_color, Some(CREAM));
        assert_eq!(v.widgets.inactive.weak_bg_fill, RED);
        assert_eq!(v.widgets.hovered.weak_bg_fill, CORAL);
    }
}
