//! "Loading..." text plus a row of icons that fill up with download progress.

use std::collections::HashMap;
use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Ui};

use crate::{easing, theme};

pub const TOTAL_ICONS: usize = 10;
const DOT_INTERVAL: f64 = 0.4;
const BOB_PERIOD: f64 = 2.4;
const BOB_AMPLITUDE: f32 = 2.0;
const BOUNCE_SECS: f64 = 0.35;
const BOUNCE_HEIGHT: f32 = 12.0;
const ICON_SIZE: f32 = 32.0;

/// How many icons are lit for `pct` percent
pub fn filled_icons(pct: u8) -> usize {
    (pct.min(100) as usize * TOTAL_ICONS + 50) / 100
}

/// `Loading` followed by 0 to 3 dots, one step every 400 ms
pub fn loading_text(elapsed: f64) -> String {
    let phase = (elapsed.max(0.0) / DOT_INTERVAL) as usize % 4;
    format!("Loading{}", ".".repeat(phase))
}

/// Idle bob of icon `idx`: keyframes -2, +2, -2 over 2.4 s, staggered.
pub fn bob_offset(idx: usize, elapsed: f64) -> f32 {
    let phase = (elapsed / BOB_PERIOD + idx as f64 / TOTAL_ICONS as f64).rem_euclid(1.0) as f32;
    if phase < 0.5 {
        easing::lerp(-BOB_AMPLITUDE, BOB_AMPLITUDE, phase * 2.0)
    } else {
        easing::lerp(BOB_AMPLITUDE, -BOB_AMPLITUDE, (phase - 0.5) * 2.0)
    }
}

/// Extra offset of a bounce that started `since` seconds ago.
pub fn bounce_offset(since: f64) -> f32 {
    if !(0.0..BOUNCE_SECS).contains(&since) {
        return 0.0;
    }
    easing::lerp(-BOUNCE_HEIGHT, 0.0, easing::out_bounce((since / BOUNCE_SECS) as f32))
}

#[derive(Debug, Default)]
pub struct Loader {
    started: f64,
    percent: u8,
    /// Icon index -> time its one-off bounce started
    bounced: HashMap<usize, f64>,
}

impl Loader {
    pub fn new(now: f64) -> Self {
        Self { started: now, ..Default::default() }
    }

    #[cfg(test)]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Records progress; it never goes backwards.
    pub fn set_progress(&mut self, pct: u8, now: f64) {
        if pct <= self.percent {
            return;
        }
        self.percent = pct.min(100);
        for i in 0..filled_icons(self.percent) {
            self.bounced.entry(i).or_insert(now);
        }
    }

    pub fn filled(&self) -> usize {
        filled_icons(self.percent)
    }

    pub fn ui(&self, ui: &mut Ui) {
        let now = ui.input(|i| i.time);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(loading_text(now - self.started)).size(32.0).color(theme::CREAM));
            ui.add_space(8.0);

            let width = TOTAL_ICONS as f32 * (ICON_SIZE + 6.0);
            let (rect, _) = ui.allocate_exact_size(egui::vec2(width, ICON_SIZE + 2.0 * BOUNCE_HEIGHT), Sense::hover());
            let painter = ui.painter_at(rect.expand(2.0));
            let filled = self.filled();
            for i in 0..TOTAL_ICONS {
                let mut dy = bob_offset(i, now - self.started);
                if let Some(&at) = self.bounced.get(&i) {
                    dy += bounce_offset(now - at);
                }
                let x = rect.left() + 3.0 + i as f32 * (ICON_SIZE + 6.0);
                let icon = Rect::from_min_size(Pos2::new(x, rect.top() + BOUNCE_HEIGHT + dy), egui::vec2(ICON_SIZE, ICON_SIZE));
                paint_drumstick(&painter, icon, i < filled);
            }
            ui.label(egui::RichText::new(format!("{}%", self.percent)).size(14.0).color(theme::TRACK));
        });
        ui.ctx().request_repaint();
    }
}

fn paint_drumstick(painter: &egui::Painter, rect: Rect, lit: bool) {
    let (meat, bone) = if lit {
        (theme::CORAL, theme::CREAM)
    } else {
        (Color32::from_gray(70), Color32::from_gray(110))
    };
    let s = rect.width();
    let c = rect.left_top() + egui::vec2(s * 0.38, s * 0.38);
    let tip = rect.left_top() + egui::vec2(s * 0.85, s * 0.85);
    painter.line_segment([c, tip], Stroke::new(s * 0.12, bone));
    painter.circle_filled(tip + egui::vec2(-s * 0.04, s * 0.06), s * 0.08, bone);
    painter.circle_filled(tip + egui::vec2(s * 0.06, -s * 0.04), s * 0.08, bone);
    painter.circle_filled(c, s * 0.3, meat);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_track_percentage() {
        assert_eq!(filled_icons(0), 0);
        assert_eq!(filled_icons(25), 3);
        assert_eq!(filled_icons(94), 9);
        assert_eq!(filled_icons(95), 10);
        assert_eq!(filled_icons(250), 10);
    }

    #[test]
    fn dots_cycle_every_400ms() {
        assert_eq!(loading_text(0.0), "Loading");
        assert_eq!(loading_text(0.45), "Loading.");
        assert_eq!(loading_text(1.25), "Loading...");
        assert_eq!(loading_text(1.7), "Loading");
    }

    #[test]
    fn bob_stays_within_two_pixels() {
        assert!((bob_offset(0, 0.0) + 2.0).abs() < 1e-4);
        assert!((bob_offset(0, 1.2) - 2.0).abs() < 1e-4);
        for i in 0..TOTAL_ICONS {
            for step in 0..50 {
                assert!(bob_offset(i, step as f64 * 0.1).abs() <= 2.0 + 1e-4);
            }
        }
    }

    #[test]
    fn bounce_settles() {
        assert_eq!(bounce_offset(0.0), -12.0);
        assert_eq!(bounce_offset(1.0), 0.0);
        assert_eq!(bounce_offset(-0.1), 0.0);
    }

    #[test]
    fn each_icon_bounces_once_and_progress_is_monotonic() {
        let mut l = Loader::new(0.0);
        l.set_progress(30, 1.0);
        assert_eq!(l.filled(), 3);
        assert_eq!(l.bounced.get(&0), Some(&1.0));
        l.set_progress(10, 2.0);
        assert_eq!(l.percent(), 30);
        l.set_progress(50, 3.0);
        assert_eq!(l.bounced.get(&0), Some(&1.0));
        assert_eq!(l.bounced.get(&4), Some(&3.0));
    }
}
