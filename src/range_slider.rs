//! Horizontal slider with three handles: selection start, playhead and
//! selection end.
//!
//! Every setter clamps its input, so the slider is always in a state where
//! `min <= lower <= value <= upper <= max`. Changes are collected in a
//! [`SliderChanges`] set that the owner drains once per frame.

use eframe::egui::{self, Color32, Pos2, Rect, Response, Sense, Ui};

use crate::theme;

/// Radius of the round handles, also the inset of the track ends
pub const HANDLE_RADIUS: f32 = 8.0;
/// Height of the groove
pub const BAR_HEIGHT: f32 = 6.0;
/// Minimum widget height
pub const MIN_HEIGHT: f32 = 28.0;

/// The three draggable control points
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliderHandle {
    Lower,
    Value,
    Upper,
}

/// What moved since the last [`RangeSlider::take_changes`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliderChanges {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
    pub value: Option<i64>,
}

impl SliderChanges {
    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none() && self.value.is_none()
    }
}

/// Maps values to x offsets within a widget of a given width
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderGeometry {
    pub width: f32,
    pub handle_radius: f32,
}

impl SliderGeometry {
    pub fn new(width: f32) -> Self {
        Self { width, handle_radius: HANDLE_RADIUS }
    }

    fn usable(&self) -> f32 {
        (self.width - 2.0 * self.handle_radius).max(0.0)
    }

    /// x offset of the centre of a handle sitting at `v`
    pub fn value_to_pos(&self, v: i64, min: i64, max: i64) -> f32 {
        let span = span(min, max);
        (v - min) as f32 / span as f32 * self.usable() + self.handle_radius
    }

    /// Value under the x offset `x`, clamped to the track
    pub fn pos_to_value(&self, x: f32, min: i64, max: i64) -> i64 {
        let usable = self.usable();
        if usable <= 0.0 {
            return min;
        }
        let r = self.handle_radius;
        let x = x.clamp(r, self.width - r) - r;
        (x / usable * span(min, max) as f32 + min as f32).round() as i64
    }
}

fn span(min: i64, max: i64) -> i64 {
    match max - min {
        0 => 1,
        s => s,
    }
}

#[derive(Clone, Debug)]
pub struct RangeSlider {
    min: i64,
    max: i64,
    lower: i64,
    upper: i64,
    value: i64,
    active: Option<SliderHandle>,
    changes: SliderChanges,
}

impl Default for RangeSlider {
    fn default() -> Self {
        Self::new(0, 99)
    }
}

impl RangeSlider {
    pub fn new(min: i64, max: i64) -> Self {
        let (min, max) = (min.min(max), max.max(min));
        Self {
            min,
            max,
            lower: min,
            upper: max,
            value: min,
            active: None,
            changes: SliderChanges::default(),
        }
    }

    pub fn minimum(&self) -> i64 {
        self.min
    }

    pub fn maximum(&self) -> i64 {
        self.max
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn active(&self) -> Option<SliderHandle> {
        self.active
    }

    /// Resets the bounds and collapses the selection to the full range.
    pub fn set_range(&mut self, a: i64, b: i64) {
        let (a, b) = (a.min(b), b.max(a));
        self.min = a;
        self.max = b;
        self.lower = a;
        self.upper = b;
        self.value = self.value.clamp(a, b);
    }

    pub fn set_lower(&mut self, v: i64) {
        let v = v.clamp(self.min, self.upper);
        if v != self.lower {
            self.lower = v;
            if self.value < v {
                self.value = v;
                self.changes.value = Some(v);
            }
            self.changes.lower = Some(v);
        }
    }

    pub fn set_upper(&mut self, v: i64) {
        let v = v.clamp(self.lower, self.max);
        if v != self.upper {
            self.upper = v;
            if self.value > v {
                self.value = v;
                self.changes.value = Some(v);
            }
            self.changes.upper = Some(v);
        }
    }

    pub fn set_value(&mut self, v: i64) {
        let v = v.clamp(self.lower, self.upper);
        if v != self.value {
            self.value = v;
            self.changes.value = Some(v);
        }
    }

    /// Moves the playhead without recording a change, for syncing from the
    /// player clock.
    pub fn sync_value(&mut self, v: i64) {
        self.value = v.clamp(self.lower, self.upper);
    }

    pub fn take_changes(&mut self) -> SliderChanges {
        std::mem::take(&mut self.changes)
    }

    /// Handle closest to `x`; ties go to lower, then value, then upper.
    pub fn nearest_handle(&self, geo: &SliderGeometry, x: f32) -> SliderHandle {
        let candidates = [
            (SliderHandle::Lower, self.lower),
            (SliderHandle::Value, self.value),
            (SliderHandle::Upper, self.upper),
        ];
        let mut best = SliderHandle::Lower;
        let mut best_dist = f32::INFINITY;
        for (handle, v) in candidates {
            let dist = (x - geo.value_to_pos(v, self.min, self.max)).abs();
            if dist < best_dist {
                best = handle;
                best_dist = dist;
            }
        }
        best
    }

    pub fn press(&mut self, geo: &SliderGeometry, x: f32) {
        self.active = Some(self.nearest_handle(geo, x));
        self.drag_to(geo, x);
    }

    pub fn drag_to(&mut self, geo: &SliderGeometry, x: f32) {
        let v = geo.pos_to_value(x, self.min, self.max);
        match self.active {
            Some(SliderHandle::Lower) => self.set_lower(v),
            Some(SliderHandle::Upper) => self.set_upper(v),
            Some(SliderHandle::Value) => self.set_value(v),
            None => {}
        }
    }

    pub fn release(&mut self) {
        self.active = None;
    }

    /// Lays out, handles pointer input for and paints the slider.
    pub fn ui(&mut self, ui: &mut Ui) -> Response {
        let size = egui::vec2(ui.available_width(), MIN_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let geo = SliderGeometry::new(rect.width());

        if let Some(ptr) = response.interact_pointer_pos() {
            let x = ptr.x - rect.left();
            if self.active.is_none() {
                self.press(&geo, x);
            } else if response.dragged() {
                self.drag_to(&geo, x);
            }
        }
        if self.active.is_some() && !ui.input(|i| i.pointer.any_down()) {
            self.release();
        }
        if response.hovered() || self.active.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect, &geo);
        }
        response
    }

    fn paint(&self, ui: &Ui, rect: Rect, geo: &SliderGeometry) {
        let painter = ui.painter_at(rect.expand(1.0));
        let cy = rect.center().y;
        let x_of = |v: i64| rect.left() + geo.value_to_pos(v, self.min, self.max);
        let (left, right, mid) = (x_of(self.lower), x_of(self.upper), x_of(self.value));
        let half = BAR_HEIGHT / 2.0;

        let groove = Rect::from_min_max(
            Pos2::new(rect.left() + geo.handle_radius, cy - half),
            Pos2::new(rect.right() - geo.handle_radius, cy + half),
        );
        painter.rect_filled(groove, 3.0, theme::TRACK);

        let selection = Rect::from_min_max(Pos2::new(left, cy - half), Pos2::new(right, cy + half));
        painter.rect_filled(selection, 3.0, theme::RED);

        for x in [left, right] {
            painter.circle_filled(Pos2::new(x, cy), geo.handle_radius, theme::CORAL);
        }
        painter.circle_filled(Pos2::new(mid, cy), geo.handle_radius, handle_color(SliderHandle::Value));
    }
}

fn handle_color(handle: SliderHandle) -> Color32 {
    match handle {
        SliderHandle::Value => theme::GOLD,
        SliderHandle::Lower | SliderHandle::Upper => theme::CORAL,
    }
}
