//! Startup choreography: the logo fades in while rocking, holds, then fades
//! out while the main window fades in underneath it.

use eframe::egui::{self, emath::Rot2, Color32, Id, LayerId, Order, Painter, Pos2, Shape, Stroke, Vec2};

use crate::{easing, theme};

pub const FADE_IN_MS: f32 = 1000.0;
pub const HOLD_MS: f32 = 1000.0;
pub const FADE_OUT_MS: f32 = 1000.0;
pub const MAIN_FADE_MS: f32 = 600.0;
pub const ROCK_LEG_MS: f32 = 1200.0;
pub const ROCK_DEGREES: f32 = 6.0;

/// Everything needed to draw one splash frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashFrame {
    /// Logo alpha, 0..=1
    pub logo_opacity: f32,
    /// Logo rotation in degrees
    pub angle: f32,
    /// Alpha of the main window beneath the splash
    pub main_opacity: f32,
    pub done: bool,
}

/// Samples the splash sequence `ms` milliseconds after it started.
pub fn sample(ms: f32) -> SplashFrame {
    let ms = ms.max(0.0);
    let crossfade_at = FADE_IN_MS + HOLD_MS;
    let logo_opacity = if ms < FADE_IN_MS {
        easing::linear(ms / FADE_IN_MS)
    } else if ms < crossfade_at {
        1.0
    } else {
        1.0 - easing::linear((ms - crossfade_at) / FADE_OUT_MS)
    };
    let main_opacity = easing::linear((ms - crossfade_at) / MAIN_FADE_MS);
    SplashFrame {
        logo_opacity,
        angle: rock_angle(ms),
        main_opacity,
        done: ms >= crossfade_at + FADE_OUT_MS,
    }
}

/// Ping-pong between -6 and +6 degrees, one eased leg per 1200 ms.
pub fn rock_angle(ms: f32) -> f32 {
    let leg = (ms / ROCK_LEG_MS).floor() as i64;
    let eased = easing::in_out_quad((ms % ROCK_LEG_MS) / ROCK_LEG_MS);
    let t = if leg % 2 == 0 { eased } else { 1.0 - eased };
    easing::lerp(-ROCK_DEGREES, ROCK_DEGREES, t)
}

/// Running splash, started on the first frame it is drawn
#[derive(Debug, Default)]
pub struct Splash {
    started: Option<f64>,
}

impl Splash {
    /// Paints the overlay and reports whether the sequence has finished.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        let now = ctx.input(|i| i.time);
        let started = *self.started.get_or_insert(now);
        let frame = sample(((now - started) * 1000.0) as f32);
        if frame.done {
            return true;
        }

        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("splash")));
        painter.rect_filled(screen, 0.0, theme::NAVY.gamma_multiply(1.0 - frame.main_opacity));
        paint_logo(&painter, screen.center(), 150.0, frame.angle, frame.logo_opacity);
        ctx.request_repaint();
        false
    }
}

/// Draws the clapperboard logo centred on `center`, rotated by `angle`.
pub fn paint_logo(painter: &Painter, center: Pos2, size: f32, angle: f32, opacity: f32) {
    let rot = Rot2::from_angle(angle.to_radians());
    let place = |x: f32, y: f32| center + rot * (Vec2::new(x, y) * size);
    let quad = |pts: [(f32, f32); 4], color: Color32| {
        let points = pts.iter().map(|&(x, y)| place(x, y)).collect();
        Shape::convex_polygon(points, color.gamma_multiply(opacity), Stroke::NONE)
    };

    // board
    painter.add(quad([(-0.8, -0.3), (0.8, -0.3), (0.8, 0.7), (-0.8, 0.7)], theme::RED));
    // clapper bar, tilted open
    painter.add(quad([(-0.8, -0.42), (0.75, -0.72), (0.78, -0.56), (-0.77, -0.28)], theme::CORAL));
    for i in 0..4 {
        let x0 = -0.6 + i as f32 * 0.38;
        let stripe = [(x0, -0.45), (x0 + 0.14, -0.48), (x0 + 0.05, -0.33), (x0 - 0.09, -0.3)];
        painter.add(quad(stripe, theme::CREAM));
    }
    // play triangle
    let tri: Vec<Pos2> = [(-0.15, 0.0), (0.3, 0.2), (-0.15, 0.4)].iter().map(|&(x, y)| place(x, y)).collect();
    painter.add(Shape::convex_polygon(tri, theme::CREAM.gamma_multiply(opacity), Stroke::NONE));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fades_in_then_holds() {
        assert!(close(sample(0.0).logo_opacity, 0.0));
        assert!(close(sample(500.0).logo_opacity, 0.5));
        assert!(close(sample(1500.0).logo_opacity, 1.0));
        assert!(close(sample(1500.0).main_opacity, 0.0));
    }

    #[test]
    fn crossfades_main_window_in() {
        let f = sample(2300.0);
        assert!(close(f.main_opacity, 0.5));
        assert!(close(f.logo_opacity, 0.7));
        assert!(close(sample(2600.0).main_opacity, 1.0));
        assert!(!sample(2999.0).done);
        assert!(sample(3000.0).done);
    }

    #[test]
    fn rocks_between_limits() {
        assert!(close(rock_angle(0.0), -6.0));
        assert!(close(rock_angle(600.0), 0.0));
        assert!(close(rock_angle(1199.999), 6.0));
        assert!(close(rock_angle(1200.0), 6.0));
        assert!(close(rock_angle(2400.0), -6.0));
        for ms in (0..5000).step_by(37) {
            let a = rock_angle(ms as f32);
            assert!((-6.0..=6.0).contains(&a));
        }
    }
}
