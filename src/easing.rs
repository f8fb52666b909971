//! Easing curves over `t` in `[0, 1]`. Inputs outside are clamped.

pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

pub fn in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

pub fn out_bounce(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Interpolates from `a` to `b` by `t`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn curves_hit_endpoints() {
        for f in [linear, in_out_quad, out_bounce] {
            assert!(close(f(0.0), 0.0));
            assert!(close(f(1.0), 1.0));
            assert!(close(f(-3.0), 0.0));
            assert!(close(f(4.0), 1.0));
        }
    }

    #[test]
    fn in_out_quad_is_symmetric() {
        assert!(close(in_out_quad(0.5), 0.5));
        for t in [0.1, 0.25, 0.4] {
            assert!(close(in_out_quad(t), 1.0 - in_out_quad(1.0 - t)));
        }
    }

    #[test]
    fn lerp_between() {
        assert_eq!(lerp(-12.0, 0.0, 0.5), -6.0);
    }
}
