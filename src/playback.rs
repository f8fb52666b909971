/// Playhead clock behind the play/pause toggle.
///
/// Positions are seconds as `f64`; the slider shows them truncated to whole
/// seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playback {
    position: f64,
    playing: bool,
}

impl Playback {
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn seek(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    /// Advances by `dt` while playing and keeps the playhead inside
    /// `[lower, upper]`. Reaching `upper` pauses.
    pub fn tick(&mut self, dt: f64, lower: f64, upper: f64) {
        if self.playing {
            self.position += dt;
        }
        self.clamp(lower, upper);
    }

    /// Steps the playhead by `dt`, staying inside `[lower, upper]`.
    pub fn nudge(&mut self, dt: f64, lower: f64, upper: f64) {
        self.position = (self.position + dt).clamp(lower, upper.max(lower));
    }

    fn clamp(&mut self, lower: f64, upper: f64) {
        if self.position < lower {
            self.position = lower;
        } else if self.position > upper {
            self.position = upper;
            self.playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_while_playing() {
        let mut p = Playback::default();
        p.tick(1.0, 0.0, 10.0);
        assert_eq!(p.position(), 0.0);
        p.play();
        p.tick(1.5, 0.0, 10.0);
        assert_eq!(p.position(), 1.5);
    }

    #[test]
    fn stops_at_selection_end() {
        let mut p = Playback::default();
        p.seek(9.0);
        p.play();
        p.tick(2.0, 0.0, 10.0);
        assert_eq!(p.position(), 10.0);
        assert!(!p.is_playing());
    }

    #[test]
    fn snaps_up_to_selection_start() {
        let mut p = Playback::default();
        p.seek(2.0);
        p.play();
        p.tick(0.1, 5.0, 10.0);
        assert_eq!(p.position(), 5.0);
        assert!(p.is_playing());
    }

    #[test]
    fn nudge_is_bounded() {
        let mut p = Playback::default();
        p.seek(5.0);
        p.nudge(0.1, 0.0, 10.0);
        assert!((p.position() - 5.1).abs() < 1e-9);
        p.nudge(-100.0, 3.0, 10.0);
        assert_eq!(p.position(), 3.0);
        p.nudge(100.0, 3.0, 10.0);
        assert_eq!(p.position(), 10.0);
    }
}
