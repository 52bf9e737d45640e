use nortus_shared::projection::Coordinate;

use crate::viewport::Viewport;

/// Animated move of the view toward a target center and resolution.
#[derive(Debug, Clone)]
pub struct ViewTransition {
    pub from: Viewport,
    pub to: Viewport,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl ViewTransition {
    pub fn new(from: Viewport, to: Viewport, start_time: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start_time,
            duration,
        }
    }

    /// The view at `now`, or None once the transition has run its course.
    /// Container size always comes from `current` so resizes mid-flight stick.
    pub fn view_at(&self, now: f64, current: &Viewport) -> Option<Viewport> {
        let elapsed = now - self.start_time;
        if elapsed >= self.duration || self.duration <= 0.0 {
            return None;
        }

        let t = in_and_out(elapsed.max(0.0) / self.duration);
        Some(Viewport {
            center: Coordinate::new(
                lerp(self.from.center.x, self.to.center.x, t),
                lerp(self.from.center.y, self.to.center.y, t),
            ),
            resolution: lerp(self.from.resolution, self.to.resolution, t),
            width: current.width,
            height: current.height,
        })
    }

    /// Final view with the current container size.
    pub fn finish(&self, current: &Viewport) -> Viewport {
        Viewport {
            width: current.width,
            height: current.height,
            ..self.to
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smoothstep ease: slow start, fast middle, slow end.
fn in_and_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(x: f64, res: f64) -> Viewport {
        Viewport {
            center: Coordinate::new(x, 0.0),
            resolution: res,
            width: 800.0,
            height: 400.0,
        }
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(in_and_out(0.0), 0.0);
        assert_eq!(in_and_out(1.0), 1.0);
        assert_eq!(in_and_out(0.5), 0.5);
        assert!(in_and_out(0.25) < 0.25);
        assert!(in_and_out(0.75) > 0.75);
    }

    #[test]
    fn transition_interpolates_then_ends() {
        let tr = ViewTransition::new(vp(0.0, 100.0), vp(1000.0, 10.0), 1000.0, 250.0);
        let current = vp(0.0, 100.0);

        let start = tr.view_at(1000.0, &current).unwrap();
        assert_eq!(start.center.x, 0.0);
        assert_eq!(start.resolution, 100.0);

        let mid = tr.view_at(1125.0, &current).unwrap();
        assert_eq!(mid.center.x, 500.0);
        assert_eq!(mid.resolution, 55.0);

        assert!(tr.view_at(1250.0, &current).is_none());
        assert_eq!(tr.finish(&current).center.x, 1000.0);
    }

    #[test]
    fn size_follows_the_live_viewport() {
        let tr = ViewTransition::new(vp(0.0, 100.0), vp(1000.0, 10.0), 0.0, 250.0);
        let mut current = vp(0.0, 100.0);
        current.resize(1200.0, 600.0);
        let mid = tr.view_at(100.0, &current).unwrap();
        assert_eq!((mid.width, mid.height), (1200.0, 600.0));
        assert_eq!(tr.finish(&current).width, 1200.0);
    }
}
