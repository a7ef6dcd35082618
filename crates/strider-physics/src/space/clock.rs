/// Delta-time source for motion calls.
///
/// Inside a physics step the resolver uses the step length; outside it
/// (e.g. from a variable-rate update) it uses the last frame length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    physics_dt: f32,
    frame_dt: f32,
    in_physics_step: bool,
}

impl FrameClock {
    pub fn new(physics_dt: f32) -> Self {
        Self {
            physics_dt,
            frame_dt: physics_dt,
            in_physics_step: false,
        }
    }

    pub fn begin_physics_step(&mut self, dt: f32) {
        self.physics_dt = dt;
        self.in_physics_step = true;
    }

    pub fn end_physics_step(&mut self) {
        self.in_physics_step = false;
    }

    pub fn set_frame_dt(&mut self, dt: f32) {
        self.frame_dt = dt;
    }

    pub fn is_in_physics_step(&self) -> bool {
        self.in_physics_step
    }

    pub fn physics_dt(&self) -> f32 {
        self.physics_dt
    }

    pub fn frame_dt(&self) -> f32 {
        self.frame_dt
    }

    pub fn delta_time(&self) -> f32 {
        if self.in_physics_step {
            self.physics_dt
        } else {
            self.frame_dt
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_time_switches_with_step() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        clock.set_frame_dt(1.0 / 144.0);
        assert_eq!(clock.delta_time(), 1.0 / 144.0);

        clock.begin_physics_step(1.0 / 30.0);
        assert!(clock.is_in_physics_step());
        assert_eq!(clock.delta_time(), 1.0 / 30.0);

        clock.end_physics_step();
        assert_eq!(clock.delta_time(), 1.0 / 144.0);
    }
}
