use shared::constants::COMMAND_MAX;
use shared::{Quat, Vec3};

/// Buttons held and view angles for one tick, as sampled by the input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputCommand {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    /// Radians about +Y; 0 looks down -Z.
    pub yaw: f32,
    /// Radians about the camera's +X; positive looks up.
    pub pitch: f32,
}

impl InputCommand {
    /// Movement command vector: x = strafe, y = jump, z = forward, each in `-127..=127`.
    pub fn movement(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| -> f32 {
            (f32::from(u8::from(positive)) - f32::from(u8::from(negative))) * COMMAND_MAX
        };
        Vec3::new(
            axis(self.right, self.left),
            axis(self.jump, false),
            axis(self.forward, self.back),
        )
    }

    /// Camera orientation: yaw about world up, then pitch about the camera's right axis.
    pub fn orientation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), self.yaw)
            * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::view_basis;

    #[test]
    fn buttons_map_to_full_scale_axes() {
        let input = InputCommand {
            forward: true,
            left: true,
            jump: true,
            ..Default::default()
        };
        assert_eq!(input.movement(), Vec3::new(-127.0, 127.0, 127.0));

        let cancelled = InputCommand {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert_eq!(cancelled.movement(), Vec3::zeros());
    }

    #[test]
    fn pitch_tilts_forward_but_not_right() {
        let input = InputCommand {
            pitch: 0.5,
            ..Default::default()
        };
        let (forward, right) = view_basis(&input.orientation());
        assert!(forward.y > 0.0);
        assert!((right - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-5);
    }
}
