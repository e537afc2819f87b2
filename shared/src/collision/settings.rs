/*!
Collision resolution and slide-move tolerances.

Keeping these together makes tuning easier. Per-world overrides come in through serde:
any field missing from the document keeps its default.
*/

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUMP_COUNT, GROUND_PROBE_DISTANCE, MAX_CLIP_PLANES, MIN_DYNAMIC_SEPARATION, OVERCLIP,
};
use crate::error::{SettingsError, check_count, check_greater};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Push-out and velocity-clip multiplier. Must exceed 1.
    pub overclip: f32,
    /// Floor on the per-side push when two DYNAMIC bodies overlap.
    pub min_dynamic_separation: f32,
    /// Distance traced downward to decide whether a body is ground-supported.
    pub ground_probe_distance: f32,
    /// Slide-move iterations per tick.
    pub bump_count: u32,
    /// Clip planes a slide move may accumulate before stopping dead.
    pub max_clip_planes: usize,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            overclip: OVERCLIP,
            min_dynamic_separation: MIN_DYNAMIC_SEPARATION,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            bump_count: DEFAULT_BUMP_COUNT,
            max_clip_planes: MAX_CLIP_PLANES,
        }
    }
}

impl PhysicsSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_greater("overclip", self.overclip, 1.0)?;
        check_greater("min_dynamic_separation", self.min_dynamic_separation, 0.0)?;
        check_greater("ground_probe_distance", self.ground_probe_distance, 0.0)?;
        check_count("bump_count", self.bump_count as usize, 1)?;
        // Ground plane plus original velocity are seeded before the first hit.
        check_count("max_clip_planes", self.max_clip_planes, 3)?;
        Ok(())
    }
}
