//! World configuration.
//!
//! Every section derives serde with `#[serde(default)]`, so a document only needs the
//! fields it changes:
//!
//! ```json
//! { "tick": { "max_frame_time": 0.25 }, "movement": { "gravity": 400.0 } }
//! ```

use serde::{Deserialize, Serialize};
use shared::constants::TICK_DT;
use shared::error::{check_count, check_greater};
use shared::{MovementSettings, PhysicsSettings, SettingsError};

/// Longest frame fed into the accumulator; anything longer is a stall and is dropped.
pub const MAX_FRAME_TIME: f32 = 0.1;

/// Ticks a bullet lives before it despawns on its own (two seconds at 60 Hz).
pub const BULLET_LIFETIME_TICKS: u32 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickSettings {
    /// Fixed simulation step (seconds).
    pub dt: f32,
    pub max_frame_time: f32,
    pub bullet_lifetime_ticks: u32,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            dt: TICK_DT,
            max_frame_time: MAX_FRAME_TIME,
            bullet_lifetime_ticks: BULLET_LIFETIME_TICKS,
        }
    }
}

impl TickSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_greater("dt", self.dt, 0.0)?;
        check_greater("max_frame_time", self.max_frame_time, 0.0)?;
        check_count("bullet_lifetime_ticks", self.bullet_lifetime_ticks as usize, 1)?;
        Ok(())
    }
}

/// Player weapon: how often it may fire and what it fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSettings {
    /// Minimum seconds between shots.
    pub fire_interval: f32,
    pub muzzle_speed: f32,
    /// Full extents of the bullet box (x, y, z).
    pub bullet_size: [f32; 3],
}

impl Default for WeaponSettings {
    fn default() -> Self {
        Self {
            fire_interval: 0.1,
            muzzle_speed: 1200.0,
            bullet_size: [2.0, 2.0, 8.0],
        }
    }
}

impl WeaponSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_greater("fire_interval", self.fire_interval, 0.0)?;
        check_greater("muzzle_speed", self.muzzle_speed, 0.0)?;
        for size in self.bullet_size {
            check_greater("bullet_size", size, 0.0)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub tick: TickSettings,
    pub physics: PhysicsSettings,
    pub movement: MovementSettings,
    pub weapon: WeaponSettings,
}

impl WorldSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.tick.validate()?;
        self.physics.validate()?;
        self.movement.validate()?;
        self.weapon.validate()?;
        Ok(())
    }
}
