use thiserror::Error;

/// A tunable that would make the simulation diverge or divide by zero.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("`{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("`{name}` must be greater than {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: f32,
        value: f32,
    },
    #[error("`{name}` must be non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("`{name}` must be at least {min}, got {value}")]
    CountTooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },
}

/// Level-authoring input rejected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("bridge start is after its end (dx = {dx}, dz = {dz})")]
    StartAfterEnd { dx: f32, dz: f32 },
    #[error("bridge {name} must be positive, got {value}")]
    NonPositiveExtent { name: &'static str, value: f32 },
}

pub fn check_finite(name: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::NotFinite { name, value })
    }
}

pub fn check_non_negative(name: &'static str, value: f32) -> Result<(), SettingsError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(SettingsError::Negative { name, value });
    }
    Ok(())
}

pub fn check_greater(name: &'static str, value: f32, min: f32) -> Result<(), SettingsError> {
    check_finite(name, value)?;
    if value <= min {
        return Err(SettingsError::TooSmall { name, min, value });
    }
    Ok(())
}

pub fn check_count(name: &'static str, value: usize, min: usize) -> Result<(), SettingsError> {
    if value < min {
        return Err(SettingsError::CountTooSmall { name, min, value });
    }
    Ok(())
}
