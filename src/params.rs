/*
 * Flock Parameters Module
 *
 * This module defines the per-flock motion parameters (speed and force limits,
 * perception radii, boid size) together with validation and the slider ranges
 * the control surface offers. Parameters are mutable live between ticks through
 * `World::set_group_params`.
 */

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Largest flock a single group may hold.
pub const MAX_FLOCK_SIZE: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    // Visual radius of a boid; also widens obstacle buffers and spawn margins
    pub size: f32,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_force: 0.05,
            separation_radius: 25.0,
            alignment_radius: 50.0,
            cohesion_radius: 50.0,
            size: 3.0,
        }
    }
}

/// A single live-editable field of `FlockParams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlockParam {
    MaxSpeed,
    MaxForce,
    SeparationRadius,
    AlignmentRadius,
    CohesionRadius,
    Size,
}

impl FlockParam {
    pub const ALL: [FlockParam; 6] = [
        FlockParam::MaxSpeed,
        FlockParam::MaxForce,
        FlockParam::SeparationRadius,
        FlockParam::AlignmentRadius,
        FlockParam::CohesionRadius,
        FlockParam::Size,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FlockParam::MaxSpeed => "max_speed",
            FlockParam::MaxForce => "max_force",
            FlockParam::SeparationRadius => "separation_radius",
            FlockParam::AlignmentRadius => "alignment_radius",
            FlockParam::CohesionRadius => "cohesion_radius",
            FlockParam::Size => "size",
        }
    }

    // Live updates require every field, radii included, to be strictly positive
    pub fn check(self, value: f32) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SimError::invalid(self.name(), format!("must be a positive number, got {value}")));
        }
        Ok(())
    }

    pub fn is_radius(self) -> bool {
        matches!(
            self,
            FlockParam::SeparationRadius | FlockParam::AlignmentRadius | FlockParam::CohesionRadius
        )
    }
}

impl fmt::Display for FlockParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlockParam {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        FlockParam::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| SimError::invalid(s, "unknown flock parameter"))
    }
}

impl FlockParams {
    pub fn get(&self, field: FlockParam) -> f32 {
        match field {
            FlockParam::MaxSpeed => self.max_speed,
            FlockParam::MaxForce => self.max_force,
            FlockParam::SeparationRadius => self.separation_radius,
            FlockParam::AlignmentRadius => self.alignment_radius,
            FlockParam::CohesionRadius => self.cohesion_radius,
            FlockParam::Size => self.size,
        }
    }

    pub fn set(&mut self, field: FlockParam, value: f32) -> Result<()> {
        field.check(value)?;

        let slot = match field {
            FlockParam::MaxSpeed => &mut self.max_speed,
            FlockParam::MaxForce => &mut self.max_force,
            FlockParam::SeparationRadius => &mut self.separation_radius,
            FlockParam::AlignmentRadius => &mut self.alignment_radius,
            FlockParam::CohesionRadius => &mut self.cohesion_radius,
            FlockParam::Size => &mut self.size,
        };
        *slot = value;
        Ok(())
    }

    /// Validation applied when a flock is created. Radii may be zero, which
    /// disables the corresponding behavior.
    pub fn validate(&self) -> Result<()> {
        for field in FlockParam::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(SimError::invalid(field.name(), "must be finite"));
            }
            if field.is_radius() {
                if value < 0.0 {
                    return Err(SimError::invalid(field.name(), format!("must not be negative, got {value}")));
                }
            } else if value <= 0.0 {
                return Err(SimError::invalid(field.name(), format!("must be positive, got {value}")));
            }
        }
        Ok(())
    }

    // Get parameter ranges for UI sliders
    pub fn get_max_speed_range() -> RangeInclusive<f32> {
        0.5..=20.0
    }

    pub fn get_max_force_range() -> RangeInclusive<f32> {
        0.005..=1.0
    }

    pub fn get_separation_radius_range() -> RangeInclusive<f32> {
        5.0..=50.0
    }

    pub fn get_radius_range() -> RangeInclusive<f32> {
        10.0..=100.0
    }

    pub fn get_size_range() -> RangeInclusive<f32> {
        1.0..=9.0
    }

    // Also the hard limit on boids per flock
    pub fn get_count_range() -> RangeInclusive<usize> {
        1..=MAX_FLOCK_SIZE
    }
}

/// Parse numeric text coming from a control surface.
pub fn parse_value(field: &str, text: &str) -> Result<f32> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| SimError::invalid(field, format!("`{text}` is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_non_positive_values() {
        let mut params = FlockParams::default();

        assert!(params.set(FlockParam::MaxSpeed, 0.0).is_err());
        assert!(params.set(FlockParam::CohesionRadius, -5.0).is_err());
        assert!(params.set(FlockParam::Size, f32::NAN).is_err());
        assert_eq!(params, FlockParams::default());

        params.set(FlockParam::AlignmentRadius, 70.0).unwrap();
        assert_eq!(params.alignment_radius, 70.0);
    }

    #[test]
    fn validate_allows_zero_radius_but_not_zero_speed() {
        let mut params = FlockParams {
            alignment_radius: 0.0,
            cohesion_radius: 0.0,
            ..FlockParams::default()
        };
        assert!(params.validate().is_ok());

        params.max_force = 0.0;
        assert!(matches!(params.validate(), Err(SimError::InvalidParameter { name, .. }) if name == "max_force"));
    }

    #[test]
    fn slider_ranges_hold_the_defaults_and_only_valid_values() {
        let defaults = FlockParams::default();
        let ranges = [
            (FlockParam::MaxSpeed, FlockParams::get_max_speed_range()),
            (FlockParam::MaxForce, FlockParams::get_max_force_range()),
            (FlockParam::Size, FlockParams::get_size_range()),
            (FlockParam::SeparationRadius, FlockParams::get_separation_radius_range()),
            (FlockParam::AlignmentRadius, FlockParams::get_radius_range()),
        ];
        for (field, range) in ranges {
            assert!(range.contains(&defaults.get(field)), "{field}");
            assert!(field.check(*range.start()).is_ok(), "{field}");
        }

        let counts = FlockParams::get_count_range();
        assert_eq!(*counts.start(), 1);
        assert_eq!(*counts.end(), MAX_FLOCK_SIZE);
    }

    #[test]
    fn field_names_parse_loosely() {
        assert_eq!("max_speed".parse::<FlockParam>().unwrap(), FlockParam::MaxSpeed);
        assert_eq!("Separation Radius".parse::<FlockParam>().unwrap(), FlockParam::SeparationRadius);
        assert_eq!("cohesion-radius".parse::<FlockParam>().unwrap(), FlockParam::CohesionRadius);
        assert!("colour".parse::<FlockParam>().is_err());
    }

    #[test]
    fn malformed_numbers_are_invalid_parameters() {
        assert_eq!(parse_value("size", " 4.5 ").unwrap(), 4.5);
        assert!(matches!(parse_value("size", "four"), Err(SimError::InvalidParameter { .. })));
    }
}
