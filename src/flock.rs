/*
 * Flock Module
 *
 * A flock is a group of boids sharing one parameter set. The flock owns its
 * boids; steering only ever considers members of the same flock.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::boid::Boid;
use crate::error::{Result, SimError};
use crate::params::FlockParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlockId(pub u32);

impl fmt::Display for FlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display colour of a flock. Opaque to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisualTag {
    pub rgb: [u8; 3],
}

impl VisualTag {
    pub const BLUE: VisualTag = VisualTag::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for VisualTag {
    fn default() -> Self {
        VisualTag::BLUE
    }
}

impl FromStr for VisualTag {
    type Err = SimError;

    // Accepts "#rrggbb" or one of a handful of named colours
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let named = match s.to_ascii_lowercase().as_str() {
            "blue" => Some(VisualTag::new(0, 0, 255)),
            "red" => Some(VisualTag::new(255, 0, 0)),
            "green" => Some(VisualTag::new(0, 128, 0)),
            "yellow" => Some(VisualTag::new(255, 255, 0)),
            "orange" => Some(VisualTag::new(255, 165, 0)),
            "purple" => Some(VisualTag::new(128, 0, 128)),
            "white" => Some(VisualTag::new(255, 255, 255)),
            _ => None,
        };
        if let Some(tag) = named {
            return Ok(tag);
        }

        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| SimError::invalid("color", format!("`{s}` is not a #rrggbb colour")))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| SimError::invalid("color", format!("`{s}` is not a #rrggbb colour")))
        };
        Ok(VisualTag::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for VisualTag {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VisualTag> for String {
    fn from(tag: VisualTag) -> Self {
        tag.to_hex()
    }
}

/// Everything `add_group` needs to create a flock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockSpec {
    #[serde(default)]
    pub color: VisualTag,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(flatten)]
    pub params: FlockParams,
}

fn default_count() -> usize {
    30
}

impl Default for FlockSpec {
    fn default() -> Self {
        Self {
            color: VisualTag::BLUE,
            count: default_count(),
            params: FlockParams::default(),
        }
    }
}

impl FlockSpec {
    pub fn validate(&self) -> Result<()> {
        check_count(self.count)?;
        self.params.validate()
    }
}

// Flock sizes must fall inside the count slider range
pub(crate) fn check_count(count: usize) -> Result<()> {
    let range = FlockParams::get_count_range();
    if count == 0 {
        return Err(SimError::invalid("count", "a flock needs at least one boid"));
    }
    if !range.contains(&count) {
        return Err(SimError::invalid(
            "count",
            format!("{count} boids exceeds the limit of {}", range.end()),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Flock {
    pub id: FlockId,
    pub color: VisualTag,
    pub params: FlockParams,
    pub boids: Vec<Boid>,
}

impl Flock {
    pub fn new(id: FlockId, color: VisualTag, params: FlockParams) -> Self {
        Self {
            id,
            color,
            params,
            boids: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}
