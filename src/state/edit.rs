//! Tone filter settings
//!
//! The three adjustments applied to the base image to produce the preview.
//! Values are integer offsets from 100%, so `0` means "no adjustment".

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One of the three tone controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Brightness,
    Contrast,
    Saturation,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Brightness, Filter::Contrast, Filter::Saturation];

    /// Allowed values for this control (step 1)
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Filter::Brightness => -40..=40,
            Filter::Contrast => -30..=30,
            Filter::Saturation => -30..=30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::Brightness => "Brightness",
            Filter::Contrast => "Contrast",
            Filter::Saturation => "Saturation",
        }
    }
}

/// All filter values for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Brightness offset (-40 to +40)
    /// - Negative values darken the image
    /// - Positive values brighten the image
    pub brightness: i32,

    /// Contrast offset (-30 to +30), pivoting on mid gray
    pub contrast: i32,

    /// Saturation offset (-30 to +30)
    /// - Negative values move toward grayscale
    pub saturation: i32,
}

impl FilterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filter: Filter) -> i32 {
        match filter {
            Filter::Brightness => self.brightness,
            Filter::Contrast => self.contrast,
            Filter::Saturation => self.saturation,
        }
    }

    /// Set a control, clamping into its range.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, filter: Filter, value: i32) -> bool {
        let range = filter.range();
        let value = value.clamp(*range.start(), *range.end());
        let slot = match filter {
            Filter::Brightness => &mut self.brightness,
            Filter::Contrast => &mut self.contrast,
            Filter::Saturation => &mut self.saturation,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Percentage multipliers centered at 100%: (brightness, contrast, saturation)
    pub fn percentages(&self) -> (i32, i32, i32) {
        (
            100 + self.brightness,
            100 + self.contrast,
            100 + self.saturation,
        )
    }

    /// Check if this represents an unfiltered image (all values at default)
    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }

    /// Reset all adjustments to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
