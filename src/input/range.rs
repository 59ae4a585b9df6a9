//! Activation range learning and intensity normalization

use super::types::{ActivationRange, InputConfiguration, MAXIMUM_INTENSITY, MINIMUM_INTENSITY};

/// Linearly map `value` from `[min, max]` onto `[target_min, target_max]`
///
/// `min` and `max` are used as given, so a flipped domain (`min > max`) maps
/// its first bound onto `target_min`. A zero-width domain yields
/// [`MAXIMUM_INTENSITY`].
pub fn map_value(value: f32, min: f32, max: f32, target_min: f32, target_max: f32) -> f32 {
    if min == max {
        return MAXIMUM_INTENSITY;
    }
    ((value - min) / (max - min)) * (target_max - target_min) + target_min
}

/// Normalize a raw value inside `range` into an intensity
///
/// # Returns
/// Value between [`MINIMUM_INTENSITY`] and [`MAXIMUM_INTENSITY`] for values
/// inside the range, [`MAXIMUM_INTENSITY`] for degenerate ranges
pub fn intensity(value: f32, range: &ActivationRange) -> f32 {
    map_value(value, range.start, range.end, MINIMUM_INTENSITY, MAXIMUM_INTENSITY)
}

/// Grow an existing configuration's range with a new learning observation
///
/// Axes resting at a midpoint are often calibrated by travelling in one
/// direction only. When the second observation moves further negative than a
/// negative single-point range, the range is flipped: `start` keeps the less
/// negative bound and `end` follows the travel. Once flipped it stays flipped.
pub fn refine_range(config: &mut InputConfiguration, value: f32) {
    let range = &mut config.activation_range;

    if config.range_is_flipped {
        range.start = range.start.max(value);
        range.end = range.end.min(value);
    } else if value < 0.0 && range.start < 0.0 && range.start == range.end && value < range.start {
        range.start = range.start.max(value);
        range.end = range.end.min(value);
        config.range_is_flipped = true;
    } else {
        range.start = range.start.min(value);
        range.end = range.end.max(value);
        config.range_is_flipped = false;
    }
}
