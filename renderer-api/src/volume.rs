//! Conversion between the 0..1 player volume and the device's integer range

use renderer_parser::IntRange;

/// The `{minimum, maximum, step}` of the RenderingControl `Volume` variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl Default for VolumeRange {
    /// The range mandated for devices that do not declare one
    fn default() -> Self {
        Self {
            min: 0,
            max: 100,
            step: 1,
        }
    }
}

impl From<IntRange> for VolumeRange {
    fn from(range: IntRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            step: range.step.max(1),
        }
    }
}

impl VolumeRange {
    /// Map `volume` in `[0, 1]` onto the device range, quantised to `step`
    pub fn range_float_to_int(&self, volume: f32) -> i32 {
        let span = self.span();
        if span == 0 {
            return self.min;
        }

        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let raw = f64::from(volume) * f64::from(span);
        let steps = (raw / f64::from(self.step)).round() as i64;
        let value = i64::from(self.min) + steps * i64::from(self.step);
        value.clamp(i64::from(self.min), i64::from(self.max)) as i32
    }

    /// Map a device volume back onto `[0, 1]`
    pub fn range_int_to_float(&self, value: i32) -> f32 {
        let span = self.span();
        if span == 0 {
            return 0.0;
        }
        let value = value.clamp(self.min, self.max);
        ((f64::from(value) - f64::from(self.min)) / f64::from(span)) as f32
    }

    /// Size of one quantisation step on the 0..1 scale
    pub fn step_fraction(&self) -> f32 {
        match self.span() {
            0 => 1.0,
            span => (f64::from(self.step) / f64::from(span)) as f32,
        }
    }

    fn span(&self) -> i32 {
        self.max.saturating_sub(self.min).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(VolumeRange::default(), 0.0, 0)]
    #[case(VolumeRange::default(), 1.0, 100)]
    #[case(VolumeRange::default(), 0.254, 25)]
    #[case(VolumeRange { min: 0, max: 100, step: 5 }, 0.33, 35)]
    #[case(VolumeRange { min: -20, max: 20, step: 1 }, 0.5, 0)]
    #[case(VolumeRange { min: 0, max: 10, step: 3 }, 1.0, 9)]
    #[case(VolumeRange::default(), 1.7, 100)]
    #[case(VolumeRange::default(), -0.5, 0)]
    fn test_float_to_int(#[case] range: VolumeRange, #[case] volume: f32, #[case] expected: i32) {
        assert_eq!(range.range_float_to_int(volume), expected);
    }

    #[test]
    fn test_int_to_float() {
        let range = VolumeRange { min: 0, max: 50, step: 1 };
        assert_eq!(range.range_int_to_float(25), 0.5);
        assert_eq!(range.range_int_to_float(80), 1.0);
    }

    #[test]
    fn test_degenerate_range() {
        let range = VolumeRange { min: 7, max: 7, step: 1 };
        assert_eq!(range.range_float_to_int(0.8), 7);
        assert_eq!(range.range_int_to_float(7), 0.0);
    }

    proptest! {
        #[test]
        fn round_trip_within_one_step(
            volume in 0.0f32..=1.0,
            min in -100i32..100,
            span in 1i32..1000,
            step in 1i32..50,
        ) {
            let range = VolumeRange { min, max: min + span, step };
            let back = range.range_int_to_float(range.range_float_to_int(volume));
            prop_assert!((back - volume).abs() <= range.step_fraction() + 1e-5);
        }
    }
}
