//! Day/night clock
//!
//! Cyclic time of day with keyframe-interpolated sky, fog and light values.

use serde::{Deserialize, Serialize};

use crate::tuning::{ClockTuning, Keyframe};

/// Interpolated environment for the current time of day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyState {
    /// Fraction of the cycle in [0, 1); 0 is midnight
    pub time_of_day: f32,
    pub sky_color: [f32; 3],
    pub fog_color: [f32; 3],
    pub sun_intensity: f32,
    pub ambient_intensity: f32,
    /// 1 at full sun, 0 at night; nonlinear in sun intensity
    pub day_factor: f32,
    /// Complement of `day_factor`
    pub night_factor: f32,
}

#[derive(Debug, Clone)]
pub struct DayNightClock {
    elapsed: f64,
    cycle_length: f32,
    start_offset: f32,
    day_window: (f32, f32),
    keyframes: Vec<Keyframe>,
    peak_sun: f32,
    current: SkyState,
}

impl DayNightClock {
    pub fn new(tuning: &ClockTuning) -> Self {
        let mut keyframes = if tuning.keyframes.is_empty() {
            ClockTuning::default().keyframes
        } else {
            tuning.keyframes.clone()
        };
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let peak_sun = keyframes.iter().map(|k| k.sun).fold(0.0, f32::max);

        let mut clock = Self {
            elapsed: 0.0,
            cycle_length: tuning.cycle_length.max(f32::EPSILON),
            start_offset: tuning.start_offset,
            day_window: (tuning.day_start, tuning.day_end),
            keyframes,
            peak_sun,
            current: SkyState {
                time_of_day: 0.0,
                sky_color: [0.0; 3],
                fog_color: [0.0; 3],
                sun_intensity: 0.0,
                ambient_intensity: 0.0,
                day_factor: 0.0,
                night_factor: 1.0,
            },
        };
        clock.current = clock.sample(clock.time_of_day());
        clock
    }

    /// Accumulate time and refresh the interpolated sky
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0) as f64;
        self.current = self.sample(self.time_of_day());
    }

    /// Seconds since the world was created
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn cycle_length(&self) -> f32 {
        self.cycle_length
    }

    /// Current fraction of the cycle in [0, 1)
    pub fn time_of_day(&self) -> f32 {
        let cycle = self.cycle_length as f64;
        let t = ((self.elapsed + self.start_offset as f64).rem_euclid(cycle) / cycle) as f32;
        // Rounding can land exactly on 1.0
        if t >= 1.0 { 0.0 } else { t }
    }

    /// Completed cycles since creation
    pub fn day_index(&self) -> u64 {
        ((self.elapsed + self.start_offset as f64) / self.cycle_length as f64).floor() as u64
    }

    pub fn sky(&self) -> &SkyState {
        &self.current
    }

    pub fn day_factor(&self) -> f32 {
        self.current.day_factor
    }

    pub fn night_factor(&self) -> f32 {
        self.current.night_factor
    }

    /// Whether the current time lies inside the day window
    pub fn is_daytime(&self) -> bool {
        let t = self.time_of_day();
        t >= self.day_window.0 && t < self.day_window.1
    }

    /// Interpolated sky at an arbitrary fraction of the cycle
    pub fn sample(&self, t: f32) -> SkyState {
        let (a, b, f) = self.bracket(t);
        let sun = lerp(a.sun, b.sun, f);
        let day_factor = if self.peak_sun > 0.0 {
            smoothstep((sun / self.peak_sun).clamp(0.0, 1.0))
        } else {
            0.0
        };
        SkyState {
            time_of_day: t,
            sky_color: lerp3(a.sky, b.sky, f),
            fog_color: lerp3(a.fog, b.fog, f),
            sun_intensity: sun,
            ambient_intensity: lerp(a.ambient, b.ambient, f),
            day_factor,
            night_factor: 1.0 - day_factor,
        }
    }

    /// Keyframes surrounding `t` and the blend factor between them, wrapping
    /// from the last keyframe back to the first
    fn bracket(&self, t: f32) -> (&Keyframe, &Keyframe, f32) {
        let frames = &self.keyframes;
        let first = &frames[0];
        let last = &frames[frames.len() - 1];
        if frames.len() == 1 {
            return (first, first, 0.0);
        }

        if let Some(i) = frames.windows(2).position(|w| t >= w[0].time && t < w[1].time) {
            let (a, b) = (&frames[i], &frames[i + 1]);
            return (a, b, (t - a.time) / (b.time - a.time));
        }

        // Wrapped span: last -> first + 1
        let span = first.time + 1.0 - last.time;
        let since = if t >= last.time { t - last.time } else { t + 1.0 - last.time };
        let f = if span > 0.0 { since / span } else { 0.0 };
        (last, first, f.clamp(0.0, 1.0))
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

#[inline]
fn smoothstep(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_with(cycle_length: f32, start_offset: f32) -> DayNightClock {
        DayNightClock::new(&ClockTuning {
            cycle_length,
            start_offset,
            ..ClockTuning::default()
        })
    }

    #[test]
    fn test_time_of_day_wraps() {
        let mut clock = clock_with(100.0, 0.0);
        assert_eq!(clock.time_of_day(), 0.0);
        clock.advance(25.0);
        assert!((clock.time_of_day() - 0.25).abs() < 1e-6);
        clock.advance(100.0);
        assert!((clock.time_of_day() - 0.25).abs() < 1e-5);
        assert_eq!(clock.day_index(), 1);
    }

    #[test]
    fn test_keyframes_hit_exactly() {
        let clock = clock_with(100.0, 0.0);
        for k in &ClockTuning::default().keyframes {
            let s = clock.sample(k.time);
            assert!((s.sun_intensity - k.sun).abs() < 1e-5);
            assert!((s.sky_color[0] - k.sky[0]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_interpolation_between_keyframes() {
        let clock = clock_with(100.0, 0.0);
        // Halfway between 0.35 (sun 1.0) and 0.5 (sun 1.2)
        let s = clock.sample(0.425);
        assert!((s.sun_intensity - 1.1).abs() < 1e-4);
    }

    #[test]
    fn test_wraps_from_last_to_first() {
        let tuning = ClockTuning {
            keyframes: vec![
                Keyframe {
                    time: 0.25,
                    sky: [1.0; 3],
                    fog: [1.0; 3],
                    sun: 1.0,
                    ambient: 1.0,
                },
                Keyframe {
                    time: 0.75,
                    sky: [0.0; 3],
                    fog: [0.0; 3],
                    sun: 0.0,
                    ambient: 0.0,
                },
            ],
            ..ClockTuning::default()
        };
        let clock = DayNightClock::new(&tuning);
        // 0.75 -> 1.25 span of 0.5; t = 0.0 is halfway
        let s = clock.sample(0.0);
        assert!((s.sun_intensity - 0.5).abs() < 1e-5);
        let s = clock.sample(0.9);
        assert!((s.sun_intensity - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_day_and_night_factors_complementary() {
        let clock = clock_with(100.0, 0.0);
        let noon = clock.sample(0.5);
        let midnight = clock.sample(0.0);
        assert!((noon.day_factor - 1.0).abs() < 1e-5);
        assert!(midnight.day_factor.abs() < 1e-5);
        for i in 0..100 {
            let s = clock.sample(i as f32 / 100.0);
            assert!((s.day_factor + s.night_factor - 1.0).abs() < 1e-6);
            assert!((0.0..=1.0).contains(&s.day_factor));
        }
    }

    #[test]
    fn test_is_daytime_window() {
        let mut clock = clock_with(100.0, 0.0);
        assert!(!clock.is_daytime());
        clock.advance(50.0);
        assert!(clock.is_daytime());
        clock.advance(30.0);
        assert!(!clock.is_daytime());
    }

    #[test]
    fn test_unsorted_keyframes_are_sorted() {
        let mut tuning = ClockTuning::default();
        tuning.keyframes.reverse();
        let sorted = DayNightClock::new(&ClockTuning::default());
        let reversed = DayNightClock::new(&tuning);
        for i in 0..20 {
            let t = i as f32 / 20.0;
            assert_eq!(sorted.sample(t), reversed.sample(t));
        }
    }
}
