//! Celebration bursts and the post-reveal hint.
//!
//! Bursts are purely decorative: sampling one never touches gate state.
//! Particle sampling is seeded so a burst can be reproduced exactly,
//! which keeps the effects testable.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

/// Default festival palette.
pub const DEFAULT_PALETTE: [&str; 4] = ["#ff1f53", "#4d21ff", "#ffc247", "#ffffff"];

/// How long the "press space" hint stays on screen after reveal.
pub const HINT_VISIBLE_MS: i64 = 10_000;

/// Named burst shapes, from the big inauguration blast down to the
/// ambient burst the decorative key fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationPreset {
    /// Full-width blast fired on the reveal transition.
    Inauguration,
    /// Medium burst for the on-stage short countdown.
    Stage,
    /// Small burst for the decorative key while the site is live.
    Ambient,
}

impl CelebrationPreset {
    pub fn spec(self) -> BurstSpec {
        match self {
            CelebrationPreset::Inauguration => BurstSpec {
                preset: self,
                particle_count: 500,
                spread_deg: 180.0,
                start_velocity: 45.0,
                gravity: 1.0,
                origin_y: 0.6,
            },
            CelebrationPreset::Stage => BurstSpec {
                preset: self,
                particle_count: 300,
                spread_deg: 180.0,
                start_velocity: 45.0,
                gravity: 1.0,
                origin_y: 0.6,
            },
            CelebrationPreset::Ambient => BurstSpec {
                preset: self,
                particle_count: 200,
                spread_deg: 160.0,
                start_velocity: 45.0,
                gravity: 1.0,
                origin_y: 0.6,
            },
        }
    }
}

/// Shape parameters for one burst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSpec {
    pub preset: CelebrationPreset,
    pub particle_count: u32,
    /// Angular spread around straight up, in degrees.
    pub spread_deg: f64,
    pub start_velocity: f64,
    pub gravity: f64,
    /// Vertical launch origin as a fraction of the viewport height.
    pub origin_y: f64,
}

/// One sampled confetti particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Launch angle in degrees; 90 is straight up.
    pub angle_deg: f64,
    pub velocity: f64,
    pub color: String,
}

/// A fully sampled burst, ready to hand to a renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    pub spec: BurstSpec,
    pub particles: Vec<Particle>,
}

impl Burst {
    /// Sample a burst deterministically from `seed`.
    ///
    /// An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn sample(preset: CelebrationPreset, palette: &[String], seed: u64) -> Self {
        let spec = preset.spec();
        let fallback: Vec<String> = DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect();
        let colors: &[String] = if palette.is_empty() { &fallback } else { palette };

        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let half_spread = spec.spread_deg / 2.0;
        let particles = (0..spec.particle_count)
            .map(|_| {
                let angle_deg = 90.0 + rng.gen_range(-half_spread..=half_spread);
                // Velocities taper off toward the edge of the burst.
                let velocity = spec.start_velocity * rng.gen_range(0.4..=1.0);
                let color = colors[rng.gen_range(0..colors.len())].clone();
                Particle {
                    angle_deg,
                    velocity,
                    color,
                }
            })
            .collect();
        Self { spec, particles }
    }
}

/// One-time hint shown after the reveal ("press space for confetti").
///
/// Visibility is a pure function of the time the hint appeared and `now`,
/// so re-renders cannot restart the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    shown_at: DateTime<Utc>,
    visible_ms: i64,
}

impl Hint {
    pub fn new(shown_at: DateTime<Utc>) -> Self {
        Self {
            shown_at,
            visible_ms: HINT_VISIBLE_MS,
        }
    }

    pub fn with_visible_ms(mut self, ms: i64) -> Self {
        self.visible_ms = ms;
        self
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.shown_at).num_milliseconds();
        elapsed >= 0 && elapsed < self.visible_ms
    }

    pub fn text(&self) -> &'static str {
        "Press SPACE for confetti magic!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn palette() -> Vec<String> {
        DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn presets_carry_original_parameters() {
        let inaug = CelebrationPreset::Inauguration.spec();
        assert_eq!(inaug.particle_count, 500);
        assert_eq!(inaug.spread_deg, 180.0);
        assert_eq!(inaug.start_velocity, 45.0);

        let ambient = CelebrationPreset::Ambient.spec();
        assert_eq!(ambient.particle_count, 200);
        assert_eq!(ambient.spread_deg, 160.0);

        assert_eq!(CelebrationPreset::Stage.spec().particle_count, 300);
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let a = Burst::sample(CelebrationPreset::Ambient, &palette(), 42);
        let b = Burst::sample(CelebrationPreset::Ambient, &palette(), 42);
        assert_eq!(a.particles, b.particles);

        let c = Burst::sample(CelebrationPreset::Ambient, &palette(), 43);
        assert_ne!(a.particles, c.particles);
    }

    #[test]
    fn particles_stay_inside_the_spread() {
        let burst = Burst::sample(CelebrationPreset::Inauguration, &palette(), 7);
        assert_eq!(burst.particles.len(), 500);
        for p in &burst.particles {
            assert!((0.0..=180.0).contains(&p.angle_deg), "angle {}", p.angle_deg);
            assert!(p.velocity <= 45.0 && p.velocity > 0.0);
            assert!(DEFAULT_PALETTE.contains(&p.color.as_str()));
        }
    }

    #[test]
    fn empty_palette_falls_back_to_default() {
        let burst = Burst::sample(CelebrationPreset::Ambient, &[], 1);
        assert!(burst
            .particles
            .iter()
            .all(|p| DEFAULT_PALETTE.contains(&p.color.as_str())));
    }

    #[test]
    fn hint_hides_after_window() {
        let shown = Utc::now();
        let hint = Hint::new(shown);
        assert!(hint.is_visible_at(shown));
        assert!(hint.is_visible_at(shown + Duration::seconds(9)));
        assert!(!hint.is_visible_at(shown + Duration::seconds(10)));
        // Clock skew before the hint appeared reads as hidden.
        assert!(!hint.is_visible_at(shown - Duration::seconds(1)));
    }
}
