//! Pure alignment model: how well is the craft aimed at the target?
//!
//! Everything here is stateless math over a craft pose and a target position.
//! The model is evaluated **twice** per tick: once before the tick's rotation
//! input is applied (to decide the sticky-rotation multiplier) and once after
//! movement (to drive audio cues and capture eligibility).  Both evaluations
//! call the same [`assess`] function; only the pose differs.

use crate::config::GameConfig;
use bevy::prelude::*;

/// Convert a craft heading angle into its world-space forward unit vector.
///
/// The +π/2 offset reconciles the physics heading with the visual "nose"
/// direction.  This function is the *only* place the offset lives; kinematics,
/// alignment, audio, and rendering must all route through it so the physics
/// and presentation notions of "forward" can never diverge.
#[inline]
pub fn forward_from_heading(heading: f32) -> Vec2 {
    let visual = heading + std::f32::consts::FRAC_PI_2;
    Vec2::new(visual.cos(), visual.sin())
}

/// Distance-adaptive alignment threshold.
///
/// Piecewise-linear: the forgiving `align_dot_near` at or inside
/// `align_near_dist`, the strict `align_dot_far` at or beyond
/// `align_far_dist`, and a linear blend in between.  Precise aiming is harder
/// to *maintain* at short range relative to angular sensitivity, so the bar
/// relaxes as the player closes in.
pub fn dynamic_threshold(distance: f32, config: &GameConfig) -> f32 {
    if distance <= config.align_near_dist {
        return config.align_dot_near;
    }
    if distance >= config.align_far_dist {
        return config.align_dot_far;
    }

    let t = (distance - config.align_near_dist) / (config.align_far_dist - config.align_near_dist);
    config.align_dot_near + (config.align_dot_far - config.align_dot_near) * t
}

/// One evaluation of the alignment model. Derived fresh each tick; never
/// persisted across ticks.
#[derive(Debug, Clone, Copy)]
pub struct Alignment {
    /// Unit vector from craft to target; zero when the craft sits exactly on
    /// the target.
    pub to_target: Vec2,
    /// Craft-to-target distance in world units.
    pub distance: f32,
    /// Cosine of the angular offset between craft forward and `to_target`;
    /// 1.0 = perfectly aimed.
    pub dot: f32,
    /// Threshold the dot product must exceed at this distance.
    pub threshold: f32,
    /// `dot > threshold`.
    pub aligned: bool,
}

/// Evaluate the alignment model for the given craft pose and target position.
pub fn assess(craft_pos: Vec2, forward: Vec2, target_pos: Vec2, config: &GameConfig) -> Alignment {
    let delta = target_pos - craft_pos;
    let distance = delta.length();
    // Craft exactly on the target is an expected transient, not an error.
    let to_target = if distance > 0.0 {
        delta / distance
    } else {
        Vec2::ZERO
    };

    let dot = forward.dot(to_target);
    let threshold = dynamic_threshold(distance, config);

    Alignment {
        to_target,
        distance,
        dot,
        threshold,
        aligned: dot > threshold,
    }
}

/// Post-movement alignment result for the current tick, or `None` while no
/// target is present.  Written by [`alignment_system`], read by the audio
/// director, the capture state machine, and the debug overlay.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct AlignmentSample(pub Option<Alignment>);

/// Refresh [`AlignmentSample`] from the post-movement craft pose.
///
/// Runs after craft integration and before the audio director each tick.
pub fn alignment_system(
    mut sample: ResMut<AlignmentSample>,
    config: Res<GameConfig>,
    q_craft: Query<&crate::craft::Craft>,
    q_beacon: Query<&crate::target::Beacon>,
) {
    let Ok(craft) = q_craft.single() else {
        sample.0 = None;
        return;
    };
    sample.0 = q_beacon
        .single()
        .ok()
        .map(|beacon| assess(craft.position, craft.forward(), beacon.position, &config));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn forward_is_always_a_unit_vector() {
        for i in 0..64 {
            let heading = (i as f32) * TAU / 64.0 - PI;
            let fwd = forward_from_heading(heading);
            assert!(
                (fwd.length() - 1.0).abs() < 1e-6,
                "forward({heading}) has length {}",
                fwd.length()
            );
        }
    }

    #[test]
    fn forward_is_periodic_in_two_pi() {
        for heading in [-PI, -1.0, 0.0, 0.7, 2.0] {
            let a = forward_from_heading(heading);
            let b = forward_from_heading(heading + TAU);
            assert!((a - b).length() < 1e-5, "forward not 2π-periodic at {heading}");
        }
    }

    #[test]
    fn threshold_hits_endpoints_exactly() {
        let config = GameConfig::default();
        assert_eq!(dynamic_threshold(config.align_near_dist, &config), config.align_dot_near);
        assert_eq!(dynamic_threshold(config.align_far_dist, &config), config.align_dot_far);
        // Beyond the cutoffs the endpoint values hold.
        assert_eq!(dynamic_threshold(0.0, &config), config.align_dot_near);
        assert_eq!(dynamic_threshold(10_000.0, &config), config.align_dot_far);
    }

    #[test]
    fn threshold_is_linear_between_cutoffs() {
        let config = GameConfig::default();
        let mid = (config.align_near_dist + config.align_far_dist) / 2.0;
        let expected = (config.align_dot_near + config.align_dot_far) / 2.0;
        assert!((dynamic_threshold(mid, &config) - expected).abs() < 1e-6);
    }

    #[test]
    fn threshold_is_monotonic_in_distance() {
        let config = GameConfig::default();
        let mut prev = dynamic_threshold(0.0, &config);
        for d in (0..=700).step_by(10) {
            let t = dynamic_threshold(d as f32, &config);
            assert!(t >= prev - 1e-7, "threshold decreased at distance {d}");
            prev = t;
        }
    }

    #[test]
    fn alignment_is_scale_invariant_in_target_distance() {
        // Same direction, different distances inside the near band: the
        // normalized direction (and thus the dot) must not change.
        let config = GameConfig::default();
        let craft = Vec2::new(100.0, 100.0);
        let fwd = Vec2::new(0.0, 1.0);
        let dir = Vec2::new(0.05, 1.0).normalize();

        let near = assess(craft, fwd, craft + dir * 50.0, &config);
        let nearer = assess(craft, fwd, craft + dir * 100.0, &config);
        assert!((near.dot - nearer.dot).abs() < 1e-5);
    }

    #[test]
    fn zero_distance_yields_zero_direction_and_no_alignment() {
        let config = GameConfig::default();
        let pos = Vec2::new(42.0, 17.0);
        let result = assess(pos, Vec2::Y, pos, &config);

        assert_eq!(result.to_target, Vec2::ZERO);
        assert_eq!(result.distance, 0.0);
        assert_eq!(result.dot, 0.0);
        assert!(!result.aligned, "dot 0.0 can never clear the threshold");
    }

    #[test]
    fn dead_on_aim_is_aligned_at_any_range() {
        let config = GameConfig::default();
        let craft = Vec2::ZERO;
        let heading = 0.0;
        let fwd = forward_from_heading(heading);

        for dist in [50.0, 300.0, 900.0] {
            let result = assess(craft, fwd, fwd * dist, &config);
            assert!(result.aligned, "dead-on aim not aligned at distance {dist}");
            assert!((result.dot - 1.0).abs() < 1e-5);
        }
    }
}
