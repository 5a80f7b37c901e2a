//! Steering rules.
//!
//! Each rule is a pure function of the steering flyer and its neighbors and
//! returns the acceleration to apply, already clamped per axis to
//! `[-MAX_ACCELERATION, MAX_ACCELERATION]`. `None` means "no correction".
//! [`Flyer::steer`] adds the result to the velocity and applies the velocity cap,
//! so calling rules in sequence and steering after each one reproduces the
//! clamp-after-every-rule behavior of the tick loops.

use swarm_common::{clamp, SwarmError, Vec3};

use crate::flyer::{Flyer, COLLISION_RADIUS, MAX_ACCELERATION};

/// A bounded acceleration produced by one rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub acceleration: Vec3,
    /// Planar steering only touches x and y.
    pub planar: bool,
}

impl Steering {
    /// x/y acceleration; z is dropped and the flyer's `dz` is left untouched.
    pub fn planar(acceleration: Vec3) -> Self {
        Steering { acceleration: acceleration.to_planar(), planar: true }
    }

    pub fn spatial(acceleration: Vec3) -> Self {
        Steering { acceleration, planar: false }
    }
}

/// Nudges `flyer` toward or away from `other` to hold `target_distance` in the
/// x/y plane. The response is cubic in the distance error and saturates at
/// `MAX_ACCELERATION`. Coincident planar positions give no correction.
pub fn maintain_distance_from(
    flyer: &Flyer,
    other: &Flyer,
    target_distance: f32,
    detect_collision: bool,
) -> Result<Option<Steering>, SwarmError> {
    let distance = flyer.distance_to(other);
    if detect_collision && distance < COLLISION_RADIUS {
        return Err(SwarmError::Collision { distance, radius: COLLISION_RADIUS });
    }

    let magnitude = clamp((distance - target_distance).powi(3), -MAX_ACCELERATION, MAX_ACCELERATION);

    let direction = other.position.difference(&flyer.position).to_planar();
    if direction.is_zero() {
        return Ok(None);
    }
    let direction = direction.normalize()?;
    Ok(Some(Steering::planar(direction.scale(magnitude))))
}

/// Aligns with `other` by accelerating along the sum of both planar velocities.
pub fn move_with(flyer: &Flyer, other: &Flyer) -> Steering {
    let blended = flyer.velocity.to_planar() + other.velocity.to_planar();
    Steering::planar(blended.clamp_components(MAX_ACCELERATION))
}

/// Planar separation: accelerates along the summed vectors pointing from each
/// of `others` to `flyer`.
pub fn move_away_from(flyer: &Flyer, others: &[&Flyer]) -> Option<Steering> {
    if others.is_empty() {
        return None;
    }
    let reaction = others
        .iter()
        .map(|other| flyer.position.difference(&other.position).to_planar())
        .fold(Vec3::zero(), |acc, v| acc + v);
    Some(Steering::planar(reaction.clamp_components(MAX_ACCELERATION)))
}

/// Cohesion: accelerates toward the centroid of `others` in full 3D with
/// magnitude `scale_acceleration * MAX_ACCELERATION`.
///
/// An empty `others` has no centroid and fails with
/// [`SwarmError::DegenerateGeometry`]. A centroid at the flyer's own position
/// gives no correction.
pub fn approach(
    flyer: &Flyer,
    others: &[&Flyer],
    scale_acceleration: f32,
) -> Result<Option<Steering>, SwarmError> {
    let center = Vec3::centroid(others.iter().map(|other| other.position.to_vector()))
        .ok_or(SwarmError::DegenerateGeometry("approach needs at least one target"))?;

    let reaction = center - flyer.position.to_vector();
    if reaction.is_zero() {
        return Ok(None);
    }
    let acceleration = reaction
        .normalize()?
        .scale(scale_acceleration * MAX_ACCELERATION)
        .clamp_components(MAX_ACCELERATION);
    Ok(Some(Steering::spatial(acceleration)))
}

/// Planar repulsion from the centroid of `others`, clamped without normalizing.
pub fn escape(flyer: &Flyer, others: &[&Flyer]) -> Option<Steering> {
    let center = Vec3::centroid(others.iter().map(|other| other.position.to_vector().to_planar()))?;
    let reaction = flyer.position.to_vector().to_planar() - center;
    Some(Steering::planar(reaction.clamp_components(MAX_ACCELERATION)))
}

/// Full-3D separation: accelerates along the normalized sum of the vectors
/// from each of `others` to `flyer`, with magnitude
/// `scale_acceleration * MAX_ACCELERATION`.
pub fn separate(flyer: &Flyer, others: &[&Flyer], scale_acceleration: f32) -> Option<Steering> {
    let reaction = others
        .iter()
        .map(|other| flyer.position.difference(&other.position))
        .fold(Vec3::zero(), |acc, v| acc + v);
    // Also covers an empty neighbor list.
    if reaction.is_zero() {
        return None;
    }
    let direction = reaction.normalize().ok()?;
    Some(Steering::spatial(
        direction
            .scale(scale_acceleration * MAX_ACCELERATION)
            .clamp_components(MAX_ACCELERATION),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyer::{Position, Velocity, MAX_VELOCITY};
    use approx::assert_abs_diff_eq;
    use rand::prelude::*;

    fn at(x: f32, y: f32, z: f32) -> Flyer {
        Flyer::stationary(Position::new(x, y, z))
    }

    fn moving(x: f32, y: f32, z: f32, v: Velocity) -> Flyer {
        Flyer::new(None, Position::new(x, y, z), v)
    }

    fn assert_bounded(a: Vec3, bound: f32) {
        assert!(a.x.abs() <= bound && a.y.abs() <= bound && a.z.abs() <= bound, "{:?}", a);
    }

    #[test]
    fn maintain_distance_pulls_toward_far_target() {
        let me = at(0.0, 0.0, 0.0);
        let other = at(30.0, 0.0, 5.0);
        let s = maintain_distance_from(&me, &other, 10.0, false).unwrap().unwrap();
        assert!(s.planar);
        assert_abs_diff_eq!(s.acceleration.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(s.acceleration.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn maintain_distance_pushes_away_when_too_close() {
        let me = at(0.0, 0.0, 0.0);
        let other = at(0.0, 5.0, 0.0);
        let s = maintain_distance_from(&me, &other, 20.0, false).unwrap().unwrap();
        assert_abs_diff_eq!(s.acceleration.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn maintain_distance_response_is_cubic_near_target() {
        let me = at(0.0, 0.0, 0.0);
        let other = at(10.5, 0.0, 0.0);
        let s = maintain_distance_from(&me, &other, 10.0, false).unwrap().unwrap();
        assert_abs_diff_eq!(s.acceleration.x, 0.125, epsilon = 1e-5);
    }

    #[test]
    fn maintain_distance_coincident_planar_is_noop() {
        let me = at(3.0, 3.0, 0.0);
        let above = at(3.0, 3.0, 40.0);
        assert_eq!(maintain_distance_from(&me, &above, 10.0, false).unwrap(), None);
    }

    #[test]
    fn maintain_distance_detects_collision() {
        let me = at(0.0, 0.0, 0.0);
        let other = at(0.5, 0.0, 0.0);
        let err = maintain_distance_from(&me, &other, 10.0, true).unwrap_err();
        assert!(matches!(err, SwarmError::Collision { .. }));
        // Without detection the rule just pushes apart.
        assert!(maintain_distance_from(&me, &other, 10.0, false).unwrap().is_some());
    }

    #[test]
    fn move_with_sums_planar_velocities() {
        let me = moving(0.0, 0.0, 0.0, Velocity::new(0.5, -0.25, 1.0));
        let other = moving(5.0, 0.0, 0.0, Velocity::new(1.0, -0.5, 1.0));
        let s = move_with(&me, &other);
        assert_eq!(s.acceleration, Vec3::planar(1.0, -0.75));
        assert!(s.planar);
    }

    #[test]
    fn empty_neighbor_lists_are_noops() {
        let me = at(1.0, 2.0, 3.0);
        assert_eq!(separate(&me, &[], 1.0), None);
        assert_eq!(move_away_from(&me, &[]), None);
        assert_eq!(escape(&me, &[]), None);
    }

    #[test]
    fn approach_empty_set_is_degenerate() {
        let me = at(1.0, 2.0, 3.0);
        assert!(matches!(approach(&me, &[], 1.0), Err(SwarmError::DegenerateGeometry(_))));
    }

    #[test]
    fn approach_onto_own_position_is_noop() {
        let me = at(1.0, 2.0, 3.0);
        let twin = at(1.0, 2.0, 3.0);
        assert_eq!(approach(&me, &[&twin], 1.0).unwrap(), None);
    }

    #[test]
    fn approach_heads_for_centroid() {
        let me = at(0.0, 0.0, 0.0);
        let a = at(0.0, 0.0, 10.0);
        let b = at(0.0, 0.0, 20.0);
        let s = approach(&me, &[&a, &b], 0.1).unwrap().unwrap();
        assert!(!s.planar);
        assert_abs_diff_eq!(s.acceleration.z, 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(s.acceleration.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn separate_points_away_from_neighbors() {
        let me = at(0.0, 0.0, 0.0);
        let a = at(1.0, 0.0, 0.0);
        let b = at(0.0, 1.0, 0.0);
        let s = separate(&me, &[&a, &b], 1.0).unwrap();
        let expected = -std::f32::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(s.acceleration.x, expected, epsilon = 1e-6);
        assert_abs_diff_eq!(s.acceleration.y, expected, epsilon = 1e-6);
    }

    #[test]
    fn separate_with_balanced_neighbors_is_noop() {
        let me = at(0.0, 0.0, 0.0);
        let a = at(1.0, 0.0, 0.0);
        let b = at(-1.0, 0.0, 0.0);
        assert_eq!(separate(&me, &[&a, &b], 1.0), None);
    }

    #[test]
    fn move_away_and_escape_clamp_without_normalizing() {
        let me = at(0.0, 0.0, 0.0);
        let a = at(-0.25, 5.0, 9.0);
        let s = move_away_from(&me, &[&a]).unwrap();
        assert_eq!(s.acceleration, Vec3::planar(0.25, -1.0));

        let b = at(-0.25, -5.0, 0.0);
        let e = escape(&me, &[&a, &b]).unwrap();
        assert_eq!(e.acceleration, Vec3::planar(0.25, 0.0));
    }

    #[test]
    fn randomized_rules_respect_caps() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let random_flyer = |rng: &mut StdRng| {
                let v = Velocity::new(
                    rng.random_range(-1.0..=1.0),
                    rng.random_range(-1.0..=1.0),
                    rng.random_range(-1.0..=1.0),
                );
                moving(
                    rng.random_range(-50.0..=50.0),
                    rng.random_range(-50.0..=50.0),
                    rng.random_range(-50.0..=50.0),
                    v,
                )
            };
            let mut me = random_flyer(&mut rng);
            let others: Vec<Flyer> = (0..4).map(|_| random_flyer(&mut rng)).collect();
            let refs: Vec<&Flyer> = others.iter().collect();

            let steerings = [
                maintain_distance_from(&me, refs[0], 20.0, false).unwrap(),
                Some(move_with(&me, refs[1])),
                move_away_from(&me, &refs),
                approach(&me, &refs, 1.0).unwrap(),
                escape(&me, &refs),
                separate(&me, &refs, 1.0),
            ];
            for steering in steerings.into_iter().flatten() {
                assert_bounded(steering.acceleration, MAX_ACCELERATION);
                me.steer(steering);
                assert_bounded(me.velocity.to_vector(), MAX_VELOCITY);
            }
        }
    }
}
