//! Crosshair target acquisition
//!
//! A single ray from the viewpoint center is tested against the button cube
//! and every live enemy cube. The nearest entry point wins; exact ties go to
//! the button, then to the lowest enemy id.

use glam::Vec3;

use super::field::EnemyField;
use crate::consts::{BUTTON_CENTER, BUTTON_HALF_EXTENT};

/// What the crosshair is on this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetHit {
    #[default]
    None,
    Button,
    Enemy(u32),
}

impl TargetHit {
    pub fn is_some(&self) -> bool {
        !matches!(self, TargetHit::None)
    }
}

/// A ray with normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }
}

/// Distance along `ray` to an axis-aligned cube, if it is hit in front of the origin
pub fn ray_cube_distance(ray: &Ray, center: Vec3, half_extent: f32) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.dir[axis];
        let lo = center[axis] - half_extent;
        let hi = center[axis] + half_extent;

        if d.abs() < 1e-8 {
            // Parallel to this slab: must already be inside it
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// The menu/start button cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonTarget {
    pub center: Vec3,
    pub half_extent: f32,
    /// Disabled buttons can't be hovered or clicked
    pub enabled: bool,
}

impl Default for ButtonTarget {
    fn default() -> Self {
        Self {
            center: BUTTON_CENTER,
            half_extent: BUTTON_HALF_EXTENT,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetResolver {
    /// Half edge of an enemy cube
    pub enemy_half_extent: f32,
}

impl TargetResolver {
    pub fn new(enemy_half_extent: f32) -> Self {
        Self { enemy_half_extent }
    }

    /// Nearest hit along `ray` with its distance.
    ///
    /// Pass `None` for `enemies` to consider the button only (menus).
    pub fn resolve_with_distance(
        &self,
        ray: &Ray,
        button: &ButtonTarget,
        enemies: Option<&EnemyField>,
    ) -> Option<(TargetHit, f32)> {
        let mut best: Option<(TargetHit, f32)> = None;

        if button.enabled {
            if let Some(t) = ray_cube_distance(ray, button.center, button.half_extent) {
                best = Some((TargetHit::Button, t));
            }
        }

        // Strict `<` keeps the earlier candidate on ties: button, then lower id
        for enemy in enemies.into_iter().flat_map(|f| f.live()) {
            if let Some(t) = ray_cube_distance(ray, enemy.position, self.enemy_half_extent) {
                if best.is_none_or(|(_, bt)| t < bt) {
                    best = Some((TargetHit::Enemy(enemy.id), t));
                }
            }
        }

        best
    }

    pub fn resolve(&self, ray: &Ray, button: &ButtonTarget, enemies: Option<&EnemyField>) -> TargetHit {
        self.resolve_with_distance(ray, button, enemies)
            .map(|(hit, _)| hit)
            .unwrap_or_default()
    }
}
