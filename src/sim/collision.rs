//! Boundary collision for a ball inside an axis-aligned box
//!
//! Walls and ceiling reflect with restitution after mirroring the penetration
//! back inside. The floor uses an energy-aware rule: a ball that sank `p`
//! below the floor during the step is mirrored `p` above it, and the work
//! gravity does over that corrective lift is removed from the rebound speed
//! before reflecting. Without that correction every bounce would gain (or,
//! with plain clamping, lose) energy proportional to the penetration depth.

use serde::{Deserialize, Serialize};

use crate::math::Vector2;

/// Rectangular domain `[0, width] x [0, height]`, y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The floor plane
    #[inline]
    pub fn floor_y(&self) -> f64 {
        self.height
    }

    /// Whether a ball of `radius` at `pos` lies fully inside
    pub fn contains(&self, pos: Vector2, radius: f64) -> bool {
        pos.x >= radius
            && pos.x <= self.width - radius
            && pos.y >= radius
            && pos.y <= self.height - radius
    }

    /// Nearest position at which a ball of `radius` fits inside.
    ///
    /// On an axis narrower than the ball, the ball is centered.
    pub fn clamp_inside(&self, pos: Vector2, radius: f64) -> Vector2 {
        Vector2::new(
            clamp_axis(pos.x, radius, self.width),
            clamp_axis(pos.y, radius, self.height),
        )
    }
}

#[inline]
fn clamp_axis(value: f64, radius: f64, extent: f64) -> f64 {
    if extent < 2.0 * radius {
        extent / 2.0
    } else {
        value.clamp(radius, extent - radius)
    }
}

/// Which floor branch resolved a floor hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorOutcome {
    /// Enough energy to rebound: mirrored and reflected
    Mirror,
    /// Not enough energy for the corrective lift: placed on the floor, vy = 0
    Clamp,
}

/// Edges touched during one resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub ceiling: bool,
    pub floor: Option<FloorOutcome>,
    /// Deepest penetration corrected (m)
    pub max_penetration: f64,
}

impl Contacts {
    pub fn any(&self) -> bool {
        self.left || self.right || self.ceiling || self.floor.is_some()
    }

    fn record(&mut self, penetration: f64) {
        self.max_penetration = self.max_penetration.max(penetration);
    }
}

/// Result of [`collide_boundary`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryResolution {
    pub pos: Vector2,
    pub vel: Vector2,
    pub contacts: Contacts,
}

/// Resolve contact between a ball and the domain edges.
///
/// `acc` is the acceleration that acted over the step; its y component is
/// the gravity used by the floor rule (none means no gravity).
pub fn collide_boundary(
    pos: Vector2,
    vel: Vector2,
    bounds: Bounds,
    radius: f64,
    restitution: f64,
    acc: Option<Vector2>,
) -> BoundaryResolution {
    let mut pos = pos;
    let mut vel = vel;
    let mut contacts = Contacts::default();

    // Left / right walls
    if pos.x - radius < 0.0 {
        let penetration = radius - pos.x;
        pos.x = radius + penetration;
        vel.x = vel.x.abs() * restitution;
        contacts.left = true;
        contacts.record(penetration);
    } else if pos.x + radius > bounds.width {
        let penetration = pos.x + radius - bounds.width;
        pos.x = bounds.width - radius - penetration;
        vel.x = -vel.x.abs() * restitution;
        contacts.right = true;
        contacts.record(penetration);
    }

    // Ceiling / floor
    if pos.y - radius < 0.0 {
        let penetration = radius - pos.y;
        pos.y = radius + penetration;
        vel.y = vel.y.abs() * restitution;
        contacts.ceiling = true;
        contacts.record(penetration);
    } else if pos.y + radius > bounds.floor_y() {
        let penetration = pos.y + radius - bounds.floor_y();
        let gravity = acc.map_or(0.0, |a| a.y);
        let floor = resolve_floor(vel.y, penetration, gravity, restitution);
        pos.y = bounds.floor_y() - radius - floor.lift;
        vel.y = floor.vel_y;
        contacts.floor = Some(floor.outcome);
        contacts.record(penetration);
    }

    // A penetration deeper than the free space would mirror straight
    // through the opposite wall.
    let contained = bounds.clamp_inside(pos, radius);
    if contained != pos {
        log::debug!("Boundary correction overshot, clamping {:?} -> {:?}", pos, contained);
        pos = contained;
    }

    BoundaryResolution { pos, vel, contacts }
}

/// Floor branch of [`collide_boundary`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorResolution {
    /// Height of the ball's center above its resting position
    pub lift: f64,
    pub vel_y: f64,
    pub outcome: FloorOutcome,
}

/// Energy-aware floor response.
///
/// The ball sank `penetration` below the floor. Mirroring it back up by the
/// same amount means the center travels `2 * penetration` against gravity,
/// costing `work = 2 * g * 2p` in squared speed. If the incoming squared
/// speed exceeds that, the ball is mirrored with the reduced speed;
/// otherwise it settles on the floor.
pub fn resolve_floor(vel_y: f64, penetration: f64, gravity: f64, restitution: f64) -> FloorResolution {
    let lift_distance = 2.0 * penetration;
    let work = if gravity > 0.0 {
        2.0 * gravity * lift_distance
    } else {
        0.0
    };
    let vel_squared = vel_y * vel_y;

    if vel_squared > work {
        FloorResolution {
            lift: penetration,
            vel_y: -(vel_squared - work).sqrt() * restitution,
            outcome: FloorOutcome::Mirror,
        }
    } else {
        FloorResolution {
            lift: 0.0,
            vel_y: 0.0,
            outcome: FloorOutcome::Clamp,
        }
    }
}
