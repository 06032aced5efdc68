//! Minimal in-process physics world
//!
//! A small circle/box simulation implementing [`PhysicsWorld`], good enough
//! to drive the rules layer headlessly (demo binary, integration tests):
//! - Semi-implicit Euler integration with gravity
//! - Iterative positional correction + normal impulses
//! - Contact-start detection (pairs touching now that were apart last step)
//!
//! It is not a general physics engine: no rotation, no friction, no sleeping.

use std::collections::HashSet;
use std::f32::consts::PI;

use glam::Vec2;

use super::physics::{BodyHandle, BodyInfo, BodyTag, ContactPair, PhysicsWorld};
use crate::consts::*;

/// Downward acceleration (px/s², screen space)
pub const GRAVITY: f32 = 980.0;
/// Mass per unit area
const DENSITY: f32 = 0.001;
/// Bounciness of orb contacts
const RESTITUTION: f32 = 0.3;
/// Approach speeds below this don't bounce (lets stacks come to rest)
const REST_SPEED: f32 = 40.0;
/// Velocity decay per second
const LINEAR_DAMPING: f32 = 0.05;
/// Fraction of penetration corrected per solver pass
const CORRECTION_PERCENT: f32 = 0.8;
const SOLVER_ITERATIONS: usize = 4;
/// Surfaces closer than this count as touching
const CONTACT_SLOP: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned box
    Rect { half_extents: Vec2 },
}

#[derive(Debug, Clone)]
struct Body {
    handle: BodyHandle,
    position: Vec2,
    velocity: Vec2,
    shape: Shape,
    tag: BodyTag,
    inv_mass: f32,
}

impl Body {
    fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    fn mass(&self) -> f32 {
        if self.is_static() {
            f32::INFINITY
        } else {
            1.0 / self.inv_mass
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        match self.shape {
            Shape::Circle { radius } => self.position.distance_squared(point) <= radius * radius,
            Shape::Rect { half_extents } => {
                let d = (point - self.position).abs();
                d.x <= half_extents.x && d.y <= half_extents.y
            }
        }
    }

    fn info(&self) -> BodyInfo {
        BodyInfo {
            handle: self.handle,
            position: self.position,
            velocity: self.velocity,
            tag: self.tag,
            mass: self.mass(),
            is_static: self.is_static(),
        }
    }
}

/// Signed gap between two shapes and the normal pointing from `a` to `b`.
/// Negative gap means penetration. Box-box pairs are never tested.
fn separation(a: &Body, b: &Body) -> Option<(Vec2, f32)> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let delta = b.position - a.position;
            let dist = delta.length();
            let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
            Some((normal, dist - ra - rb))
        }
        (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
            circle_rect(a.position, radius, b.position, half_extents).map(|(n, gap)| (-n, gap))
        }
        (Shape::Rect { half_extents }, Shape::Circle { radius }) => {
            circle_rect(b.position, radius, a.position, half_extents)
        }
        (Shape::Rect { .. }, Shape::Rect { .. }) => None,
    }
}

/// Gap between a circle and a box; normal points from the box to the circle
fn circle_rect(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> Option<(Vec2, f32)> {
    let min = box_center - half;
    let max = box_center + half;
    let closest = center.clamp(min, max);
    let diff = center - closest;
    let dist = diff.length();

    if dist > f32::EPSILON {
        return Some((diff / dist, dist - radius));
    }

    // Center inside the box: push out through the nearest face
    let faces = [
        (center.x - min.x, Vec2::NEG_X),
        (max.x - center.x, Vec2::X),
        (center.y - min.y, Vec2::NEG_Y),
        (max.y - center.y, Vec2::Y),
    ];
    faces
        .into_iter()
        .min_by(|l, r| l.0.partial_cmp(&r.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(depth, normal)| (normal, -(depth + radius)))
}

/// Mutable access to two distinct bodies (`i < j`)
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    let (lo, hi) = bodies.split_at_mut(j);
    (&mut lo[i], &mut hi[0])
}

fn ordered(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a <= b { (a, b) } else { (b, a) }
}

/// In-process world implementing [`PhysicsWorld`]
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    /// Bodies in insertion order
    bodies: Vec<Body>,
    gravity: Vec2,
    /// Pairs touching at the end of the last step
    touching: HashSet<(BodyHandle, BodyHandle)>,
    next_handle: u64,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Empty world with default gravity and no walls
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            gravity: Vec2::new(0.0, GRAVITY),
            touching: HashSet::new(),
            next_handle: 1,
        }
    }

    /// World with the U-shaped container: floor plus left and right walls
    pub fn with_walls() -> Self {
        let mut world = Self::new();
        let half_wall = WALL_THICKNESS / 2.0;
        // Floor top sits 10px above the board bottom
        world.spawn_wall(
            Vec2::new(BOARD_WIDTH / 2.0, BOARD_HEIGHT + half_wall - 10.0),
            Vec2::new(BOARD_WIDTH / 2.0, half_wall),
        );
        world.spawn_wall(
            Vec2::new(-half_wall, BOARD_HEIGHT / 2.0),
            Vec2::new(half_wall, BOARD_HEIGHT / 2.0),
        );
        world.spawn_wall(
            Vec2::new(BOARD_WIDTH + half_wall, BOARD_HEIGHT / 2.0),
            Vec2::new(half_wall, BOARD_HEIGHT / 2.0),
        );
        world
    }

    fn allocate(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Insert a static box
    pub fn spawn_wall(&mut self, center: Vec2, half_extents: Vec2) -> BodyHandle {
        let handle = self.allocate();
        self.bodies.push(Body {
            handle,
            position: center,
            velocity: Vec2::ZERO,
            shape: Shape::Rect { half_extents },
            tag: BodyTag::Wall,
            inv_mass: 0.0,
        });
        handle
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Number of bodies, walls included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of orb bodies
    pub fn orb_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.tag.is_orb()).count()
    }

    /// Advance the simulation and return the pairs that started touching
    pub fn step(&mut self, dt: f32) -> Vec<ContactPair> {
        let damping = (1.0 - LINEAR_DAMPING * dt).max(0.0);
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            body.velocity += self.gravity * dt;
            body.velocity *= damping;
            body.position += body.velocity * dt;
        }

        let n = self.bodies.len();
        for _ in 0..SOLVER_ITERATIONS {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (a, b) = pair_mut(&mut self.bodies, i, j);
                    if a.is_static() && b.is_static() {
                        continue;
                    }
                    if let Some((normal, gap)) = separation(a, b) {
                        if gap < 0.0 {
                            resolve(a, b, normal, -gap);
                        }
                    }
                }
            }
        }

        // Contact-start detection
        let mut now_touching = HashSet::new();
        let mut started = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if a.is_static() && b.is_static() {
                    continue;
                }
                let Some((_, gap)) = separation(a, b) else {
                    continue;
                };
                if gap <= CONTACT_SLOP {
                    let key = ordered(a.handle, b.handle);
                    if !self.touching.contains(&key) {
                        started.push(ContactPair::new(a.handle, b.handle));
                    }
                    now_touching.insert(key);
                }
            }
        }
        self.touching = now_touching;

        started
    }
}

/// Push two overlapping bodies apart and cancel their approaching velocity
fn resolve(a: &mut Body, b: &mut Body, normal: Vec2, depth: f32) {
    let total_inv = a.inv_mass + b.inv_mass;
    if total_inv == 0.0 {
        return;
    }

    let correction = normal * (depth * CORRECTION_PERCENT / total_inv);
    a.position -= correction * a.inv_mass;
    b.position += correction * b.inv_mass;

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach < 0.0 {
        let restitution = if -approach > REST_SPEED { RESTITUTION } else { 0.0 };
        let impulse = -(1.0 + restitution) * approach / total_inv;
        a.velocity -= normal * impulse * a.inv_mass;
        b.velocity += normal * impulse * b.inv_mass;
    }
}

impl PhysicsWorld for SandboxWorld {
    fn spawn_circle(&mut self, position: Vec2, radius: f32, tag: BodyTag) -> BodyHandle {
        let handle = self.allocate();
        let mass = PI * radius * radius * DENSITY;
        self.bodies.push(Body {
            handle,
            position,
            velocity: Vec2::ZERO,
            shape: Shape::Circle { radius },
            tag,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
        });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.handle != handle);
        if self.bodies.len() == before {
            return false;
        }
        self.touching.retain(|(a, b)| *a != handle && *b != handle);
        true
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.iter_mut().find(|b| b.handle == handle) {
            if !body.is_static() {
                body.velocity += impulse * body.inv_mass;
            }
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.iter_mut().find(|b| b.handle == handle) {
            if !body.is_static() {
                body.velocity = velocity;
            }
        }
    }

    fn query_point(&self, point: Vec2) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .filter(|b| b.contains(point))
            .map(|b| b.handle)
            .collect()
    }

    fn all_bodies(&self) -> Vec<BodyInfo> {
        self.bodies.iter().map(Body::info).collect()
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyInfo> {
        self.bodies.iter().find(|b| b.handle == handle).map(Body::info)
    }
}
