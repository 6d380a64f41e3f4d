//! Kinematic physics stand-in for the headless host.
//!
//! Moves spawned entities leftwards at constant speed, integrates the hero's
//! jump arc and reports contacts the way a physics engine would: once, when
//! two bodies start touching.

use std::collections::{BTreeMap, BTreeSet};

use ecorunner_common::{EntityId, Vec2};
use ecorunner_gameplay::{Contact, ContactCategory, PlayerConfig, SpawnKind, SpawnRequest};
use tracing::debug;

/// Axis-aligned bounding box for overlap tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Creates an AABB from center and full size.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Checks if this AABB overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Something the physics step wants the session to know.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsReport {
    /// Two bodies started touching.
    Contact(Contact, Contact),
    /// An entity crossed the whole play field.
    TravelComplete(EntityId),
}

/// A spawned entity in flight.
#[derive(Debug, Clone, Copy)]
struct Body {
    kind: SpawnKind,
    position: Vec2,
    size: Vec2,
    velocity_x: f32,
    travelled: f32,
    travel_duration: f32,
}

impl Body {
    fn category(&self) -> ContactCategory {
        match self.kind {
            SpawnKind::Obstacle => ContactCategory::Obstacle,
            SpawnKind::PowerUp => ContactCategory::PowerUp,
        }
    }
}

/// Minimal world: one hero, a flat ground and moving entities.
#[derive(Debug)]
pub struct HeadlessPhysics {
    /// Entities keyed by id, iterated in spawn order
    bodies: BTreeMap<EntityId, Body>,
    /// Bodies currently overlapping the hero
    touching: BTreeSet<EntityId>,
    /// Hero centre
    hero_position: Vec2,
    /// Hero size
    hero_size: Vec2,
    /// Hero vertical velocity, positive is up
    hero_velocity_y: f32,
    /// Hero centre height when standing
    ground_y: f32,
    /// Downward acceleration
    gravity: f32,
    /// Play field width
    field_width: f32,
}

impl HeadlessPhysics {
    /// Create a world with the hero standing on the ground.
    #[must_use]
    pub fn new(player: &PlayerConfig, field_width: f32, gravity: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            touching: BTreeSet::new(),
            hero_position: Vec2::new(player.start_x, player.ground_y),
            hero_size: Vec2::new(player.size.0, player.size.1),
            hero_velocity_y: 0.0,
            ground_y: player.ground_y,
            gravity,
            field_width,
        }
    }

    /// Start moving a freshly spawned entity.
    pub fn spawn(&mut self, id: EntityId, request: &SpawnRequest) {
        self.bodies.insert(
            id,
            Body {
                kind: request.kind,
                position: request.position,
                size: request.size,
                velocity_x: request.velocity_x(self.field_width),
                travelled: 0.0,
                travel_duration: request.travel_duration,
            },
        );
    }

    /// Drop an entity the session removed.
    pub fn remove(&mut self, id: EntityId) {
        self.bodies.remove(&id);
        self.touching.remove(&id);
    }

    /// Drop every entity and put the hero back on the ground.
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.touching.clear();
        self.hero_position.y = self.ground_y;
        self.hero_velocity_y = 0.0;
    }

    /// Hero centre.
    #[must_use]
    pub fn hero_position(&self) -> Vec2 {
        self.hero_position
    }

    /// Hero vertical velocity.
    #[must_use]
    pub fn hero_velocity(&self) -> f32 {
        self.hero_velocity_y
    }

    /// Number of entities in flight.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Positions of every entity in flight.
    pub fn positions(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        self.bodies.iter().map(|(id, body)| (*id, body.position))
    }

    /// Advance the world by `dt`.
    ///
    /// `hero_velocity_y` is the velocity the simulation core holds at the
    /// start of the step, including any impulse it just applied.
    pub fn step(&mut self, dt: f32, hero_velocity_y: f32) -> Vec<PhysicsReport> {
        let mut reports = Vec::new();

        self.step_hero(dt, hero_velocity_y, &mut reports);

        let mut finished = Vec::new();
        for (id, body) in &mut self.bodies {
            body.position.x += body.velocity_x * dt;
            body.travelled += dt;
            if body.travelled >= body.travel_duration {
                finished.push(*id);
            }
        }

        let hero = Aabb::from_center(self.hero_position, self.hero_size);
        for (id, body) in &self.bodies {
            let overlapping = hero.overlaps(&Aabb::from_center(body.position, body.size));
            if overlapping && self.touching.insert(*id) {
                reports.push(PhysicsReport::Contact(
                    Contact::new(ContactCategory::Player),
                    Contact::entity(body.category(), *id),
                ));
            } else if !overlapping {
                self.touching.remove(id);
            }
        }

        for id in finished {
            self.remove(id);
            reports.push(PhysicsReport::TravelComplete(id));
        }

        reports
    }

    #[allow(clippy::float_cmp)]
    fn step_hero(&mut self, dt: f32, hero_velocity_y: f32, reports: &mut Vec<PhysicsReport>) {
        let airborne = hero_velocity_y != 0.0 || self.hero_position.y > self.ground_y;
        if !airborne {
            return;
        }

        self.hero_velocity_y = hero_velocity_y - self.gravity * dt;
        self.hero_position.y += self.hero_velocity_y * dt;

        if self.hero_position.y <= self.ground_y {
            debug!(velocity = self.hero_velocity_y, "hero touched down");
            self.hero_position.y = self.ground_y;
            self.hero_velocity_y = 0.0;
            reports.push(PhysicsReport::Contact(
                Contact::new(ContactCategory::Player),
                Contact::new(ContactCategory::Ground),
            ));
        }
    }
}
