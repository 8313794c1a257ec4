/// Schools of small fish steering as a flock.
///
/// A school owns its members outright. Members are ordinary `Fish` records;
/// the flocking steer only looks at schoolmates, never the wider world.
use std::collections::BTreeMap;

use glam::Vec2;

use crate::entities::Fish;
use crate::fish::MIN_LENGTH_SQ;
use crate::special;

pub type SchoolId = u32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockingWeights {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    /// Neighbours closer than this push each other apart.
    pub separation_radius: f32,
}

impl Default for FlockingWeights {
    fn default() -> Self {
        Self {
            separation: 6.0,
            alignment: 1.0,
            cohesion: 0.8,
            separation_radius: 2.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct School {
    pub id: SchoolId,
    pub members: Vec<Fish>,
    pub min_size: usize,
    pub max_size: usize,
}

impl School {
    fn live_count(&self) -> usize {
        self.members.iter().filter(|f| f.body.alive).count()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchoolingSystem {
    schools: BTreeMap<SchoolId, School>,
    next_id: SchoolId,
    pub weights: FlockingWeights,
}

impl SchoolingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_school(&mut self, min_size: usize, max_size: usize) -> SchoolId {
        let id = self.next_id;
        self.next_id += 1;
        let max_size = max_size.max(1);
        self.schools.insert(
            id,
            School {
                id,
                members: Vec::new(),
                min_size: min_size.min(max_size),
                max_size,
            },
        );
        id
    }

    /// Hands the fish back when the school is unknown or already full.
    pub fn add_to_school(&mut self, id: SchoolId, fish: Fish) -> Result<(), Fish> {
        match self.schools.get_mut(&id) {
            Some(school) if school.members.len() < school.max_size => {
                school.members.push(fish);
                Ok(())
            }
            _ => Err(fish),
        }
    }

    pub fn school(&self, id: SchoolId) -> Option<&School> {
        self.schools.get(&id)
    }

    pub fn schools(&self) -> impl Iterator<Item = &School> {
        self.schools.values()
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &Fish> {
        self.schools.values().flat_map(|s| s.members.iter())
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut Fish> {
        self.schools.values_mut().flat_map(|s| s.members.iter_mut())
    }

    /// Steers every live, steerable member against its own schoolmates.
    pub fn apply_flocking(&mut self, dt: f32) {
        let weights = self.weights;
        for school in self.schools.values_mut() {
            let forces: Vec<Vec2> = (0..school.members.len())
                .map(|i| flocking_force(&school.members, i, &weights))
                .collect();
            for (fish, force) in school.members.iter_mut().zip(forces) {
                if !fish.body.alive
                    || fish.status.fleeing
                    || fish.status.stunned.is_some()
                    || fish.status.frozen.is_some()
                {
                    continue;
                }
                let limit = special::nominal_speed(fish);
                fish.body.velocity = (fish.body.velocity + force * dt).clamp_length_max(limit);
            }
        }
    }

    /// Drops dead members, then disbands schools that fell below their
    /// minimum size. Returns the live fish released by disbanding.
    pub fn prune(&mut self) -> Vec<Fish> {
        let mut released = Vec::new();
        for school in self.schools.values_mut() {
            school.members.retain(|f| f.body.alive);
        }
        let disband: Vec<SchoolId> = self
            .schools
            .values()
            .filter(|s| s.live_count() < s.min_size || s.members.is_empty())
            .map(|s| s.id)
            .collect();
        for id in disband {
            if let Some(school) = self.schools.remove(&id) {
                released.extend(school.members);
            }
        }
        released
    }

    pub fn clear(&mut self) {
        self.schools.clear();
    }
}

/// Weighted separation + alignment + cohesion for `members[index]`.
pub fn flocking_force(members: &[Fish], index: usize, weights: &FlockingWeights) -> Vec2 {
    let me = &members[index];
    if !me.body.alive {
        return Vec2::ZERO;
    }

    let mut separation = Vec2::ZERO;
    let mut velocity_sum = Vec2::ZERO;
    let mut position_sum = Vec2::ZERO;
    let mut neighbours = 0u32;

    for (j, other) in members.iter().enumerate() {
        if j == index || !other.body.alive {
            continue;
        }
        neighbours += 1;
        velocity_sum += other.body.velocity;
        position_sum += other.body.position;

        let offset = me.body.position - other.body.position;
        let dist_sq = offset.length_squared();
        if dist_sq > MIN_LENGTH_SQ && dist_sq < weights.separation_radius * weights.separation_radius {
            separation += offset / dist_sq;
        }
    }

    if neighbours == 0 {
        return Vec2::ZERO;
    }
    let n = neighbours as f32;
    let alignment = velocity_sum / n - me.body.velocity;
    let cohesion = position_sum / n - me.body.position;

    separation * weights.separation + alignment * weights.alignment + cohesion * weights.cohesion
}
