use crate::engine::{Actor, ActorEngine, HostSignals};
use crate::model::{Direction, FishId, FishRecord, Placement, TankRules};
use crate::registry::{HoverRegistry, TankMembership};
use crate::render::{project, Drawable};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Decides which fish are in the tank and owns their actors.
///
/// At most one fish is introduced per reconciliation so entrances are
/// staggered even when a snapshot brings many new fish at once.
pub struct TankController<R: Rng> {
    membership: TankMembership,
    engine: ActorEngine,
    hover: HoverRegistry,
    rng: R,
}

impl<R: Rng> TankController<R> {
    pub fn new(rules: TankRules, viewport_width: u32, hover: HoverRegistry, rng: R) -> Self {
        Self {
            membership: TankMembership::default(),
            engine: ActorEngine::new(rules, viewport_width),
            hover,
            rng,
        }
    }

    pub fn membership(&self) -> &TankMembership {
        &self.membership
    }

    pub fn engine(&self) -> &ActorEngine {
        &self.engine
    }

    pub fn actors(&self) -> &[Actor] {
        self.engine.actors()
    }

    pub fn hover(&self) -> &HoverRegistry {
        &self.hover
    }

    pub fn rules(&self) -> &TankRules {
        self.engine.rules()
    }

    /// Spawns one fish chosen uniformly from the records that are not yet in
    /// the tank. Returns the spawned id, or `None` when nothing is eligible.
    /// Never removes anything.
    pub fn reconcile(&mut self, snapshot: &[FishRecord]) -> Option<FishId> {
        let skip_dead = self.engine.rules().retire_dead;
        let mut seen = HashSet::new();
        let candidates: Vec<&FishRecord> = snapshot
            .iter()
            .filter(|r| !self.membership.contains(r.id))
            .filter(|r| !(skip_dead && r.dead))
            .filter(|r| seen.insert(r.id))
            .collect();

        let chosen = *candidates.choose(&mut self.rng)?;
        let placement = self.draw_placement();

        let inserted = self.membership.insert(chosen.id);
        debug_assert!(inserted, "{} already in tank", chosen.id);
        self.engine.spawn(chosen, placement);

        debug!(
            fish = %chosen.id,
            name = %chosen.name,
            candidates = candidates.len(),
            direction = ?placement.direction,
            lane = placement.lane_pct,
            speed = placement.speed,
            size = placement.size,
            "fish entered tank"
        );
        Some(chosen.id)
    }

    /// Retires live actors whose record reports the fish as dead.
    pub fn apply_deaths(&mut self, snapshot: &[FishRecord]) -> Vec<FishId> {
        if !self.engine.rules().retire_dead {
            return Vec::new();
        }
        let dead: Vec<FishId> = snapshot
            .iter()
            .filter(|r| r.dead && self.membership.contains(r.id))
            .map(|r| r.id)
            .collect();
        dead.into_iter().filter(|&id| self.retire(id)).collect()
    }

    /// Explicit removal signal for one fish. Returns false if it had no actor.
    pub fn retire(&mut self, id: FishId) -> bool {
        if !self.engine.retire(id) {
            return false;
        }
        self.actor_removed(id);
        true
    }

    /// One scheduler tick for every actor. Returns the ids that left the tank.
    pub fn tick(&mut self, host: &impl HostSignals) -> Vec<FishId> {
        self.engine.resize(host.viewport_width());
        let removed = self
            .engine
            .tick(host.page_visible(), self.hover.current_hover());
        for &id in &removed {
            self.actor_removed(id);
        }
        removed
    }

    pub fn resize(&mut self, viewport_width: u32) {
        self.engine.resize(viewport_width);
    }

    pub fn drawables(&self, highlighted: Option<FishId>) -> Vec<Drawable> {
        let hover = self.hover.current_hover();
        self.engine
            .actors()
            .iter()
            .map(|a| project(a, hover, highlighted, self.engine.rules()))
            .collect()
    }

    // the only path back to eligibility
    fn actor_removed(&mut self, id: FishId) {
        if self.membership.remove(id) {
            debug!(fish = %id, "fish left tank");
        }
    }

    fn draw_placement(&mut self) -> Placement {
        let rules = self.engine.rules();
        let (lanes, speeds, sizes) = (
            rules.lane_min_pct..=rules.lane_max_pct,
            rules.speed_min..=rules.speed_max,
            rules.size_min..=rules.size_max,
        );
        let direction = if self.rng.gen_bool(0.5) {
            Direction::LeftToRight
        } else {
            Direction::RightToLeft
        };
        Placement {
            direction,
            lane_pct: self.rng.gen_range(lanes),
            speed: self.rng.gen_range(speeds),
            size: self.rng.gen_range(sizes),
        }
    }
}
