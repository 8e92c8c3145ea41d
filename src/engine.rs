use crate::model::{Direction, FishId, FishRecord, Placement, TankRules};

/// What the engine is allowed to know about its host surface.
pub trait HostSignals {
    fn page_visible(&self) -> bool;
    fn viewport_width(&self) -> u32;
}

/// Fixed host values, for headless runs and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticHost {
    pub visible: bool,
    pub width: u32,
}

impl StaticHost {
    pub fn visible(width: u32) -> Self {
        Self {
            visible: true,
            width,
        }
    }
}

impl HostSignals for StaticHost {
    fn page_visible(&self) -> bool {
        self.visible
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }
}

/// One animating fish.
#[derive(Clone, Debug)]
pub struct Actor {
    fish_id: FishId,
    name: String,
    colour_hue: u16,
    position: f64,
    placement: Placement,
    alive: bool,
    advanced: bool,
    nametag_visible: bool,
}

impl Actor {
    fn new(record: &FishRecord, placement: Placement, viewport_width: u32, rules: &TankRules) -> Self {
        let position = match placement.direction {
            Direction::LeftToRight => -(rules.initial_offset_px as f64),
            Direction::RightToLeft => viewport_width as f64 + rules.initial_offset_px as f64,
        };
        Self {
            fish_id: record.id,
            name: record.name.clone(),
            colour_hue: record.colour_hue,
            position,
            placement,
            alive: true,
            advanced: false,
            nametag_visible: false,
        }
    }

    pub fn fish_id(&self) -> FishId {
        self.fish_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colour_hue(&self) -> u16 {
        self.colour_hue
    }

    /// Horizontal offset of the sprite's left edge, in px.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn direction(&self) -> Direction {
        self.placement.direction
    }

    pub fn lane_pct(&self) -> u8 {
        self.placement.lane_pct
    }

    pub fn speed(&self) -> u32 {
        self.placement.speed
    }

    pub fn size(&self) -> u32 {
        self.placement.size
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn has_advanced(&self) -> bool {
        self.advanced
    }

    /// Set on the last tick where this actor was held by hover.
    pub fn nametag_visible(&self) -> bool {
        self.nametag_visible
    }

    // true only on the first call
    fn retire(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    // only the edge the actor is heading for counts
    fn outside_bounds(&self, viewport_width: u32, margin: u32) -> bool {
        let margin = margin as f64;
        match self.placement.direction {
            Direction::LeftToRight => self.position >= viewport_width as f64 + margin,
            Direction::RightToLeft => self.position <= -margin,
        }
    }
}

/// Central scheduler for every live actor.
///
/// One `tick` advances all actors once; an actor leaves the collection in the
/// same call that decides its removal, so it can never tick again.
#[derive(Debug)]
pub struct ActorEngine {
    rules: TankRules,
    viewport_width: u32,
    actors: Vec<Actor>,
    ticks: u64,
}

impl ActorEngine {
    pub fn new(rules: TankRules, viewport_width: u32) -> Self {
        Self {
            rules,
            viewport_width,
            actors: Vec::new(),
            ticks: 0,
        }
    }

    pub fn rules(&self) -> &TankRules {
        &self.rules
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn get(&self, id: FishId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.fish_id == id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub(crate) fn spawn(&mut self, record: &FishRecord, placement: Placement) {
        debug_assert!(
            self.get(record.id).is_none(),
            "second actor spawned for {}",
            record.id
        );
        self.actors
            .push(Actor::new(record, placement, self.viewport_width, &self.rules));
    }

    /// Advances every actor once and returns the ids removed by this tick.
    ///
    /// A hidden page skips the tick outright. A hovered actor keeps its
    /// position and is not checked for exit.
    pub fn tick(&mut self, page_visible: bool, hover: Option<FishId>) -> Vec<FishId> {
        if !page_visible {
            return Vec::new();
        }
        self.ticks += 1;

        let width = self.viewport_width;
        let margin = self.rules.exit_margin_px;
        let mut removed = Vec::new();

        for actor in &mut self.actors {
            let hovered = hover == Some(actor.fish_id);
            actor.nametag_visible = hovered;
            if hovered {
                continue;
            }

            actor.position += actor.placement.direction.sign() * actor.placement.speed as f64;
            actor.advanced = true;

            if actor.outside_bounds(width, margin) && actor.retire() {
                removed.push(actor.fish_id);
            }
        }

        if !removed.is_empty() {
            self.actors.retain(|a| a.alive);
        }
        removed
    }

    /// External removal (death, pulled off-tank). Returns false when no
    /// live actor has this id.
    pub(crate) fn retire(&mut self, id: FishId) -> bool {
        let Some(ix) = self.actors.iter().position(|a| a.fish_id == id) else {
            return false;
        };
        let fired = self.actors[ix].retire();
        self.actors.remove(ix);
        fired
    }

    /// Viewport resize notification. Purely cosmetic: actors still parked
    /// off the right edge are moved to just past the new edge, nothing is
    /// removed.
    pub fn resize(&mut self, viewport_width: u32) {
        if viewport_width == self.viewport_width {
            return;
        }
        self.viewport_width = viewport_width;
        let parked = viewport_width as f64 + self.rules.initial_offset_px as f64;
        for actor in &mut self.actors {
            if actor.placement.direction == Direction::RightToLeft && !actor.advanced {
                actor.position = parked;
            }
        }
    }
}
