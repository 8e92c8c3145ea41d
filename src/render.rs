use crate::engine::Actor;
use crate::model::{FishId, TankRules};

/// Everything a presentation layer needs to paint one fish.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    pub fish_id: FishId,
    pub name: String,
    /// Left edge in px from the tank's left side.
    pub x: f64,
    pub lane_pct: u8,
    /// Sprite faces left.
    pub mirrored: bool,
    pub size: u32,
    pub opacity: f32,
    /// Size relative to the largest fish the rules allow.
    pub scale: f32,
    pub hue_rotate_deg: u16,
    pub show_nametag: bool,
}

/// Projects an actor and the hover state into drawable attributes. Pure.
pub fn project(
    actor: &Actor,
    hover: Option<FishId>,
    highlighted: Option<FishId>,
    rules: &TankRules,
) -> Drawable {
    let id = actor.fish_id();
    let size = actor.size();
    Drawable {
        fish_id: id,
        name: actor.name().to_string(),
        x: actor.position(),
        lane_pct: actor.lane_pct(),
        mirrored: actor.direction().faces_left(),
        size,
        opacity: (size as f32 / 100.0).clamp(0.0, 1.0),
        scale: size as f32 / rules.size_max.max(1) as f32,
        hue_rotate_deg: actor.colour_hue() % 360,
        show_nametag: hover == Some(id) || highlighted == Some(id),
    }
}
