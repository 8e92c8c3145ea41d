//! Fish tank engine: decides which fish from a polled contract snapshot are
//! swimming, animates them on a fixed tick, and projects them for painting.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod model;
pub mod poller;
pub mod registry;
pub mod render;
pub mod source;

pub use controller::TankController;
pub use engine::{Actor, ActorEngine, HostSignals, StaticHost};
pub use error::{RulesError, SourceError};
pub use model::{Direction, FishId, FishRecord, Placement, Snapshot, TankRules};
pub use poller::{spawn_poller, Poller, PollerConfig};
pub use registry::{HoverRegistry, TankMembership};
pub use render::{project, Drawable};
pub use source::{DemoSource, FileSource, HttpSource, SnapshotSource};
