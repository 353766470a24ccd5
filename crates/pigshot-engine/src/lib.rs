pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, GameEvent};
pub use components::entity::Entity;
pub use components::sprite::{SpriteComponent, AtlasId};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType, Bounds,
    ColliderDesc, ColliderMaterial, CollisionGroups, CollisionPair,
    SolverIterations,
};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use input::drag::{DragEvent, DragTracker};
pub use assets::manifest::AssetManifest;
pub use assets::registry::SpriteRegistry;
pub use bridge::protocol::ProtocolLayout;
pub use systems::text::FontConfig;
