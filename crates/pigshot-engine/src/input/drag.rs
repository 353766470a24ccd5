//! Pointer → drag gesture translation.
//!
//! Mirrors what a scene graph's "draggable" flag gives you in a browser engine:
//! pressing on a draggable entity starts a drag, moving reports where the entity
//! should now be, releasing ends it. The tracker only reports; game code decides
//! what a drag actually does to the body.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::input::queue::InputEvent;

/// A drag gesture step for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// The pointer grabbed `id` at world position `pointer`.
    Start { id: EntityId, pointer: Vec2 },
    /// The entity should now be at `pos` (pointer plus grab offset).
    Move { id: EntityId, pos: Vec2 },
    /// The pointer released the entity at `pos` (pointer plus grab offset).
    End { id: EntityId, pos: Vec2 },
}

impl DragEvent {
    pub fn id(&self) -> EntityId {
        match *self {
            DragEvent::Start { id, .. } | DragEvent::Move { id, .. } | DragEvent::End { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    id: EntityId,
    /// Entity position minus pointer position at grab time.
    offset: Vec2,
}

/// Turns raw pointer events into drag events against draggable scene entities.
#[derive(Debug, Default)]
pub struct DragTracker {
    active: Option<ActiveDrag>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity currently being dragged, if any.
    pub fn dragging(&self) -> Option<EntityId> {
        self.active.map(|d| d.id)
    }

    /// Feed one pointer event. Returns the drag event it produces, if any.
    pub fn handle(&mut self, event: InputEvent, scene: &Scene) -> Option<DragEvent> {
        match event {
            InputEvent::PointerDown { x, y } => {
                let pointer = Vec2::new(x, y);
                // Last spawned wins: it is drawn on top
                let hit = scene.iter().rev().find(|e| {
                    e.active && e.draggable && e.pos.distance(pointer) <= e.hit_radius()
                })?;
                self.active = Some(ActiveDrag {
                    id: hit.id,
                    offset: hit.pos - pointer,
                });
                Some(DragEvent::Start { id: hit.id, pointer })
            }
            InputEvent::PointerMove { x, y } => {
                let drag = self.live_drag(scene)?;
                Some(DragEvent::Move {
                    id: drag.id,
                    pos: Vec2::new(x, y) + drag.offset,
                })
            }
            InputEvent::PointerUp { x, y } => {
                let drag = self.live_drag(scene)?;
                self.active = None;
                Some(DragEvent::End {
                    id: drag.id,
                    pos: Vec2::new(x, y) + drag.offset,
                })
            }
        }
    }

    /// The active drag, dropping it if its entity has been despawned.
    fn live_drag(&mut self, scene: &Scene) -> Option<ActiveDrag> {
        let drag = self.active?;
        if scene.contains(drag.id) {
            Some(drag)
        } else {
            log::debug!("drag of {:?} abandoned: entity gone", drag.id);
            self.active = None;
            None
        }
    }
}
