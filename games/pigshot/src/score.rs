use pigshot_engine::systems::text::{build_text_entities, despawn_text};
use pigshot_engine::{EngineContext, FontConfig, GameEvent};

use crate::tuning::{Scale, EVENT_SCORE, SCORE_FONT_SIZE, SCORE_POS};

const SCORE_TAG: &str = "score";

/// Running score plus its on-screen readout.
///
/// The score is unbounded in both directions. Call `render` after every change
/// so the text overlay and the host stay in sync.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    score: i32,
    font: FontConfig,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn add(&mut self, delta: i32) {
        self.score += delta;
    }

    pub fn text(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Replace the score text and tell the host the new value.
    pub fn render(&self, ctx: &mut EngineContext, scale: Scale) {
        despawn_text(&mut ctx.scene, SCORE_TAG);
        let glyphs = build_text_entities(
            &self.text(),
            scale.point(SCORE_POS),
            scale.of(SCORE_FONT_SIZE),
            &self.font,
            SCORE_TAG,
            &mut || ctx.next_id(),
        );
        for glyph in glyphs {
            ctx.scene.spawn(glyph);
        }
        ctx.emit_event(GameEvent::scalar(EVENT_SCORE, self.score as f32));
    }

    /// The score as currently drawn.
    #[cfg(test)]
    pub fn displayed(&self, ctx: &EngineContext) -> String {
        pigshot_engine::systems::text::text_of(&ctx.scene, SCORE_TAG, &self.font)
    }
}
