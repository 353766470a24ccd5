use glam::Vec2;
use pigshot_engine::{
    AtlasId, BodyDesc, BodyType, ColliderDesc, ColliderMaterial, CollisionGroups, CollisionPair,
    DragEvent, EngineContext, Entity, EntityId, Game, GameConfig, SpriteComponent,
};

use crate::boundary::{bird_out_of_bounds, contain_pigs};
use crate::launch;
use crate::score::ScoreBoard;
use crate::targets::TargetRegistry;
use crate::tuning::{
    Scale, BIRD_REST, GRAVITY, GROUP_BIRD, GROUP_PIG, GROUP_SLINGSHOT, HIT_POINTS, INITIAL_PIGS,
    MISS_PENALTY, SLINGSHOT_POS, SLINGSHOT_TEXTURE_SIZE,
};

/// Air drag on the bird in flight, per second.
const BIRD_AIR_DAMPING: f32 = 0.6;

/// One play session: the bird, the live pigs and the score.
pub struct PigShot {
    scale: Scale,
    bird: Option<EntityId>,
    pigs: TargetRegistry,
    score: ScoreBoard,
}

impl PigShot {
    pub fn new() -> Self {
        Self {
            scale: Scale::default(),
            bird: None,
            pigs: TargetRegistry::new(),
            score: ScoreBoard::new(),
        }
    }

    pub fn score(&self) -> i32 {
        self.score.score()
    }

    pub fn bird(&self) -> Option<EntityId> {
        self.bird
    }

    pub fn pigs(&self) -> &[EntityId] {
        self.pigs.ids()
    }

    fn build_slingshot(&self, ctx: &mut EngineContext) {
        let size = self.scale.point(SLINGSHOT_TEXTURE_SIZE);
        let sprite = ctx
            .sprites
            .get_or("slingshot", SpriteComponent::cell(AtlasId(0), 2.0, 0.0));
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag("slingshot")
                .with_scale(size)
                .with_sprite(sprite),
            BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: size.x / 2.0,
                half_height: size.y / 2.0,
            })
            .with_position(self.scale.point(SLINGSHOT_POS))
            .with_groups(CollisionGroups::new(GROUP_SLINGSHOT, CollisionGroups::ALL.filter)),
            ColliderMaterial::default(),
        );
    }

    fn build_bird(&mut self, ctx: &mut EngineContext) {
        let radius = self.scale.bird_radius();
        let sprite = ctx
            .sprites
            .get_or("bird", SpriteComponent::cell(AtlasId(0), 0.0, 0.0));
        let id = ctx.next_id();
        ctx.spawn_with_body(
            Entity::new(id)
                .with_tag("bird")
                .with_scale(Vec2::splat(radius * 2.0))
                .with_sprite(sprite)
                .with_draggable(true),
            BodyDesc::fixed(ColliderDesc::Ball { radius })
                .with_position(self.scale.point(BIRD_REST))
                .with_fixed_rotation(false)
                .with_ccd(true)
                .with_linear_damping(BIRD_AIR_DAMPING)
                .with_groups(CollisionGroups::new(GROUP_BIRD, GROUP_PIG)),
            ColliderMaterial::default(),
        );
        self.bird = Some(id);
    }

    /// Put the bird back on the slingshot, pinned in place.
    fn reset_bird(&self, ctx: &mut EngineContext) {
        let Some(bird) = self.bird else {
            return;
        };
        // Fixed bodies ignore velocity writes, so stop it first
        ctx.set_velocity(bird, Vec2::ZERO);
        ctx.set_position(bird, self.scale.point(BIRD_REST));
        ctx.set_body_type(bird, BodyType::Fixed);
    }

    /// The pig `pair` hit the bird with, if it is still alive.
    fn struck_pig(&self, pair: &CollisionPair) -> Option<EntityId> {
        let pig = pair.other(self.bird?)?;
        self.pigs.contains(pig).then_some(pig)
    }

    fn on_hit(&mut self, ctx: &mut EngineContext, pig: EntityId) {
        self.pigs.remove(pig);
        ctx.despawn(pig);

        self.score.add(HIT_POINTS);
        self.score.render(ctx, self.scale);
        log::info!("pig {:?} hit, score {}", pig, self.score.score());

        self.pigs.spawn(ctx, self.scale);
        self.reset_bird(ctx);
    }

    fn check_bird(&mut self, ctx: &mut EngineContext) {
        let Some(bounds) = self.bird.and_then(|bird| ctx.bounds(bird)) else {
            return;
        };
        if bird_out_of_bounds(&bounds, ctx.world_size()) {
            self.reset_bird(ctx);
            self.score.add(-MISS_PENALTY);
            self.score.render(ctx, self.scale);
            log::info!("bird left the field, score {}", self.score.score());
        }
    }
}

impl Default for PigShot {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for PigShot {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec2::new(0.0, GRAVITY),
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.scale = Scale::from_viewport(ctx.world_size());

        self.build_slingshot(ctx);
        self.build_bird(ctx);
        for _ in 0..INITIAL_PIGS {
            self.pigs.spawn(ctx, self.scale);
        }
        self.score.render(ctx, self.scale);

        let world = ctx.world_size();
        log::info!(
            "pigshot: {}x{} field, scale {:.3}, {} pigs",
            world.x,
            world.y,
            self.scale.0,
            self.pigs.len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        self.check_bird(ctx);
        contain_pigs(ctx, self.pigs.ids());
    }

    fn on_drag(&mut self, ctx: &mut EngineContext, event: DragEvent) {
        let Some(bird) = self.bird.filter(|&bird| bird == event.id()) else {
            return;
        };
        match event {
            DragEvent::Start { .. } => launch::grab(ctx, bird),
            DragEvent::Move { pos, .. } => launch::pull(ctx, bird, pos),
            DragEvent::End { .. } => launch::release(ctx, bird, self.scale),
        }
    }

    fn on_collision_start(&mut self, ctx: &mut EngineContext, pair: CollisionPair) {
        if let Some(pig) = self.struck_pig(&pair) {
            self.on_hit(ctx, pig);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigshot_engine::{InputEvent, SolverIterations};
    use crate::tuning::DRAG_SOLVER;
    use pigshot_web::GameRunner;

    fn started_game(width: f32, height: f32) -> (PigShot, EngineContext) {
        let mut game = PigShot::new();
        let config = game.config().with_viewport(width, height).with_seed(7);
        let mut ctx = EngineContext::new(&config);
        game.init(&mut ctx);
        ctx.clear_frame_data();
        (game, ctx)
    }

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn bird_at_rest(game: &PigShot, ctx: &EngineContext, scale: f32) {
        let bird = game.bird().unwrap();
        assert_near(ctx.position(bird).unwrap(), BIRD_REST * scale);
        assert_eq!(ctx.body_type(bird), Some(BodyType::Fixed));
    }

    #[test]
    fn init_builds_the_field() {
        let (game, ctx) = started_game(800.0, 600.0);
        assert_eq!(game.pigs().len(), 3);
        assert_eq!(game.score(), 0);
        bird_at_rest(&game, &ctx, 1.0);
        assert_eq!(ctx.scene.find_all_by_tag("slingshot").len(), 1);
        assert_eq!(game.score.displayed(&ctx), "Score: 0");
    }

    #[test]
    fn layout_follows_viewport_scale() {
        let (game, ctx) = started_game(1600.0, 1200.0);
        bird_at_rest(&game, &ctx, 2.0);
        let bird = ctx.scene.get(game.bird().unwrap()).unwrap();
        assert_eq!(bird.hit_radius(), 32.0);
    }

    #[test]
    fn drag_and_release_launches_opposite_to_the_pull() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();

        game.on_drag(&mut ctx, DragEvent::Start { id: bird, pointer: Vec2::new(150.0, 450.0) });
        assert_eq!(ctx.body_type(bird), Some(BodyType::KinematicPositionBased));
        assert_eq!(ctx.physics.solver_iterations(), SolverIterations { position: 30, velocity: 30 });

        game.on_drag(&mut ctx, DragEvent::Move { id: bird, pos: Vec2::new(100.0, 470.0) });
        assert_near(ctx.position(bird).unwrap(), Vec2::new(100.0, 470.0));

        game.on_drag(&mut ctx, DragEvent::End { id: bird, pos: Vec2::new(100.0, 470.0) });
        assert_eq!(ctx.body_type(bird), Some(BodyType::Dynamic));
        assert_eq!(ctx.physics.solver_iterations(), SolverIterations::default());
        // (6.25, -2.5) per frame
        assert_near(ctx.velocity(bird), Vec2::new(375.0, -150.0));
    }

    #[test]
    fn drags_on_other_entities_are_ignored() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let pig = game.pigs()[0];
        game.on_drag(&mut ctx, DragEvent::Start { id: pig, pointer: Vec2::ZERO });
        assert_eq!(ctx.body_type(pig), Some(BodyType::Dynamic));
        assert_eq!(ctx.physics.solver_iterations(), SolverIterations::default());
    }

    #[test]
    fn hit_scores_and_replaces_the_pig() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();
        let pig = game.pigs()[1];
        ctx.set_body_type(bird, BodyType::Dynamic);
        ctx.set_position(bird, Vec2::new(500.0, 300.0));

        game.on_collision_start(&mut ctx, CollisionPair::started(pig, bird));

        assert_eq!(game.score(), 10);
        assert_eq!(game.pigs().len(), 3);
        assert!(!game.pigs().contains(&pig));
        assert!(!ctx.scene.contains(pig));
        bird_at_rest(&game, &ctx, 1.0);
        assert_eq!(game.score.displayed(&ctx), "Score: 10");
    }

    #[test]
    fn hit_while_dragging_keeps_the_bird_grabbable() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();
        let pig = game.pigs()[0];

        game.on_drag(&mut ctx, DragEvent::Start { id: bird, pointer: Vec2::new(150.0, 450.0) });
        game.on_collision_start(&mut ctx, CollisionPair::started(bird, pig));

        assert_eq!(game.score(), 10);
        bird_at_rest(&game, &ctx, 1.0);
        assert_eq!(ctx.physics.solver_iterations(), DRAG_SOLVER);

        // The pointer is still down: the drag carries on from the rest point
        game.on_drag(&mut ctx, DragEvent::Move { id: bird, pos: Vec2::new(100.0, 470.0) });
        assert_near(ctx.position(bird).unwrap(), Vec2::new(100.0, 470.0));
        game.on_drag(&mut ctx, DragEvent::End { id: bird, pos: Vec2::new(100.0, 470.0) });

        assert_eq!(ctx.physics.solver_iterations(), SolverIterations::default());
        assert_eq!(ctx.body_type(bird), Some(BodyType::Dynamic));
        assert_near(ctx.velocity(bird), Vec2::new(375.0, -150.0));
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn duplicate_collision_is_processed_once() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();
        let pig = game.pigs()[0];
        let pair = CollisionPair::started(bird, pig);

        game.on_collision_start(&mut ctx, pair);
        game.on_collision_start(&mut ctx, pair);

        assert_eq!(game.score(), 10);
        assert_eq!(game.pigs().len(), 3);
    }

    #[test]
    fn pig_on_pig_contact_is_not_a_hit() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let (a, b) = (game.pigs()[0], game.pigs()[1]);
        game.on_collision_start(&mut ctx, CollisionPair::started(a, b));
        assert_eq!(game.score(), 0);
        assert_eq!(game.pigs(), &[a, b, game.pigs()[2]]);
    }

    #[test]
    fn bird_leaving_the_field_costs_points() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();
        ctx.set_body_type(bird, BodyType::Dynamic);
        ctx.set_position(bird, Vec2::new(-100.0, 450.0));

        game.update(&mut ctx);

        assert_eq!(game.score(), -10);
        bird_at_rest(&game, &ctx, 1.0);
        assert_eq!(game.score.displayed(&ctx), "Score: -10");

        // Back at rest, so the next frame does nothing
        game.update(&mut ctx);
        assert_eq!(game.score(), -10);
    }

    #[test]
    fn bird_above_the_field_is_left_alone() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let bird = game.bird().unwrap();
        ctx.set_position(bird, Vec2::new(300.0, -400.0));
        game.update(&mut ctx);
        assert_eq!(game.score(), 0);
        assert_near(ctx.position(bird).unwrap(), Vec2::new(300.0, -400.0));
    }

    #[test]
    fn pigs_bounce_off_the_edges() {
        let (mut game, mut ctx) = started_game(800.0, 600.0);
        let left = game.pigs()[0];
        let bottom = game.pigs()[1];
        let radius = Scale(1.0).pig_radius();

        ctx.set_position(left, Vec2::new(10.0, 300.0));
        ctx.set_velocity(left, Vec2::new(-120.0, 0.0));
        ctx.set_position(bottom, Vec2::new(500.0, 595.0));
        ctx.set_velocity(bottom, Vec2::new(60.0, 200.0));

        game.update(&mut ctx);

        assert_near(ctx.velocity(left), Vec2::new(120.0, 0.0));
        assert_near(ctx.position(left).unwrap(), Vec2::new(10.0, 300.0));
        assert_near(ctx.velocity(bottom), Vec2::new(60.0, -200.0));
        assert_near(ctx.position(bottom).unwrap(), Vec2::new(500.0, 600.0 - radius));
    }

    #[test]
    fn runner_drives_a_full_shot() {
        let mut runner = GameRunner::new(PigShot::new(), 800.0, 600.0, 3);
        runner.init();
        runner.push_input(InputEvent::PointerDown { x: 150.0, y: 450.0 });
        runner.push_input(InputEvent::PointerMove { x: 100.0, y: 470.0 });
        runner.push_input(InputEvent::PointerUp { x: 100.0, y: 470.0 });
        runner.tick(1.0 / 60.0);

        let bird = runner.game().bird().unwrap();
        let ctx = runner.ctx();
        assert_eq!(ctx.body_type(bird), Some(BodyType::Dynamic));
        let vel = ctx.velocity(bird);
        assert!(vel.x > 360.0 && vel.x <= 375.0, "vx = {}", vel.x);
        assert!(vel.y > -150.0, "gravity should pull vy down-screen: {}", vel.y);
        assert!(runner.instance_count() >= 5);
    }

    #[test]
    fn runner_scores_a_pig_touching_the_resting_bird() {
        let mut runner = GameRunner::new(PigShot::new(), 800.0, 600.0, 3);
        runner.init();
        let pig = runner.game().pigs()[0];
        // Drop the pig straight onto the bird, clear of the slingshot
        runner.ctx_mut().set_position(pig, Vec2::new(150.0, 400.0));
        runner.ctx_mut().set_velocity(pig, Vec2::new(0.0, 300.0));

        for _ in 0..10 {
            runner.tick(1.0 / 60.0);
        }

        let game = runner.game();
        assert_eq!(game.score(), 10);
        assert_eq!(game.pigs().len(), 3);
        assert!(!game.pigs().contains(&pig));
        assert!(!runner.ctx().scene.contains(pig));
        bird_at_rest(game, runner.ctx(), 1.0);
    }

    #[test]
    fn runner_bird_flies_through_the_slingshot() {
        let mut runner = GameRunner::new(PigShot::new(), 800.0, 600.0, 3);
        runner.init();
        // Pull left of the rest point: the bird heads right, across the slingshot
        runner.push_input(InputEvent::PointerDown { x: 150.0, y: 450.0 });
        runner.push_input(InputEvent::PointerMove { x: 110.0, y: 450.0 });
        runner.push_input(InputEvent::PointerUp { x: 110.0, y: 450.0 });

        let bird = runner.game().bird().unwrap();
        let slingshot_right = SLINGSHOT_POS.x + SLINGSHOT_TEXTURE_SIZE.x / 2.0;
        for _ in 0..40 {
            runner.tick(1.0 / 60.0);
            if runner.ctx().bounds(bird).unwrap().left() > slingshot_right {
                break;
            }
        }

        let ctx = runner.ctx();
        assert!(ctx.bounds(bird).unwrap().left() > slingshot_right);
        assert_eq!(ctx.body_type(bird), Some(BodyType::Dynamic));
        assert_eq!(runner.game().score(), 0);
        // Launched at 300/s; only air drag slows it, nothing turns it back
        let vel = ctx.velocity(bird);
        assert!(vel.x > 200.0 && vel.x <= 300.0, "vx = {}", vel.x);
        assert!(vel.y > 0.0, "vy = {}", vel.y);
    }

    #[test]
    fn runner_resets_a_missed_shot() {
        let mut runner = GameRunner::new(PigShot::new(), 800.0, 600.0, 3);
        runner.init();
        // Pull far right of the rest point: the bird flies off the left edge
        runner.push_input(InputEvent::PointerDown { x: 150.0, y: 450.0 });
        runner.push_input(InputEvent::PointerMove { x: 350.0, y: 450.0 });
        runner.push_input(InputEvent::PointerUp { x: 350.0, y: 450.0 });
        for _ in 0..60 {
            runner.tick(1.0 / 60.0);
        }
        assert_eq!(runner.game().score(), -10);
        let bird = runner.game().bird().unwrap();
        assert_eq!(runner.ctx().body_type(bird), Some(BodyType::Fixed));
    }
}
