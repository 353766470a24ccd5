use pigshot_engine::bridge::protocol::{
    HEADER_ATLAS_SPLIT, HEADER_EVENT_COUNT, HEADER_FLOATS, HEADER_FRAME_COUNTER,
    HEADER_INSTANCE_COUNT, HEADER_MAX_EVENTS, HEADER_MAX_INSTANCES, HEADER_WORLD_HEIGHT,
    HEADER_WORLD_WIDTH,
};
use pigshot_engine::systems::render::build_render_buffer;
use pigshot_engine::{
    AssetManifest, DragTracker, EngineContext, FixedTimestep, Game, GameConfig, InputEvent,
    InputQueue, ProtocolLayout, RenderBuffer, SpriteRegistry,
};

/// Generic host loop that owns one game and its engine context.
///
/// Each concrete game creates a `thread_local!` GameRunner through
/// `export_game!`, because wasm-bindgen cannot export generic structs directly.
/// Nothing here touches the browser, so the loop runs natively under test.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    drag: DragTracker,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    frame: u32,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    /// Build a runner for a viewport of `width × height` world units.
    pub fn new(game: G, width: f32, height: f32, seed: u64) -> Self {
        let config = game.config().with_viewport(width, height).with_seed(seed);
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);
        let render_buffer = RenderBuffer::with_capacity(config.max_instances);

        Self {
            ctx: EngineContext::new(&config),
            game,
            input: InputQueue::new(),
            drag: DragTracker::new(),
            render_buffer,
            timestep,
            layout,
            config,
            header: [0.0; HEADER_FLOATS],
            frame: 0,
            initialized: false,
        }
    }

    /// Install named sprites before `init`. A bad manifest is logged and ignored.
    pub fn load_manifest(&mut self, json: &str) {
        if json.trim().is_empty() {
            return;
        }
        match AssetManifest::from_json(json) {
            Ok(manifest) => {
                self.ctx.sprites = SpriteRegistry::from_manifest(&manifest);
                log::info!("manifest loaded: {} sprites", self.ctx.sprites.len());
            }
            Err(err) => log::warn!("ignoring asset manifest: {}", err),
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
        self.write_header();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one rendered frame.
    ///
    /// Pointer events are dispatched first as drag callbacks. Then, per fixed
    /// step: `Game::update`, physics step, and each collision start of that step.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        for event in self.input.drain() {
            if let Some(drag) = self.drag.handle(event, &self.ctx.scene) {
                self.game.on_drag(&mut self.ctx, drag);
            }
        }

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.step();
        }

        build_render_buffer(
            self.ctx.scene.iter(),
            &mut self.render_buffer,
            self.config.max_instances,
        );
        self.ctx.events.truncate(self.config.max_events);

        self.frame = self.frame.wrapping_add(1);
        self.write_header();
    }

    fn step(&mut self) {
        self.game.update(&mut self.ctx);
        self.ctx.step_physics();
        for pair in self.ctx.take_collisions() {
            if pair.started {
                self.game.on_collision_start(&mut self.ctx, pair);
            }
        }
    }

    fn write_header(&mut self) {
        let h = &mut self.header;
        h[HEADER_FRAME_COUNTER] = self.frame as f32;
        h[HEADER_MAX_INSTANCES] = self.layout.max_instances as f32;
        h[HEADER_INSTANCE_COUNT] = self.render_buffer.instance_count() as f32;
        h[HEADER_ATLAS_SPLIT] = self.render_buffer.atlas_split as f32;
        h[HEADER_WORLD_WIDTH] = self.config.world_width;
        h[HEADER_WORLD_HEIGHT] = self.config.world_height;
        h[HEADER_MAX_EVENTS] = self.layout.max_events as f32;
        h[HEADER_EVENT_COUNT] = self.ctx.events.len() as f32;
    }

    // ---- Accessors ----

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn ctx(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    // ---- Pointer accessors for shared-buffer reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
