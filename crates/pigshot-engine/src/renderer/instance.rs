use bytemuck::{Pod, Zeroable};

/// Per-instance render data written to the shared buffer for the JS renderer.
/// Must match the JS protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// World-space rendered size in game units.
    pub size: f32,
    pub sprite_col: f32,
    pub sprite_row: f32,
    /// UV cell span (1.0 = single cell, 2.0 = 2x2 block).
    pub cell_span: f32,
    pub alpha: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
}

/// All sprite instances for one frame.
///
/// Instances `[0..atlas_split)` sample the game sprite atlas,
/// instances `[atlas_split..]` sample the font atlas.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
    pub atlas_split: u32,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            atlas_split: 0,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.atlas_split = 0;
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for shared-buffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_instance_is_8_floats() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), RenderInstance::FLOATS * 4);
    }

    #[test]
    fn clear_resets_split() {
        let mut buf = RenderBuffer::new();
        buf.push(RenderInstance::default());
        buf.atlas_split = 1;
        buf.clear();
        assert_eq!(buf.instance_count(), 0);
        assert_eq!(buf.atlas_split, 0);
    }
}
