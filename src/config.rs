//! Configuration for pointer sampling

/// Configuration descriptor for a [`PointerSampler`](crate::PointerSampler)
#[derive(Debug, Clone)]
pub struct PointerSamplerDesc {
    /// Hits closer than this distance along the pick ray are ignored
    pub near: f32,
    /// Hits farther than this distance along the pick ray are ignored
    pub far: f32,
    /// Identifies the pointer in log output when several samplers share a dispatcher
    pub pointer_id: u32,
}

impl Default for PointerSamplerDesc {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f32::INFINITY,
            pointer_id: 0,
        }
    }
}

impl PointerSamplerDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn near(mut self, near: f32) -> Self {
        self.near = near;
        self
    }

    pub fn far(mut self, far: f32) -> Self {
        self.far = far;
        self
    }

    pub fn pointer_id(mut self, id: u32) -> Self {
        self.pointer_id = id;
        self
    }
}
