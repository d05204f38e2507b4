/// Core configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// Level used by [`crate::EffectEngine::make_spec`] callers that have no
    /// level of their own (startup effects, environment damage).
    pub default_effect_level: f32,

    /// Re-clamp attributes paired to a max attribute whenever that max changes.
    pub reclamp_on_max_change: bool,

    /// Emit a `debug` record for every tag registration.
    pub log_tag_registration: bool,
}

impl CoreConfig {
    // ===== compile-time constants used as type parameters =====
    /// Live instances tracked per ability spec (per-execution instancing).
    pub const MAX_INSTANCES_PER_SPEC: usize = 4;
    /// Dynamic tags carried by a single ability spec (input tag + status tags).
    pub const MAX_SPEC_TAGS: usize = 8;
    /// Deepest tag hierarchy accepted by the registry (`A.B.C.D.E.F`).
    pub const MAX_TAG_DEPTH: usize = 6;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_EFFECT_LEVEL: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            default_effect_level: Self::DEFAULT_EFFECT_LEVEL,
            reclamp_on_max_change: true,
            log_tag_registration: true,
        }
    }

    pub fn with_default_effect_level(mut self, level: f32) -> Self {
        self.default_effect_level = level;
        self
    }

    pub fn with_reclamp_on_max_change(mut self, enabled: bool) -> Self {
        self.reclamp_on_max_change = enabled;
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
