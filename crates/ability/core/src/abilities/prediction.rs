/// Opaque token correlating a client-initiated activation with its
/// authoritative resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionKey(pub(crate) u32);

impl PredictionKey {
    /// "No active correlation."
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NONE.0
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PredictionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_valid() {
            write!(f, "key#{}", self.0)
        } else {
            write!(f, "key#none")
        }
    }
}

/// Issues a fresh key per activation attempt. Never yields [`PredictionKey::NONE`].
#[derive(Clone, Debug, Default)]
pub struct PredictionKeyGenerator {
    last: u32,
}

impl PredictionKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> PredictionKey {
        self.last = self.last.wrapping_add(1);
        if self.last == PredictionKey::NONE.0 {
            self.last = 1;
        }
        PredictionKey(self.last)
    }
}
