//! DLC memory spaces.

/// Memory spaces addressable by DMA, keyed by their integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr, strum::FromRepr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum AddressSpace {
    Smem = 0,
    Hbm = 1,
    Vmem = 2,
    Cmem = 3,
    Imem = 4,
    Semaphore = 5,
}

impl AddressSpace {
    pub fn from_code(code: i64) -> Option<Self> {
        u8::try_from(code).ok().and_then(Self::from_repr)
    }

    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Symbolic name used by the DLC headers.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Symbolic name for known codes, the decimal literal otherwise.
    pub fn render_code(code: i64) -> String {
        Self::from_code(code).map_or_else(|| code.to_string(), |s| s.name().to_string())
    }
}
