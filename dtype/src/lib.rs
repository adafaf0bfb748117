//! Data types for the DLC kernel IR.
//!
//! A [`DType`] is a scalar kind plus a lane count. Lane counts above one describe
//! short vectors; the DLC printer renders them as `<scalar><lanes>` names.


/// Scalar data types (base numeric types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarDType {
    Bool,

    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    Float16,
    BFloat16,
    Float32,
    Float64,

    /// Void type for statements and calls without a value.
    Void,

    /// Opaque pointer/handle.
    Handle,
}

impl ScalarDType {
    pub const fn bits(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Handle => 64,
            Self::Void => 0,
        }
    }

    pub const fn bytes(&self) -> usize {
        self.bits().div_ceil(8)
    }

    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_uint(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }
}

/// Scalar kind plus lane count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DType {
    scalar: ScalarDType,
    lanes: usize,
}

impl DType {
    /// Create a dtype. A lane count of zero is normalized to one.
    pub const fn new(scalar: ScalarDType, lanes: usize) -> Self {
        Self { scalar, lanes: if lanes == 0 { 1 } else { lanes } }
    }

    pub const fn scalar(scalar: ScalarDType) -> Self {
        Self { scalar, lanes: 1 }
    }

    pub const fn base(&self) -> ScalarDType {
        self.scalar
    }

    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    pub const fn bits(&self) -> usize {
        self.scalar.bits()
    }

    /// Same scalar kind with a different lane count.
    pub const fn with_lanes(&self, lanes: usize) -> Self {
        Self::new(self.scalar, lanes)
    }

    pub const fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    pub const fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    pub const fn is_handle(&self) -> bool {
        matches!(self.scalar, ScalarDType::Handle)
    }

    pub const fn is_void(&self) -> bool {
        matches!(self.scalar, ScalarDType::Void)
    }

    pub const fn is_int(&self) -> bool {
        self.scalar.is_int()
    }

    pub const fn is_uint(&self) -> bool {
        self.scalar.is_uint()
    }

    pub const fn is_float(&self) -> bool {
        self.scalar.is_float()
    }

    pub const fn is_bool(&self) -> bool {
        self.scalar.is_bool()
    }

    pub const fn bytes(&self) -> usize {
        self.scalar.bytes() * self.lanes
    }
}

impl From<ScalarDType> for DType {
    fn from(scalar: ScalarDType) -> Self {
        Self::scalar(scalar)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.scalar.into();
        if self.lanes > 1 { write!(f, "{name}x{}", self.lanes) } else { f.write_str(name) }
    }
}

// Convenient constructors for common scalar types
impl DType {
    pub const fn bool_() -> Self {
        Self::scalar(ScalarDType::Bool)
    }
    pub const fn int8() -> Self {
        Self::scalar(ScalarDType::Int8)
    }
    pub const fn int16() -> Self {
        Self::scalar(ScalarDType::Int16)
    }
    pub const fn int32() -> Self {
        Self::scalar(ScalarDType::Int32)
    }
    pub const fn int64() -> Self {
        Self::scalar(ScalarDType::Int64)
    }
    pub const fn uint8() -> Self {
        Self::scalar(ScalarDType::UInt8)
    }
    pub const fn uint16() -> Self {
        Self::scalar(ScalarDType::UInt16)
    }
    pub const fn uint32() -> Self {
        Self::scalar(ScalarDType::UInt32)
    }
    pub const fn uint64() -> Self {
        Self::scalar(ScalarDType::UInt64)
    }
    pub const fn float16() -> Self {
        Self::scalar(ScalarDType::Float16)
    }
    pub const fn bfloat16() -> Self {
        Self::scalar(ScalarDType::BFloat16)
    }
    pub const fn float32() -> Self {
        Self::scalar(ScalarDType::Float32)
    }
    pub const fn float64() -> Self {
        Self::scalar(ScalarDType::Float64)
    }
    pub const fn void_() -> Self {
        Self::scalar(ScalarDType::Void)
    }
    pub const fn handle() -> Self {
        Self::scalar(ScalarDType::Handle)
    }
}
