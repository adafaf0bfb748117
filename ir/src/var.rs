//! Variables and their annotations.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dlc_dtype::DType;

/// Process-wide variable identity.
pub type VarId = u64;

static VAR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_var_id() -> VarId {
    VAR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Pointer type annotation carried by handle variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointerType {
    /// Type of the pointed-to elements.
    pub element: DType,
    /// Storage scope tag, e.g. `global`, `local`, `shared`, `grid_constant`.
    pub storage_scope: String,
}

impl PointerType {
    pub fn new(element: DType, storage_scope: impl Into<String>) -> Self {
        Self { element, storage_scope: storage_scope.into() }
    }
}

/// A variable. Two variables are the same iff their ids are equal.
#[derive(Debug)]
pub struct Var {
    pub id: VarId,
    pub name: String,
    pub dtype: DType,
    pub annotation: Option<PointerType>,
}

impl Var {
    /// Scalar (or plain handle) variable.
    pub fn new(name: impl Into<String>, dtype: DType) -> Arc<Self> {
        Arc::new(Self { id: next_var_id(), name: name.into(), dtype, annotation: None })
    }

    /// Handle variable annotated as a pointer to `element` in `scope`.
    pub fn pointer(name: impl Into<String>, element: DType, scope: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: next_var_id(),
            name: name.into(),
            dtype: DType::handle(),
            annotation: Some(PointerType::new(element, scope)),
        })
    }

    pub fn is_handle(&self) -> bool {
        self.dtype.is_handle()
    }

    /// Storage scope from the pointer annotation, if any.
    pub fn annotated_scope(&self) -> Option<&str> {
        self.annotation.as_ref().map(|p| p.storage_scope.as_str())
    }

    /// Element type from the pointer annotation, if any.
    pub fn element_type(&self) -> Option<DType> {
        self.annotation.as_ref().map(|p| p.element)
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Loop/thread iteration variable attached to a thread-extent marker.
#[derive(Debug, Clone)]
pub struct IterVar {
    pub var: Arc<Var>,
    /// Thread binding tag such as `blockIdx.x`; empty when unbound.
    pub thread_tag: String,
}

impl IterVar {
    pub fn new(var: Arc<Var>, thread_tag: impl Into<String>) -> Self {
        Self { var, thread_tag: thread_tag.into() }
    }
}
