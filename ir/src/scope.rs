//! Storage scope side table.
//!
//! Scopes are assigned by upstream passes; the backend only reads them.

use std::collections::HashMap;

use crate::function::PrimFunc;
use crate::stmt::Stmt;
use crate::var::{Var, VarId};

pub const GLOBAL: &str = "global";
pub const LOCAL: &str = "local";
pub const VMEM: &str = "vmem";
pub const SHARED: &str = "shared";
pub const SEMAPHORE: &str = "semaphore";
pub const GRID_CONSTANT: &str = "grid_constant";

/// Variable -> storage scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: HashMap<VarId, String>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: &Var, scope: impl Into<String>) {
        self.scopes.insert(var.id, scope.into());
    }

    pub fn get(&self, var: &Var) -> Option<&str> {
        self.scopes.get(&var.id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Seed a table from the pointer annotations of `func`'s parameters and
    /// allocated buffers.
    pub fn from_annotations(func: &PrimFunc) -> Self {
        let mut table = Self::new();
        for param in &func.params {
            if let Some(scope) = param.annotated_scope() {
                table.insert(param, scope);
            }
        }
        table.collect_allocations(&func.body);
        table
    }

    fn collect_allocations(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Allocate { buffer, body, .. } => {
                if let Some(scope) = buffer.annotated_scope() {
                    self.insert(buffer, scope);
                }
                self.collect_allocations(body);
            }
            Stmt::Attr { body, .. } | Stmt::For { body, .. } | Stmt::LetStmt { body, .. } => {
                self.collect_allocations(body)
            }
            Stmt::Seq(stmts) => stmts.iter().for_each(|s| self.collect_allocations(s)),
            Stmt::IfThenElse { then_case, else_case, .. } => {
                self.collect_allocations(then_case);
                if let Some(else_case) = else_case {
                    self.collect_allocations(else_case);
                }
            }
            Stmt::Evaluate(_) | Stmt::BufferStore { .. } => {}
        }
    }
}
