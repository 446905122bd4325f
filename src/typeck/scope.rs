//! Nested lexical environments for the type checker.
//!
//! A scope holds three disjoint namespaces — variables, functions, and named
//! types — plus a parent pointer. Lookup walks outward; declaration always
//! targets the innermost scope, so inner declarations shadow outer ones
//! silently while redeclaring within one scope is refused.

use super::ty::ResolvedType;
use crate::ast::Symbol;
use std::collections::HashMap;

/// One lexical scope. Scopes form a tree rooted at the built-in scope.
#[derive(Debug, Default)]
pub struct TypeScope {
    variables: HashMap<Symbol, ResolvedType>,
    functions: HashMap<Symbol, ResolvedType>,
    types: HashMap<Symbol, ResolvedType>,
    parent: Option<Box<TypeScope>>,
}

impl TypeScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume this scope, making it the parent of a fresh child.
    pub fn child(self) -> TypeScope {
        TypeScope {
            parent: Some(Box::new(self)),
            ..TypeScope::default()
        }
    }

    /// Consume this scope and return its parent, dropping the child's
    /// bindings.
    pub fn into_parent(self) -> Option<TypeScope> {
        self.parent.map(|parent| *parent)
    }

    /// Declare a variable in this scope. Returns `false` when the name is
    /// already a variable of this scope.
    pub fn declare_variable(&mut self, name: Symbol, ty: ResolvedType) -> bool {
        if self.variables.contains_key(&name) {
            return false;
        }
        self.variables.insert(name, ty);
        true
    }

    /// Declare a function in this scope.
    pub fn declare_function(&mut self, name: Symbol, ty: ResolvedType) -> bool {
        if self.functions.contains_key(&name) {
            return false;
        }
        self.functions.insert(name, ty);
        true
    }

    /// Declare a named type in this scope.
    pub fn declare_type(&mut self, name: Symbol, ty: ResolvedType) -> bool {
        if self.types.contains_key(&name) {
            return false;
        }
        self.types.insert(name, ty);
        true
    }

    /// Find a variable here or in any enclosing scope.
    pub fn lookup_variable(&self, name: Symbol) -> Option<&ResolvedType> {
        match self.variables.get(&name) {
            Some(ty) => Some(ty),
            None => self.parent.as_ref()?.lookup_variable(name),
        }
    }

    /// Find a function here or in any enclosing scope.
    pub fn lookup_function(&self, name: Symbol) -> Option<&ResolvedType> {
        match self.functions.get(&name) {
            Some(ty) => Some(ty),
            None => self.parent.as_ref()?.lookup_function(name),
        }
    }

    /// Find a named type here or in any enclosing scope.
    pub fn lookup_type(&self, name: Symbol) -> Option<&ResolvedType> {
        match self.types.get(&name) {
            Some(ty) => Some(ty),
            None => self.parent.as_ref()?.lookup_type(name),
        }
    }
}
