//! The resolved-type lattice.
//!
//! A [`ResolvedType`] is the semantic type the checker computes for every
//! expression, distinct from the syntactic [`crate::ast::TypeNode`].
//! `Error` is a bottom-like sentinel: it is assignable to and from
//! everything, which keeps one bad subexpression from cascading into a
//! storm of follow-on diagnostics.
//!
//! Equality is structural and kind-sensitive; union equivalence is
//! order-insensitive (`A | B ≡ B | A`).

use crate::ast::{SmartKind, Symbol};
use string_interner::DefaultStringInterner;

#[derive(Debug, Clone)]
pub enum ResolvedType {
    Void,
    Int,
    Float,
    Bool,
    String,
    /// Sentinel for failed resolution; suppresses cascading diagnostics.
    Error,
    Named(Symbol),
    Array(Box<ResolvedType>),
    Pointer {
        pointee: Box<ResolvedType>,
        is_unsafe: bool,
    },
    Reference(Box<ResolvedType>),
    Function {
        return_type: Box<ResolvedType>,
        params: Vec<ResolvedType>,
    },
    Union(Box<ResolvedType>, Box<ResolvedType>),
    Smart {
        pointee: Box<ResolvedType>,
        kind: SmartKind,
    },
    Template {
        name: Symbol,
        args: Vec<ResolvedType>,
    },
}

impl PartialEq for ResolvedType {
    fn eq(&self, other: &Self) -> bool {
        use ResolvedType::*;
        match (self, other) {
            (Void, Void) | (Int, Int) | (Float, Float) | (Bool, Bool) | (String, String)
            | (Error, Error) => true,
            (Named(a), Named(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (
                Pointer {
                    pointee: a,
                    is_unsafe: ua,
                },
                Pointer {
                    pointee: b,
                    is_unsafe: ub,
                },
            ) => ua == ub && a == b,
            (Reference(a), Reference(b)) => a == b,
            (
                Function {
                    return_type: ra,
                    params: pa,
                },
                Function {
                    return_type: rb,
                    params: pb,
                },
            ) => ra == rb && pa == pb,
            // Union equivalence is order-insensitive.
            (Union(a1, a2), Union(b1, b2)) => {
                (a1 == b1 && a2 == b2) || (a1 == b2 && a2 == b1)
            }
            (
                Smart {
                    pointee: a,
                    kind: ka,
                },
                Smart {
                    pointee: b,
                    kind: kb,
                },
            ) => ka == kb && a == b,
            (
                Template { name: na, args: aa },
                Template { name: nb, args: ab },
            ) => na == nb && aa == ab,
            _ => false,
        }
    }
}

impl Eq for ResolvedType {}

impl ResolvedType {
    pub fn is_error(&self) -> bool {
        matches!(self, ResolvedType::Error)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ResolvedType::Int | ResolvedType::Float)
    }

    /// Element type of an array.
    pub fn element_type(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Pointee of a pointer, reference, or smart pointer.
    pub fn pointee_type(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::Pointer { pointee, .. }
            | ResolvedType::Reference(pointee)
            | ResolvedType::Smart { pointee, .. } => Some(pointee),
            _ => None,
        }
    }

    /// Return type of a function.
    pub fn return_type(&self) -> Option<&ResolvedType> {
        match self {
            ResolvedType::Function { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    /// Parameter types of a function.
    pub fn parameter_types(&self) -> Option<&[ResolvedType]> {
        match self {
            ResolvedType::Function { params, .. } => Some(params),
            _ => None,
        }
    }

    /// The name of a named or template type.
    pub fn name(&self) -> Option<Symbol> {
        match self {
            ResolvedType::Named(name) | ResolvedType::Template { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Whether `self` may be stored into a location of type `target`.
    ///
    /// Structural, reflexive, covariant in function returns and invariant in
    /// parameters. `Error` is assignable to and from everything. A value
    /// converts to a union when it converts to either arm; a union converts
    /// out only when both arms do.
    pub fn is_assignable_to(&self, target: &ResolvedType) -> bool {
        if self.is_error() || target.is_error() {
            return true;
        }
        if self == target {
            return true;
        }

        if let ResolvedType::Union(left, right) = target {
            if self.is_assignable_to(left) || self.is_assignable_to(right) {
                return true;
            }
        }
        if let ResolvedType::Union(left, right) = self {
            return left.is_assignable_to(target) && right.is_assignable_to(target);
        }

        if let (
            ResolvedType::Function {
                return_type: self_ret,
                params: self_params,
            },
            ResolvedType::Function {
                return_type: target_ret,
                params: target_params,
            },
        ) = (self, target)
        {
            return self_params == target_params && self_ret.is_assignable_to(target_ret);
        }

        false
    }

    /// Conversions applied without syntax: numeric widening (`int -> float`)
    /// and dereference of a reference to its pointee. Named types convert
    /// only to themselves.
    pub fn is_implicitly_convertible_to(&self, target: &ResolvedType) -> bool {
        if self.is_assignable_to(target) {
            return true;
        }
        if matches!(self, ResolvedType::Int) && matches!(target, ResolvedType::Float) {
            return true;
        }
        if let ResolvedType::Reference(pointee) = self {
            return pointee.is_implicitly_convertible_to(target);
        }
        false
    }

    /// Conversions requiring a `cast`: narrowing (`float -> int`),
    /// numeric/boolean reinterpretation, and pointer casts between
    /// compatible pointees.
    pub fn is_explicitly_convertible_to(&self, target: &ResolvedType) -> bool {
        if self.is_implicitly_convertible_to(target) {
            return true;
        }

        match (self, target) {
            (ResolvedType::Float, ResolvedType::Int) => true,
            (ResolvedType::Int, ResolvedType::Bool)
            | (ResolvedType::Bool, ResolvedType::Int)
            | (ResolvedType::Float, ResolvedType::Bool)
            | (ResolvedType::Bool, ResolvedType::Float) => true,
            (
                ResolvedType::Pointer {
                    pointee: from_pointee,
                    ..
                },
                ResolvedType::Pointer {
                    pointee: to_pointee,
                    ..
                },
            ) => from_pointee == to_pointee || (from_pointee.is_numeric() && to_pointee.is_numeric()),
            _ => false,
        }
    }

    /// Render the type for diagnostics.
    pub fn display(&self, interner: &DefaultStringInterner) -> std::string::String {
        match self {
            ResolvedType::Void => "void".into(),
            ResolvedType::Int => "int".into(),
            ResolvedType::Float => "float".into(),
            ResolvedType::Bool => "boolean".into(),
            ResolvedType::String => "string".into(),
            ResolvedType::Error => "<error>".into(),
            ResolvedType::Named(name) => interner.resolve(*name).unwrap_or("<unknown>").into(),
            ResolvedType::Array(element) => format!("{}[]", element.display(interner)),
            ResolvedType::Pointer { pointee, is_unsafe } => {
                if *is_unsafe {
                    format!("{}@unsafe", pointee.display(interner))
                } else {
                    format!("{}@", pointee.display(interner))
                }
            }
            ResolvedType::Reference(pointee) => format!("{}&", pointee.display(interner)),
            ResolvedType::Function {
                return_type,
                params,
            } => {
                let params = params
                    .iter()
                    .map(|p| p.display(interner))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({}) -> {}", params, return_type.display(interner))
            }
            ResolvedType::Union(left, right) => {
                format!("{} | {}", left.display(interner), right.display(interner))
            }
            ResolvedType::Smart { pointee, kind } => {
                format!("#{}<{}>", kind.as_str(), pointee.display(interner))
            }
            ResolvedType::Template { name, args } => {
                let args = args
                    .iter()
                    .map(|a| a.display(interner))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{}<{}>",
                    interner.resolve(*name).unwrap_or("<unknown>"),
                    args
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> ResolvedType {
        ResolvedType::Int
    }

    fn float() -> ResolvedType {
        ResolvedType::Float
    }

    fn array(elt: ResolvedType) -> ResolvedType {
        ResolvedType::Array(Box::new(elt))
    }

    fn union(a: ResolvedType, b: ResolvedType) -> ResolvedType {
        ResolvedType::Union(Box::new(a), Box::new(b))
    }

    fn func(ret: ResolvedType, params: Vec<ResolvedType>) -> ResolvedType {
        ResolvedType::Function {
            return_type: Box::new(ret),
            params,
        }
    }

    #[test]
    fn assignability_is_reflexive() {
        let samples = [
            ResolvedType::Void,
            int(),
            float(),
            ResolvedType::Bool,
            ResolvedType::String,
            ResolvedType::Error,
            array(int()),
            union(int(), ResolvedType::String),
            func(int(), vec![float()]),
            ResolvedType::Reference(Box::new(int())),
        ];
        for ty in &samples {
            assert!(ty.is_assignable_to(ty), "{:?} not reflexive", ty);
        }
    }

    #[test]
    fn error_is_a_universal_neighbour() {
        let err = ResolvedType::Error;
        assert!(err.is_assignable_to(&int()));
        assert!(int().is_assignable_to(&err));
        assert!(err.is_implicitly_convertible_to(&ResolvedType::Bool));
        assert!(ResolvedType::String.is_explicitly_convertible_to(&err));
    }

    #[test]
    fn union_equivalence_is_order_insensitive() {
        assert_eq!(
            union(int(), ResolvedType::String),
            union(ResolvedType::String, int())
        );
        assert_ne!(union(int(), ResolvedType::String), union(int(), float()));
    }

    #[test]
    fn value_converts_into_union_arm() {
        let u = union(int(), ResolvedType::String);
        assert!(int().is_assignable_to(&u));
        assert!(ResolvedType::String.is_assignable_to(&u));
        assert!(!ResolvedType::Bool.is_assignable_to(&u));
    }

    #[test]
    fn union_converts_out_only_when_both_arms_do() {
        let u = union(int(), int());
        assert!(u.is_assignable_to(&int()));
        let mixed = union(int(), ResolvedType::String);
        assert!(!mixed.is_assignable_to(&int()));
    }

    #[test]
    fn function_return_is_covariant_params_invariant() {
        // Returning into a union supertype is fine.
        let narrow = func(int(), vec![int()]);
        let wide = func(union(int(), ResolvedType::String), vec![int()]);
        assert!(narrow.is_assignable_to(&wide));
        assert!(!wide.is_assignable_to(&narrow));

        // Parameter lists must match exactly.
        let other_params = func(int(), vec![float()]);
        assert!(!narrow.is_assignable_to(&other_params));
    }

    #[test]
    fn numeric_widening_is_implicit_only() {
        assert!(int().is_implicitly_convertible_to(&float()));
        assert!(!float().is_implicitly_convertible_to(&int()));
        assert!(float().is_explicitly_convertible_to(&int()));
    }

    #[test]
    fn reference_dereferences_implicitly() {
        let r = ResolvedType::Reference(Box::new(ResolvedType::Bool));
        assert!(r.is_implicitly_convertible_to(&ResolvedType::Bool));
        let r_int = ResolvedType::Reference(Box::new(int()));
        assert!(r_int.is_implicitly_convertible_to(&float()));
    }

    #[test]
    fn numeric_bool_casts_are_explicit_only() {
        assert!(!int().is_implicitly_convertible_to(&ResolvedType::Bool));
        assert!(int().is_explicitly_convertible_to(&ResolvedType::Bool));
        assert!(ResolvedType::Bool.is_explicitly_convertible_to(&float()));
    }

    #[test]
    fn pointer_casts_require_compatible_pointees() {
        let safe_int = ResolvedType::Pointer {
            pointee: Box::new(int()),
            is_unsafe: false,
        };
        let unsafe_int = ResolvedType::Pointer {
            pointee: Box::new(int()),
            is_unsafe: true,
        };
        let unsafe_float = ResolvedType::Pointer {
            pointee: Box::new(float()),
            is_unsafe: true,
        };
        let string_ptr = ResolvedType::Pointer {
            pointee: Box::new(ResolvedType::String),
            is_unsafe: false,
        };

        assert!(safe_int.is_explicitly_convertible_to(&unsafe_int));
        assert!(safe_int.is_explicitly_convertible_to(&unsafe_float));
        assert!(!safe_int.is_explicitly_convertible_to(&string_ptr));
        assert!(!safe_int.is_implicitly_convertible_to(&unsafe_int));
    }

    #[test]
    fn array_elements_are_invariant() {
        assert!(!array(int()).is_assignable_to(&array(float())));
        assert!(array(int()).is_assignable_to(&array(int())));
    }
}
