//! Type checking for TSPP.
//!
//! Two passes over the top-level items:
//!
//! 1. **Collection** — every top-level class, enum, and interface is
//!    installed in the global scope as a named type, so type names resolve
//!    regardless of textual order.
//! 2. **Checking** — a recursive traversal computes a [`ResolvedType`] for
//!    every expression and reports mismatches. `Error` propagates without
//!    re-reporting, so one bad subexpression yields one diagnostic.
//!
//! The checker owns the parser's string interner (for rendering names in
//! messages) and the scope tree rooted at the built-in scope, which holds
//! only the primitive types.

pub mod scope;
pub mod ty;

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::diagnostics::ErrorReporter;
use crate::span::SourceLocation;
use scope::TypeScope;
use string_interner::DefaultStringInterner;
use ty::ResolvedType;

/// Convenience entry point: check a parsed program.
pub fn check_program(
    program: &Program,
    interner: DefaultStringInterner,
    reporter: &mut ErrorReporter,
) -> bool {
    TypeChecker::new(interner, reporter).check(program)
}

/// The TSPP type checker.
pub struct TypeChecker<'r> {
    reporter: &'r mut ErrorReporter,
    interner: DefaultStringInterner,
    scope: TypeScope,
    /// Return type of the function being checked; `None` at top level.
    current_return_type: Option<ResolvedType>,
}

impl<'r> TypeChecker<'r> {
    pub fn new(mut interner: DefaultStringInterner, reporter: &'r mut ErrorReporter) -> Self {
        let mut scope = TypeScope::new();

        // The built-in scope holds exactly the primitive types, under the
        // names the type renderer produces.
        let builtins = [
            ("void", ResolvedType::Void),
            ("int", ResolvedType::Int),
            ("float", ResolvedType::Float),
            ("boolean", ResolvedType::Bool),
            ("string", ResolvedType::String),
        ];
        for (name, ty) in builtins {
            let symbol = interner.get_or_intern(name);
            scope.declare_type(symbol, ty);
        }

        Self {
            reporter,
            interner,
            scope,
            current_return_type: None,
        }
    }

    /// Check a whole program. Returns `true` iff no error diagnostic has
    /// been recorded.
    pub fn check(&mut self, program: &Program) -> bool {
        // Pass 1: collect type declarations so order does not matter.
        for item in &program.items {
            if let Item::Declaration(decl) = item {
                let name = match &decl.kind {
                    DeclKind::Class(class) => Some(&class.name),
                    DeclKind::Enum(enumeration) => Some(&enumeration.name),
                    DeclKind::Interface(interface) => Some(&interface.name),
                    _ => None,
                };
                if let Some(name) = name {
                    if !self
                        .scope
                        .declare_type(name.symbol, ResolvedType::Named(name.symbol))
                    {
                        let text = self.text(name.symbol);
                        self.reporter.error(
                            name.location.clone(),
                            format!("Redeclaration of type '{}'", text),
                        );
                    }
                }
            }
        }

        // Pass 2: check everything else.
        for item in &program.items {
            match item {
                Item::Declaration(decl) => match &decl.kind {
                    DeclKind::Var(var) => {
                        self.visit_var_decl(var, &decl.location);
                    }
                    DeclKind::Function(function) => {
                        self.visit_function_decl(function);
                    }
                    // Collected in pass 1; bodies are not checked.
                    DeclKind::Class(_) | DeclKind::Enum(_) | DeclKind::Interface(_) => {}
                },
                Item::Statement(stmt) => {
                    self.visit_stmt(stmt);
                }
            }
        }

        !self.reporter.has_errors()
    }

    // ============================================================
    // Scope and reporting helpers
    // ============================================================

    fn enter_scope(&mut self) {
        self.scope = std::mem::take(&mut self.scope).child();
    }

    fn exit_scope(&mut self) {
        self.scope = std::mem::take(&mut self.scope)
            .into_parent()
            .unwrap_or_default();
    }

    fn error(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.reporter.error(location.clone(), message);
    }

    fn text(&self, symbol: Symbol) -> String {
        self.interner.resolve(symbol).unwrap_or("").to_string()
    }

    fn dotted(&self, segments: &[Symbol]) -> String {
        segments
            .iter()
            .map(|s| self.interner.resolve(*s).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `value` must be assignable into `target`; reports the mismatch.
    fn check_assignment_compatibility(
        &mut self,
        target: &ResolvedType,
        value: &ResolvedType,
        location: &SourceLocation,
    ) -> bool {
        if value.is_assignable_to(target) {
            return true;
        }
        let message = format!(
            "Cannot assign {} to {}",
            value.display(&self.interner),
            target.display(&self.interner)
        );
        self.error(location, message);
        false
    }

    // ============================================================
    // Declarations
    // ============================================================

    fn visit_var_decl(&mut self, var: &VarDecl, location: &SourceLocation) -> ResolvedType {
        let init_type = var.initializer.as_ref().map(|init| self.visit_expr(init));
        let declared_type = var.ty.as_ref().map(|ty| self.visit_type(ty));

        let var_type = match (declared_type, init_type) {
            (Some(declared), Some(init)) => {
                if !self.check_assignment_compatibility(&declared, &init, location) {
                    self.error(location, "Initializer type doesn't match variable type");
                    return ResolvedType::Error;
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init)) => init,
            (None, None) => {
                self.error(
                    location,
                    "Variable declaration needs either a type or an initializer for type inference",
                );
                return ResolvedType::Error;
            }
        };

        if !self
            .scope
            .declare_variable(var.name.symbol, var_type.clone())
        {
            let text = self.text(var.name.symbol);
            self.error(
                &var.name.location,
                format!("Redeclaration of '{}'", text),
            );
        }

        var_type
    }

    fn visit_function_decl(&mut self, function: &FunctionDecl) -> ResolvedType {
        self.enter_scope();

        // Generic parameters resolve as opaque named types inside the
        // function; their bounds must themselves resolve.
        if let Some(generics) = &function.generics {
            for param in &generics.params {
                if !self
                    .scope
                    .declare_type(param.symbol, ResolvedType::Named(param.symbol))
                {
                    let text = self.text(param.symbol);
                    self.error(
                        &param.location,
                        format!("Redeclaration of type '{}'", text),
                    );
                }
            }
            for constraint in &generics.constraints {
                self.visit_type(&constraint.bound);
            }
        }

        let return_type = match &function.return_type {
            Some(ty) => self.visit_type(ty),
            None => ResolvedType::Void,
        };

        for thrown in &function.throws {
            self.visit_type(thrown);
        }

        let mut param_types = Vec::new();
        for param in &function.params {
            let mut param_type = self.visit_type(&param.ty);
            if param.is_ref {
                param_type = ResolvedType::Reference(Box::new(param_type));
            }

            if let Some(default) = &param.default {
                let default_type = self.visit_expr(default);
                if !default_type.is_assignable_to(&param_type) {
                    self.error(
                        &param.location,
                        "Default value type doesn't match parameter type",
                    );
                }
            }

            if !self
                .scope
                .declare_variable(param.name.symbol, param_type.clone())
            {
                let text = self.text(param.name.symbol);
                self.error(
                    &param.name.location,
                    format!("Redeclaration of '{}'", text),
                );
            }
            param_types.push(param_type);
        }

        let function_type = ResolvedType::Function {
            return_type: Box::new(return_type.clone()),
            params: param_types,
        };

        // Visible inside its own body for recursion.
        self.scope
            .declare_function(function.name.symbol, function_type.clone());

        let saved_return = self.current_return_type.replace(return_type);
        if let Some(body) = &function.body {
            self.visit_block(body);
        }
        self.current_return_type = saved_return;

        self.exit_scope();

        // Install in the enclosing scope.
        if !self
            .scope
            .declare_function(function.name.symbol, function_type.clone())
        {
            let text = self.text(function.name.symbol);
            self.error(
                &function.name.location,
                format!("Redeclaration of '{}'", text),
            );
        }

        function_type
    }

    // ============================================================
    // Statements
    // ============================================================

    fn visit_block(&mut self, block: &Block) -> ResolvedType {
        self.enter_scope();
        for stmt in &block.statements {
            self.visit_stmt(stmt);
        }
        self.exit_scope();
        ResolvedType::Void
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> ResolvedType {
        match &stmt.kind {
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::Expr(expr) => {
                self.visit_expr(expr);
                ResolvedType::Void
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond_type = self.visit_expr(condition);
                if !cond_type.is_implicitly_convertible_to(&ResolvedType::Bool) {
                    self.error(
                        &condition.location,
                        "If condition must be convertible to boolean",
                    );
                }
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
                ResolvedType::Void
            }
            StmtKind::While { condition, body } => {
                let cond_type = self.visit_expr(condition);
                if !cond_type.is_implicitly_convertible_to(&ResolvedType::Bool) {
                    self.error(
                        &condition.location,
                        "While condition must be convertible to boolean",
                    );
                }
                self.visit_stmt(body);
                ResolvedType::Void
            }
            StmtKind::DoWhile { body, condition } => {
                self.visit_stmt(body);
                let cond_type = self.visit_expr(condition);
                if !cond_type.is_implicitly_convertible_to(&ResolvedType::Bool) {
                    self.error(
                        &condition.location,
                        "Do-while condition must be convertible to boolean",
                    );
                }
                ResolvedType::Void
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                self.enter_scope();
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(condition) = condition {
                    let cond_type = self.visit_expr(condition);
                    if !cond_type.is_implicitly_convertible_to(&ResolvedType::Bool) {
                        self.error(
                            &condition.location,
                            "For loop condition must be convertible to boolean",
                        );
                    }
                }
                if let Some(increment) = increment {
                    self.visit_expr(increment);
                }
                self.visit_stmt(body);
                self.exit_scope();
                ResolvedType::Void
            }
            StmtKind::ForOf {
                binding, iterable, body, ..
            } => {
                // TODO: constrain the iterable once an iterable protocol
                // exists; today any expression is accepted.
                let iterable_type = self.visit_expr(iterable);
                let binding_type = match iterable_type.element_type() {
                    Some(element) => element.clone(),
                    None => ResolvedType::Error,
                };

                self.enter_scope();
                self.scope.declare_variable(binding.symbol, binding_type);
                self.visit_stmt(body);
                self.exit_scope();
                ResolvedType::Void
            }
            StmtKind::Return(value) => {
                let returned = match value {
                    Some(value) => self.visit_expr(value),
                    None => ResolvedType::Void,
                };
                let expected = self
                    .current_return_type
                    .clone()
                    .unwrap_or(ResolvedType::Void);
                if !returned.is_assignable_to(&expected) {
                    self.error(
                        &stmt.location,
                        "Return value type doesn't match function return type",
                    );
                }
                ResolvedType::Void
            }
            StmtKind::Break(_) | StmtKind::Continue(_) => ResolvedType::Void,
            StmtKind::Switch { scrutinee, cases } => {
                let scrutinee_type = self.visit_expr(scrutinee);

                for case in cases {
                    if let Some(value) = &case.value {
                        let case_type = self.visit_expr(value);
                        if !case_type.is_assignable_to(&scrutinee_type) {
                            self.error(
                                &value.location,
                                "Case value type doesn't match switch expression type",
                            );
                        }
                    }

                    self.enter_scope();
                    for stmt in &case.body {
                        self.visit_stmt(stmt);
                    }
                    self.exit_scope();
                }
                ResolvedType::Void
            }
            StmtKind::Try {
                block,
                catch_clauses,
                finally_block,
            } => {
                self.visit_stmt(block);

                for clause in catch_clauses {
                    let param_type = match &clause.parameter_type {
                        Some(ty) => self.visit_type(ty),
                        None => ResolvedType::Error,
                    };
                    self.enter_scope();
                    self.scope
                        .declare_variable(clause.parameter.symbol, param_type);
                    self.visit_stmt(&clause.body);
                    self.exit_scope();
                }

                if let Some(finally_block) = finally_block {
                    self.visit_stmt(finally_block);
                }
                ResolvedType::Void
            }
            StmtKind::Throw(value) => {
                self.visit_expr(value);
                ResolvedType::Void
            }
            StmtKind::Assembly { .. } => ResolvedType::Void,
            StmtKind::Labeled { statement, .. } => {
                self.visit_stmt(statement);
                ResolvedType::Void
            }
            StmtKind::Decl(decl) => match &decl.kind {
                DeclKind::Var(var) => self.visit_var_decl(var, &decl.location),
                DeclKind::Function(function) => self.visit_function_decl(function),
                DeclKind::Class(class) => ResolvedType::Named(class.name.symbol),
                DeclKind::Enum(enumeration) => ResolvedType::Named(enumeration.name.symbol),
                DeclKind::Interface(interface) => ResolvedType::Named(interface.name.symbol),
            },
        }
    }

    // ============================================================
    // Expressions
    // ============================================================

    fn visit_expr(&mut self, expr: &Expr) -> ResolvedType {
        match &expr.kind {
            ExprKind::Literal(literal) => self.visit_literal(literal, &expr.location),
            ExprKind::Identifier(symbol) => {
                let found = self
                    .scope
                    .lookup_variable(*symbol)
                    .or_else(|| self.scope.lookup_function(*symbol))
                    .cloned();
                match found {
                    Some(ty) => ty,
                    None => {
                        let text = self.text(*symbol);
                        self.error(
                            &expr.location,
                            format!("Undefined identifier: {}", text),
                        );
                        ResolvedType::Error
                    }
                }
            }
            ExprKind::This => {
                self.error(&expr.location, "'this' is only valid inside class members");
                ResolvedType::Error
            }
            ExprKind::Binary { op, left, right } => {
                let left_type = self.visit_expr(left);
                let right_type = self.visit_expr(right);
                self.check_binary_op(*op, &left_type, &right_type, &expr.location)
            }
            ExprKind::Unary { op, operand, .. } => {
                let operand_type = self.visit_expr(operand);
                self.check_unary_op(*op, &operand_type, &expr.location)
            }
            ExprKind::Assign { op, target, value } => {
                let target_type = self.visit_expr(target);
                let value_type = self.visit_expr(value);

                if target_type.is_error() || value_type.is_error() {
                    return ResolvedType::Error;
                }

                match op.binary_op() {
                    None => {
                        if !self.check_assignment_compatibility(
                            &target_type,
                            &value_type,
                            &expr.location,
                        ) {
                            self.error(&expr.location, "Cannot assign incompatible type");
                            return ResolvedType::Error;
                        }
                    }
                    Some(binary) => {
                        let result = self.check_binary_op(
                            binary,
                            &target_type,
                            &value_type,
                            &expr.location,
                        );
                        if !result.is_assignable_to(&target_type) {
                            self.error(
                                &expr.location,
                                "Result of compound assignment is not assignable to target",
                            );
                            return ResolvedType::Error;
                        }
                    }
                }

                target_type
            }
            ExprKind::Call { callee, arguments } => {
                let callee_type = self.visit_expr(callee);
                if callee_type.is_error() {
                    return ResolvedType::Error;
                }

                let (Some(param_types), Some(return_type)) = (
                    callee_type.parameter_types().map(|p| p.to_vec()),
                    callee_type.return_type().cloned(),
                ) else {
                    self.error(&callee.location, "Cannot call non-function type");
                    return ResolvedType::Error;
                };

                if param_types.len() != arguments.len() {
                    self.error(&expr.location, "Wrong number of arguments");
                    return ResolvedType::Error;
                }

                for (argument, param_type) in arguments.iter().zip(&param_types) {
                    let argument_type = self.visit_expr(argument);
                    if !argument_type.is_assignable_to(param_type) {
                        self.error(&argument.location, "Argument type mismatch");
                    }
                }

                return_type
            }
            ExprKind::Member { object, .. } => {
                let object_type = self.visit_expr(object);
                if object_type.is_error() {
                    return ResolvedType::Error;
                }
                self.error(
                    &expr.location,
                    "Member access type checking not implemented",
                );
                ResolvedType::Error
            }
            ExprKind::Index { array, index } => {
                let array_type = self.visit_expr(array);
                let index_type = self.visit_expr(index);

                if array_type.is_error() {
                    return ResolvedType::Error;
                }

                let Some(element) = array_type.element_type().cloned() else {
                    self.error(&array.location, "Cannot index non-array type");
                    return ResolvedType::Error;
                };

                if !index_type.is_assignable_to(&ResolvedType::Int) {
                    self.error(&index.location, "Array index must be an integer");
                }

                element
            }
            ExprKind::New { path, arguments } => {
                let class_type = if path.len() == 1 {
                    self.scope.lookup_type(path[0].symbol).cloned()
                } else {
                    // Qualified class names have no home until modules exist.
                    None
                };

                let Some(class_type) = class_type else {
                    let name = self.dotted(&path.iter().map(|n| n.symbol).collect::<Vec<_>>());
                    self.error(&expr.location, format!("Undefined class: {}", name));
                    return ResolvedType::Error;
                };

                // Constructor arguments are checked as expressions only;
                // nothing binds constructors to classes yet.
                for argument in arguments {
                    self.visit_expr(argument);
                }

                class_type
            }
            ExprKind::Cast { target, expr: inner } => {
                let expr_type = self.visit_expr(inner);

                let Some(target_type) = self.scope.lookup_type(target.symbol).cloned() else {
                    let text = self.text(target.symbol);
                    self.error(&target.location, format!("Undefined type: {}", text));
                    return ResolvedType::Error;
                };

                if expr_type.is_error() {
                    return ResolvedType::Error;
                }

                if !expr_type.is_explicitly_convertible_to(&target_type) {
                    self.error(&expr.location, "Invalid cast");
                    return ResolvedType::Error;
                }

                target_type
            }
            ExprKind::ArrayLiteral(elements) => {
                if elements.is_empty() {
                    self.error(
                        &expr.location,
                        "Cannot determine type of empty array literal",
                    );
                    return ResolvedType::Error;
                }

                let element_type = self.visit_expr(&elements[0]);
                for element in &elements[1..] {
                    let next = self.visit_expr(element);
                    if !next.is_assignable_to(&element_type) {
                        self.error(
                            &element.location,
                            "Array elements must have compatible types",
                        );
                        return ResolvedType::Error;
                    }
                }

                ResolvedType::Array(Box::new(element_type))
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let cond_type = self.visit_expr(condition);
                if !cond_type.is_implicitly_convertible_to(&ResolvedType::Bool) {
                    self.error(
                        &condition.location,
                        "Conditional condition must be convertible to boolean",
                    );
                }

                let then_type = self.visit_expr(then_expr);
                let else_type = self.visit_expr(else_expr);

                if then_type.is_error() || else_type.is_error() {
                    return ResolvedType::Error;
                }
                if else_type.is_assignable_to(&then_type) {
                    then_type
                } else if then_type.is_assignable_to(&else_type) {
                    else_type
                } else {
                    self.error(
                        &expr.location,
                        "Conditional branches have incompatible types",
                    );
                    ResolvedType::Error
                }
            }
            ExprKind::CompileTime { kind, operand } => {
                let operand_type = self.visit_expr(operand);
                match kind {
                    CompileTimeKind::Sizeof | CompileTimeKind::Alignof => ResolvedType::Int,
                    CompileTimeKind::Typeof => ResolvedType::String,
                    CompileTimeKind::Constexpr => operand_type,
                }
            }
        }
    }

    fn visit_literal(&mut self, literal: &Literal, location: &SourceLocation) -> ResolvedType {
        match literal {
            Literal::Number(lexeme) => {
                if lexeme.contains('.') {
                    ResolvedType::Float
                } else {
                    ResolvedType::Int
                }
            }
            Literal::String(_) => ResolvedType::String,
            Literal::Bool(_) => ResolvedType::Bool,
            Literal::Char(_) | Literal::Null | Literal::Undefined => {
                self.error(location, "Unknown literal type");
                ResolvedType::Error
            }
        }
    }

    fn check_binary_op(
        &mut self,
        op: BinaryOp,
        left: &ResolvedType,
        right: &ResolvedType,
        location: &SourceLocation,
    ) -> ResolvedType {
        if left.is_error() || right.is_error() {
            return ResolvedType::Error;
        }

        if op.is_arithmetic() {
            if left.is_numeric() && right.is_numeric() {
                return if matches!(left, ResolvedType::Float)
                    || matches!(right, ResolvedType::Float)
                {
                    ResolvedType::Float
                } else {
                    ResolvedType::Int
                };
            }

            // `+` concatenates when either side is a string.
            if op == BinaryOp::Add
                && (matches!(left, ResolvedType::String) || matches!(right, ResolvedType::String))
            {
                return ResolvedType::String;
            }

            self.error(location, "Invalid operands for arithmetic operator");
            return ResolvedType::Error;
        }

        if op.is_comparison() {
            if left.is_assignable_to(right) || right.is_assignable_to(left) {
                return ResolvedType::Bool;
            }
            self.error(location, "Cannot compare incompatible types");
            return ResolvedType::Error;
        }

        if op.is_logical() {
            if left.is_implicitly_convertible_to(&ResolvedType::Bool)
                && right.is_implicitly_convertible_to(&ResolvedType::Bool)
            {
                return ResolvedType::Bool;
            }
            self.error(location, "Logical operators require boolean operands");
            return ResolvedType::Error;
        }

        // Bitwise operators (including shifts).
        if matches!(left, ResolvedType::Int) && matches!(right, ResolvedType::Int) {
            return ResolvedType::Int;
        }
        self.error(location, "Bitwise operators require integer operands");
        ResolvedType::Error
    }

    fn check_unary_op(
        &mut self,
        op: UnaryOp,
        operand: &ResolvedType,
        location: &SourceLocation,
    ) -> ResolvedType {
        if operand.is_error() {
            return ResolvedType::Error;
        }

        match op {
            UnaryOp::Plus | UnaryOp::Minus => {
                if operand.is_numeric() {
                    return operand.clone();
                }
                self.error(location, "Unary +/- requires numeric operand");
                ResolvedType::Error
            }
            UnaryOp::Not => {
                if operand.is_implicitly_convertible_to(&ResolvedType::Bool) {
                    return ResolvedType::Bool;
                }
                self.error(location, "Logical NOT requires boolean operand");
                ResolvedType::Error
            }
            UnaryOp::BitNot => {
                if matches!(operand, ResolvedType::Int) {
                    return ResolvedType::Int;
                }
                self.error(location, "Bitwise NOT requires integer operand");
                ResolvedType::Error
            }
            UnaryOp::Increment | UnaryOp::Decrement => {
                if operand.is_numeric() {
                    return operand.clone();
                }
                self.error(location, "Increment/decrement requires numeric operand");
                ResolvedType::Error
            }
            UnaryOp::AddressOf => ResolvedType::Pointer {
                pointee: Box::new(operand.clone()),
                is_unsafe: false,
            },
        }
    }

    // ============================================================
    // Type expressions
    // ============================================================

    fn visit_type(&mut self, ty: &TypeNode) -> ResolvedType {
        match &ty.kind {
            TypeKind::Primitive(primitive) => match primitive {
                PrimitiveType::Void => ResolvedType::Void,
                PrimitiveType::Int => ResolvedType::Int,
                PrimitiveType::Float => ResolvedType::Float,
                PrimitiveType::Bool => ResolvedType::Bool,
                PrimitiveType::String => ResolvedType::String,
            },
            TypeKind::Named(symbol) => match self.scope.lookup_type(*symbol).cloned() {
                Some(resolved) => resolved,
                None => {
                    let text = self.text(*symbol);
                    self.error(&ty.location, format!("Undefined type: {}", text));
                    ResolvedType::Error
                }
            },
            TypeKind::Qualified(segments) => {
                // Qualified names cannot resolve until module scopes exist.
                let name = self.dotted(segments);
                self.error(&ty.location, format!("Undefined type: {}", name));
                ResolvedType::Error
            }
            TypeKind::Array { element, size } => {
                let element_type = self.visit_type(element);

                if let Some(size) = size {
                    let size_type = self.visit_expr(size);
                    if !size_type.is_assignable_to(&ResolvedType::Int) {
                        self.error(&size.location, "Array size must be an integer");
                    }
                }

                ResolvedType::Array(Box::new(element_type))
            }
            TypeKind::Pointer {
                base,
                kind,
                alignment,
            } => {
                let pointee = self.visit_type(base);

                if let Some(alignment) = alignment {
                    let alignment_type = self.visit_expr(alignment);
                    if !alignment_type.is_assignable_to(&ResolvedType::Int) {
                        self.error(&alignment.location, "Alignment must be an integer");
                    }
                }

                ResolvedType::Pointer {
                    pointee: Box::new(pointee),
                    is_unsafe: *kind == PointerKind::Unsafe,
                }
            }
            TypeKind::Reference(base) => {
                let pointee = self.visit_type(base);
                ResolvedType::Reference(Box::new(pointee))
            }
            TypeKind::Function {
                params,
                return_type,
            } => {
                let return_type = self.visit_type(return_type);
                let params = params.iter().map(|p| self.visit_type(p)).collect();
                ResolvedType::Function {
                    return_type: Box::new(return_type),
                    params,
                }
            }
            TypeKind::Template { base, args } => {
                let base_type = self.visit_type(base);
                let args = args.iter().map(|a| self.visit_type(a)).collect();

                let Some(name) = base_type.name() else {
                    if !base_type.is_error() {
                        self.error(&base.location, "Template base type must be a named type");
                    }
                    return ResolvedType::Error;
                };

                ResolvedType::Template { name, args }
            }
            TypeKind::Smart { kind, pointee } => {
                let pointee = self.visit_type(pointee);
                ResolvedType::Smart {
                    pointee: Box::new(pointee),
                    kind: *kind,
                }
            }
            TypeKind::Union { left, right } => {
                let left = self.visit_type(left);
                let right = self.visit_type(right);
                ResolvedType::Union(Box::new(left), Box::new(right))
            }
        }
    }
}
