//! Declaration parsing.
//!
//! Declarations open with any access modifiers, at most one storage class,
//! and any number of attributes, followed by the head keyword: `let`,
//! `const`, `function`, `class`, `interface`, or `enum`. Class bodies have
//! their own member dispatch and member-level recovery so one bad member
//! does not abort the class.

use super::Parser;
use crate::ast::*;
use crate::lexer::TokenKind;
use crate::span::SourceLocation;

impl<'r> Parser<'r> {
    /// Parse one declaration, attributes and all.
    pub fn parse_declaration(&mut self) -> Option<Decl> {
        let location = self.peek_location();

        let (attributes, storage) = self.parse_attribute_list()?;

        let kind = if self.matches(TokenKind::Let) {
            DeclKind::Var(self.parse_var_decl(false, storage)?)
        } else if self.matches(TokenKind::Const) {
            DeclKind::Var(self.parse_var_decl(true, storage)?)
        } else if self.matches(TokenKind::Function) {
            let modifiers = fn_modifiers_from(&attributes, self);
            DeclKind::Function(self.parse_function_decl(modifiers)?)
        } else if self.matches(TokenKind::Class) {
            let modifiers = class_modifiers_from(&attributes, self);
            DeclKind::Class(self.parse_class_decl(modifiers)?)
        } else if self.matches(TokenKind::Interface) {
            DeclKind::Interface(self.parse_interface_decl()?)
        } else if self.matches(TokenKind::Enum) {
            DeclKind::Enum(self.parse_enum_decl()?)
        } else {
            self.error("Expected declaration");
            return None;
        };

        Some(Decl {
            kind,
            attributes,
            location,
        })
    }

    /// Collect leading attributes, splitting out the storage class. At most
    /// one storage class is accepted.
    fn parse_attribute_list(&mut self) -> Option<(Vec<Attribute>, StorageClass)> {
        let mut attributes = Vec::new();
        let mut storage = StorageClass::None;

        while self.check(TokenKind::Attribute) {
            let token = self.tokens.advance();
            let location = token.location.clone();

            let parsed_storage = match token.lexeme.as_str() {
                "#stack" => Some(StorageClass::Stack),
                "#heap" => Some(StorageClass::Heap),
                "#static" => Some(StorageClass::Static),
                _ => None,
            };

            if let Some(parsed) = parsed_storage {
                if storage != StorageClass::None {
                    self.error_at(location, "Multiple storage class specifiers");
                } else {
                    storage = parsed;
                }
                continue;
            }

            attributes.push(self.parse_attribute_tail(&token.lexeme, location)?);
        }

        Some((attributes, storage))
    }

    /// The attribute token has been consumed; parse its optional argument.
    /// The stored name drops the leading `#`.
    fn parse_attribute_tail(
        &mut self,
        lexeme: &str,
        location: SourceLocation,
    ) -> Option<Attribute> {
        let name_text = lexeme.strip_prefix('#').unwrap_or(lexeme).to_string();
        let symbol = self.intern(&name_text);
        let name = Name::new(symbol, location.clone());

        let argument = if self.matches(TokenKind::LParen) {
            let argument = self.parse_expression()?;
            if !self.consume(TokenKind::RParen, "Expected ')' after attribute argument") {
                return None;
            }
            Some(argument)
        } else {
            None
        };

        Some(Attribute {
            name,
            argument,
            location,
        })
    }

    // ============================================================
    // Variables
    // ============================================================

    /// `(let|const) name (: type)? (= expr)? ;`
    pub(super) fn parse_var_decl(
        &mut self,
        is_const: bool,
        storage: StorageClass,
    ) -> Option<VarDecl> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected variable name");
            return None;
        }
        let name = self.name_from_previous();

        let ty = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let initializer = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else if is_const {
            self.error("Const declarations must have an initializer");
            return None;
        } else {
            None
        };

        if !self.consume(
            TokenKind::Semicolon,
            "Expected ';' after variable declaration",
        ) {
            return None;
        }

        Some(VarDecl {
            name,
            ty,
            initializer,
            storage,
            is_const,
        })
    }

    // ============================================================
    // Functions
    // ============================================================

    /// `function name <T, U>? (where T : Bound, ...)? (params) (: ret)?
    /// (throws T, ...)? ({ body } | ;)`
    fn parse_function_decl(&mut self, modifiers: Vec<FnModifier>) -> Option<FunctionDecl> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected function name");
            return None;
        }
        let name = self.name_from_previous();

        let mut generics = if self.matches(TokenKind::Lt) {
            Some(self.parse_generic_params()?)
        } else {
            None
        };

        if self.matches(TokenKind::Where) {
            match generics.as_mut() {
                Some(generics) => self.parse_where_clauses(generics)?,
                None => {
                    self.error("'where' clause on a non-generic function");
                    return None;
                }
            }
        }

        if !self.consume(TokenKind::LParen, "Expected '(' after function name") {
            return None;
        }
        let params = self.parse_parameter_list()?;

        let return_type = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let throws = self.parse_throws_clause()?;

        let body = if self.matches(TokenKind::Semicolon) {
            None
        } else {
            if !self.consume(TokenKind::LBrace, "Expected '{' before function body") {
                return None;
            }
            Some(self.parse_block()?)
        };

        Some(FunctionDecl {
            name,
            generics,
            params,
            return_type,
            throws,
            modifiers,
            body,
        })
    }

    /// `T (extends Bound (& Bound)*)? (, ...)* >` — the `<` has been
    /// consumed. Extends-style bounds become constraint pairs.
    fn parse_generic_params(&mut self) -> Option<GenericParams> {
        let mut params = Vec::new();
        let mut constraints = Vec::new();

        loop {
            if !self.matches(TokenKind::Identifier) {
                self.error("Expected generic parameter name");
                return None;
            }
            let param = self.name_from_previous();

            if self.matches(TokenKind::Extends) {
                let bound = self.parse_primary_type()?;
                constraints.push(Constraint {
                    param: param.clone(),
                    bound,
                });
                while self.matches(TokenKind::And) {
                    let bound = self.parse_primary_type()?;
                    constraints.push(Constraint {
                        param: param.clone(),
                        bound,
                    });
                }
            }

            params.push(param);

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        if !self.consume(TokenKind::Gt, "Expected '>' after generic parameters") {
            return None;
        }

        Some(GenericParams {
            params,
            constraints,
        })
    }

    /// `where T : Bound (, U : Bound)*` — the `where` has been consumed.
    /// Constraints must name declared generic parameters.
    fn parse_where_clauses(&mut self, generics: &mut GenericParams) -> Option<()> {
        loop {
            if !self.matches(TokenKind::Identifier) {
                self.error("Expected generic parameter name in 'where' clause");
                return None;
            }
            let param = self.name_from_previous();

            if !generics.params.iter().any(|p| p.symbol == param.symbol) {
                let text = self.resolve(param.symbol).to_string();
                self.error_at(
                    param.location.clone(),
                    format!("Unknown generic parameter '{}' in constraint", text),
                );
                return None;
            }

            if !self.consume(TokenKind::Colon, "Expected ':' after constraint parameter") {
                return None;
            }
            let bound = self.parse_primary_type()?;
            generics.constraints.push(Constraint { param, bound });

            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        Some(())
    }

    /// `throws T (, T)*`, if present.
    fn parse_throws_clause(&mut self) -> Option<Vec<TypeNode>> {
        let mut throws = Vec::new();
        if self.matches(TokenKind::Throws) {
            loop {
                throws.push(self.parse_type()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        Some(throws)
    }

    /// Parameters up to the `)`, which is consumed.
    fn parse_parameter_list(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();

        if self.matches(TokenKind::RParen) {
            return Some(params);
        }

        loop {
            params.push(self.parse_parameter()?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }

        if !self.consume(TokenKind::RParen, "Expected ')' after parameters") {
            return None;
        }

        Some(params)
    }

    /// `ref? const? name : type (= default)?`
    fn parse_parameter(&mut self) -> Option<Param> {
        let location = self.peek_location();

        let is_ref = self.matches(TokenKind::Ref);
        let is_const = self.matches(TokenKind::Const);

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected parameter name");
            return None;
        }
        let name = self.name_from_previous();

        if !self.consume(TokenKind::Colon, "Expected ':' after parameter name") {
            return None;
        }
        let ty = self.parse_type()?;

        // The reference is implicit for `ref` parameters; the declared type
        // must not add another one.
        if is_ref && matches!(ty.kind, TypeKind::Reference(_)) {
            self.error_at(
                ty.location.clone(),
                "Reference parameters take a non-reference type",
            );
            return None;
        }

        let default = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Some(Param {
            name,
            ty,
            default,
            is_ref,
            is_const,
            location,
        })
    }

    // ============================================================
    // Classes
    // ============================================================

    /// `class Name <T>? (extends Base)? (implements I, ...)? { members }`
    fn parse_class_decl(&mut self, modifiers: Vec<ClassModifier>) -> Option<ClassDecl> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected class name after 'class'");
            return None;
        }
        let name = self.name_from_previous();

        let generics = if self.matches(TokenKind::Lt) {
            Some(self.parse_generic_params()?)
        } else {
            None
        };

        let base = if self.matches(TokenKind::Extends) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut interfaces = Vec::new();
        if self.matches(TokenKind::Implements) {
            loop {
                interfaces.push(self.parse_type()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }

        if !self.consume(TokenKind::LBrace, "Expected '{' before class body") {
            return None;
        }

        // One bad member never aborts the class: recover at the next member
        // start and keep going.
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.tokens.is_at_end() {
            match self.parse_member_decl() {
                Some(member) => members.push(member),
                None => {
                    self.member_synchronize();
                    if self.check(TokenKind::RBrace) || self.tokens.is_at_end() {
                        break;
                    }
                }
            }
        }

        if !self.matches(TokenKind::RBrace) {
            self.error("Expected '}' after class body");
        }

        Some(ClassDecl {
            name,
            modifiers,
            generics,
            base,
            interfaces,
            members,
        })
    }

    fn parse_member_decl(&mut self) -> Option<ClassMember> {
        let access = self.parse_access_modifier();

        if self.check(TokenKind::Constructor) {
            return self.parse_constructor(access);
        }
        if self.check(TokenKind::Function) {
            return self.parse_method(access);
        }
        if self.check(TokenKind::Let) || self.check(TokenKind::Const) {
            return self.parse_field(access);
        }
        if self.check(TokenKind::Get) {
            return self.parse_property_getter(access);
        }
        if self.check(TokenKind::Set) {
            return self.parse_property_setter(access);
        }

        self.error("Expected class member declaration");
        None
    }

    fn parse_access_modifier(&mut self) -> AccessModifier {
        if self.matches(TokenKind::Public) {
            AccessModifier::Public
        } else if self.matches(TokenKind::Private) {
            AccessModifier::Private
        } else if self.matches(TokenKind::Protected) {
            AccessModifier::Protected
        } else {
            AccessModifier::default()
        }
    }

    fn parse_constructor(&mut self, access: AccessModifier) -> Option<ClassMember> {
        let location = self.peek_location();
        self.tokens.advance(); // 'constructor'

        if !self.consume(TokenKind::LParen, "Expected '(' after 'constructor'") {
            return None;
        }
        let params = self.parse_parameter_list()?;

        if !self.check(TokenKind::LBrace) {
            self.error("Expected '{' before constructor body");
            return None;
        }
        self.tokens.advance();
        let body = self.parse_block()?;

        Some(ClassMember::Constructor {
            access,
            params,
            body,
            location,
        })
    }

    fn parse_method(&mut self, access: AccessModifier) -> Option<ClassMember> {
        let location = self.peek_location();
        self.tokens.advance(); // 'function'

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected method name after 'function'");
            return None;
        }
        let name = self.name_from_previous();

        if !self.consume(TokenKind::LParen, "Expected '(' after method name") {
            return None;
        }
        let params = self.parse_parameter_list()?;

        let return_type = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let throws = self.parse_throws_clause()?;

        if !self.check(TokenKind::LBrace) {
            self.error("Expected '{' before method body");
            return None;
        }
        self.tokens.advance();
        let body = self.parse_block()?;

        Some(ClassMember::Method {
            name,
            access,
            params,
            return_type,
            throws,
            modifiers: Vec::new(),
            body,
            location,
        })
    }

    fn parse_field(&mut self, access: AccessModifier) -> Option<ClassMember> {
        let location = self.peek_location();
        let is_const = self.tokens.advance().kind == TokenKind::Const;

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected field name");
            return None;
        }
        let name = self.name_from_previous();

        let ty = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let initializer = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        if !self.consume(TokenKind::Semicolon, "Expected ';' after field declaration") {
            return None;
        }

        Some(ClassMember::Field {
            name,
            access,
            is_const,
            ty,
            initializer,
            location,
        })
    }

    /// `get name ()? (: type)? { body }`
    fn parse_property_getter(&mut self, access: AccessModifier) -> Option<ClassMember> {
        let location = self.peek_location();
        self.tokens.advance(); // 'get'

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected property name after 'get'");
            return None;
        }
        let name = self.name_from_previous();

        if self.matches(TokenKind::LParen)
            && !self.consume(TokenKind::RParen, "Expected empty parameter list for getter")
        {
            return None;
        }

        let ty = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        if !self.check(TokenKind::LBrace) {
            self.error("Expected '{' after property getter declaration");
            return None;
        }
        self.tokens.advance();
        let body = self.parse_block()?;

        Some(ClassMember::Property {
            name,
            access,
            kind: PropertyKind::Getter,
            ty,
            param: None,
            body,
            location,
        })
    }

    /// `set name ( value : type ) { body }`
    fn parse_property_setter(&mut self, access: AccessModifier) -> Option<ClassMember> {
        let location = self.peek_location();
        self.tokens.advance(); // 'set'

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected property name after 'set'");
            return None;
        }
        let name = self.name_from_previous();

        if !self.consume(TokenKind::LParen, "Expected '(' after property setter name") {
            return None;
        }

        let param_location = self.peek_location();
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected parameter name in setter");
            return None;
        }
        let param_name = self.name_from_previous();

        if !self.consume(TokenKind::Colon, "Expected ':' after setter parameter name") {
            return None;
        }
        let param_ty = self.parse_type()?;

        if !self.consume(TokenKind::RParen, "Expected ')' after setter parameter") {
            return None;
        }

        if !self.check(TokenKind::LBrace) {
            self.error("Expected '{' after setter parameter list");
            return None;
        }
        self.tokens.advance();
        let body = self.parse_block()?;

        let ty = param_ty.clone();
        Some(ClassMember::Property {
            name,
            access,
            kind: PropertyKind::Setter,
            ty: Some(ty),
            param: Some(Param {
                name: param_name,
                ty: param_ty,
                default: None,
                is_ref: false,
                is_const: false,
                location: param_location,
            }),
            body,
            location,
        })
    }

    /// Skip to the next plausible member start inside a class body.
    fn member_synchronize(&mut self) {
        self.tokens.advance();

        while !self.tokens.is_at_end() {
            if self.tokens.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.tokens.peek().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Constructor
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::RBrace => return,
                _ => {}
            }

            self.tokens.advance();
        }
    }

    // ============================================================
    // Enums
    // ============================================================

    /// `enum Name (: Underlying)? { member (= expr)? (, member)* ,? }`
    fn parse_enum_decl(&mut self) -> Option<EnumDecl> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected enum name");
            return None;
        }
        let name = self.name_from_previous();

        let underlying = if self.matches(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        if !self.consume(TokenKind::LBrace, "Expected '{' after enum declaration") {
            return None;
        }

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.tokens.is_at_end() {
            match self.parse_enum_member() {
                Some(member) => members.push(member),
                None => self.enum_synchronize(),
            }

            if !self.check(TokenKind::RBrace) {
                if !self.consume(TokenKind::Comma, "Expected ',' between enum members") {
                    return None;
                }
                // Trailing comma.
                if self.check(TokenKind::RBrace) {
                    break;
                }
            }
        }

        if !self.consume(TokenKind::RBrace, "Expected '}' after enum body") {
            return None;
        }

        Some(EnumDecl {
            name,
            underlying,
            members,
        })
    }

    fn parse_enum_member(&mut self) -> Option<EnumMember> {
        let location = self.peek_location();

        if !self.matches(TokenKind::Identifier) {
            self.error("Expected enum member name");
            return None;
        }
        let name = self.name_from_previous();

        let value = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Some(EnumMember {
            name,
            value,
            location,
        })
    }

    /// Skip to the next plausible enum member.
    fn enum_synchronize(&mut self) {
        self.tokens.advance();

        while !self.tokens.is_at_end() {
            if self.tokens.previous().kind == TokenKind::Comma {
                return;
            }
            match self.tokens.peek().kind {
                TokenKind::Identifier | TokenKind::RBrace => return,
                _ => {}
            }
            self.tokens.advance();
        }
    }

    // ============================================================
    // Interfaces
    // ============================================================

    /// `interface Name { (function sig ; | (let|const) field ;)* }`
    fn parse_interface_decl(&mut self) -> Option<InterfaceDecl> {
        if !self.matches(TokenKind::Identifier) {
            self.error("Expected interface name after 'interface'");
            return None;
        }
        let name = self.name_from_previous();

        if !self.consume(TokenKind::LBrace, "Expected '{' before interface body") {
            return None;
        }

        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.tokens.is_at_end() {
            match self.parse_interface_member() {
                Some(member) => members.push(member),
                None => {
                    self.member_synchronize();
                    if self.check(TokenKind::RBrace) || self.tokens.is_at_end() {
                        break;
                    }
                }
            }
        }

        if !self.consume(TokenKind::RBrace, "Expected '}' after interface body") {
            return None;
        }

        Some(InterfaceDecl { name, members })
    }

    fn parse_interface_member(&mut self) -> Option<InterfaceMember> {
        let location = self.peek_location();

        if self.matches(TokenKind::Function) {
            if !self.matches(TokenKind::Identifier) {
                self.error("Expected method name after 'function'");
                return None;
            }
            let name = self.name_from_previous();

            if !self.consume(TokenKind::LParen, "Expected '(' after method name") {
                return None;
            }
            let params = self.parse_parameter_list()?;

            let return_type = if self.matches(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };

            let throws = self.parse_throws_clause()?;

            if !self.consume(TokenKind::Semicolon, "Expected ';' after method signature") {
                return None;
            }

            return Some(InterfaceMember::Method {
                name,
                params,
                return_type,
                throws,
                location,
            });
        }

        if self.check(TokenKind::Let) || self.check(TokenKind::Const) {
            let is_const = self.tokens.advance().kind == TokenKind::Const;

            if !self.matches(TokenKind::Identifier) {
                self.error("Expected field name");
                return None;
            }
            let name = self.name_from_previous();

            if !self.consume(TokenKind::Colon, "Expected ':' after field name") {
                return None;
            }
            let ty = self.parse_type()?;

            if !self.consume(TokenKind::Semicolon, "Expected ';' after field declaration") {
                return None;
            }

            return Some(InterfaceMember::Field {
                name,
                is_const,
                ty,
                location,
            });
        }

        self.error("Expected interface member declaration");
        None
    }
}

/// Derive function modifier flags from the attribute list.
fn fn_modifiers_from(attributes: &[Attribute], parser: &Parser<'_>) -> Vec<FnModifier> {
    let mut modifiers = Vec::new();
    for attribute in attributes {
        let modifier = match parser.resolve(attribute.name.symbol) {
            "inline" => FnModifier::Inline,
            "virtual" => FnModifier::Virtual,
            "unsafe" => FnModifier::Unsafe,
            "simd" => FnModifier::Simd,
            "async" => FnModifier::Async,
            _ => continue,
        };
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    modifiers
}

/// Derive class modifier flags from the attribute list.
fn class_modifiers_from(attributes: &[Attribute], parser: &Parser<'_>) -> Vec<ClassModifier> {
    let mut modifiers = Vec::new();
    for attribute in attributes {
        let modifier = match parser.resolve(attribute.name.symbol) {
            "aligned" => ClassModifier::Aligned,
            "packed" => ClassModifier::Packed,
            "abstract" => ClassModifier::Abstract,
            _ => continue,
        };
        if !modifiers.contains(&modifier) {
            modifiers.push(modifier);
        }
    }
    modifiers
}
