//! Type expression parsing.
//!
//! A primary type (primitive keyword, possibly-qualified name with optional
//! template arguments, smart-pointer attribute, or parenthesised function
//! type) followed by postfix modifiers applied in order: array `[size?]`,
//! pointer `@ (safe|unsafe|aligned(N))?`, reference `&`, union `| T`.

use super::Parser;
use crate::ast::*;
use crate::lexer::TokenKind;

impl<'r> Parser<'r> {
    /// Parse a full type expression.
    pub fn parse_type(&mut self) -> Option<TypeNode> {
        let base = self.parse_primary_type()?;
        self.parse_type_modifiers(base, true)
    }

    /// A type without union arms, used for the right side of `|` so the
    /// outer loop keeps unions left-associative.
    fn parse_non_union_type(&mut self) -> Option<TypeNode> {
        let base = self.parse_primary_type()?;
        self.parse_type_modifiers(base, false)
    }

    /// A type without postfix modifiers. Constraint bounds parse at this
    /// level so `T extends A & B` keeps `&` as the intersection separator
    /// instead of a reference postfix.
    pub(super) fn parse_primary_type(&mut self) -> Option<TypeNode> {
        let location = self.peek_location();

        if self.match_any(&[
            TokenKind::Void,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Boolean,
            TokenKind::StringType,
        ]) {
            let primitive = match self.tokens.previous().kind {
                TokenKind::Void => PrimitiveType::Void,
                TokenKind::Int => PrimitiveType::Int,
                TokenKind::Float => PrimitiveType::Float,
                TokenKind::Boolean => PrimitiveType::Bool,
                _ => PrimitiveType::String,
            };
            return Some(TypeNode {
                kind: TypeKind::Primitive(primitive),
                location,
            });
        }

        if self.matches(TokenKind::Identifier) {
            let lexeme = self.tokens.previous().lexeme.clone();
            let mut segments = vec![self.intern(&lexeme)];

            while self.matches(TokenKind::Dot) {
                if !self.matches(TokenKind::Identifier) {
                    self.error("Expected identifier after '.'");
                    return None;
                }
                let lexeme = self.tokens.previous().lexeme.clone();
                segments.push(self.intern(&lexeme));
            }

            let base = if segments.len() > 1 {
                TypeNode {
                    kind: TypeKind::Qualified(segments),
                    location: location.clone(),
                }
            } else {
                TypeNode {
                    kind: TypeKind::Named(segments[0]),
                    location: location.clone(),
                }
            };

            // `Name<T, U>` template instantiation.
            if self.matches(TokenKind::Lt) {
                let args = self.parse_type_argument_list()?;
                return Some(TypeNode {
                    kind: TypeKind::Template {
                        base: Box::new(base),
                        args,
                    },
                    location,
                });
            }

            return Some(base);
        }

        // `#shared<T>` / `#unique<T>` / `#weak<T>`
        if self.check(TokenKind::Attribute) {
            let kind = match self.tokens.peek().lexeme.as_str() {
                "#shared" => Some(SmartKind::Shared),
                "#unique" => Some(SmartKind::Unique),
                "#weak" => Some(SmartKind::Weak),
                _ => None,
            };
            if let Some(kind) = kind {
                self.tokens.advance();
                if !self.consume(TokenKind::Lt, "Expected '<' after smart pointer kind") {
                    return None;
                }
                let pointee = self.parse_type()?;
                if !self.consume(TokenKind::Gt, "Expected '>' after smart pointer type") {
                    return None;
                }
                return Some(TypeNode {
                    kind: TypeKind::Smart {
                        kind,
                        pointee: Box::new(pointee),
                    },
                    location,
                });
            }
        }

        // `(T, U) -> R` function type.
        if self.matches(TokenKind::LParen) {
            let mut params = Vec::new();
            if !self.matches(TokenKind::RParen) {
                loop {
                    params.push(self.parse_type()?);
                    if !self.matches(TokenKind::Comma) {
                        break;
                    }
                }
                if !self.consume(TokenKind::RParen, "Expected ')' after parameter types") {
                    return None;
                }
            }
            if !self.consume(TokenKind::Arrow, "Expected '->' in function type") {
                return None;
            }
            let return_type = self.parse_type()?;
            return Some(TypeNode {
                kind: TypeKind::Function {
                    params,
                    return_type: Box::new(return_type),
                },
                location,
            });
        }

        self.error("Expected type");
        None
    }

    /// `T (, U)* >` — the `<` has been consumed.
    fn parse_type_argument_list(&mut self) -> Option<Vec<TypeNode>> {
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        if !self.consume(TokenKind::Gt, "Expected '>' after type arguments") {
            return None;
        }
        Some(args)
    }

    fn parse_type_modifiers(&mut self, mut base: TypeNode, allow_union: bool) -> Option<TypeNode> {
        loop {
            let location = self.peek_location();

            if self.matches(TokenKind::LBracket) {
                let size = if self.matches(TokenKind::RBracket) {
                    None
                } else {
                    let size = self.parse_expression()?;
                    if !self.consume(TokenKind::RBracket, "Expected ']' after array size") {
                        return None;
                    }
                    Some(Box::new(size))
                };
                base = TypeNode {
                    kind: TypeKind::Array {
                        element: Box::new(base),
                        size,
                    },
                    location,
                };
            } else if self.matches(TokenKind::At) {
                let mut kind = PointerKind::Raw;
                let mut alignment = None;

                if self.matches(TokenKind::Identifier) {
                    let modifier = self.tokens.previous().lexeme.clone();
                    match modifier.as_str() {
                        "safe" => kind = PointerKind::Safe,
                        "unsafe" => kind = PointerKind::Unsafe,
                        "aligned" => {
                            kind = PointerKind::Aligned;
                            if !self.consume(TokenKind::LParen, "Expected '(' after 'aligned'") {
                                return None;
                            }
                            let expr = self.parse_expression()?;
                            if !self.consume(TokenKind::RParen, "Expected ')' after alignment value")
                            {
                                return None;
                            }
                            alignment = Some(Box::new(expr));
                        }
                        _ => {
                            self.error_at(
                                self.previous_location(),
                                format!("Invalid pointer modifier: {}", modifier),
                            );
                            return None;
                        }
                    }
                }

                base = TypeNode {
                    kind: TypeKind::Pointer {
                        base: Box::new(base),
                        kind,
                        alignment,
                    },
                    location,
                };
            } else if self.matches(TokenKind::And) {
                base = TypeNode {
                    kind: TypeKind::Reference(Box::new(base)),
                    location,
                };
            } else if allow_union && self.matches(TokenKind::Or) {
                let right = self.parse_non_union_type()?;
                base = TypeNode {
                    kind: TypeKind::Union {
                        left: Box::new(base),
                        right: Box::new(right),
                    },
                    location,
                };
            } else {
                break;
            }
        }

        Some(base)
    }

    /// Render a type node the way it was written, for diagnostics and for
    /// cast targets (which the checker resolves by name).
    pub fn type_to_string(&self, ty: &TypeNode) -> String {
        match &ty.kind {
            TypeKind::Primitive(p) => p.as_str().to_string(),
            TypeKind::Named(symbol) => self.resolve(*symbol).to_string(),
            TypeKind::Qualified(segments) => segments
                .iter()
                .map(|s| self.resolve(*s))
                .collect::<Vec<_>>()
                .join("."),
            TypeKind::Array { element, .. } => format!("{}[]", self.type_to_string(element)),
            TypeKind::Pointer { base, kind, .. } => match kind {
                PointerKind::Raw => format!("{}@", self.type_to_string(base)),
                PointerKind::Safe => format!("{}@safe", self.type_to_string(base)),
                PointerKind::Unsafe => format!("{}@unsafe", self.type_to_string(base)),
                PointerKind::Aligned => format!("{}@aligned", self.type_to_string(base)),
            },
            TypeKind::Reference(base) => format!("{}&", self.type_to_string(base)),
            TypeKind::Function {
                params,
                return_type,
            } => {
                let params = params
                    .iter()
                    .map(|p| self.type_to_string(p))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({}) -> {}", params, self.type_to_string(return_type))
            }
            TypeKind::Template { base, args } => {
                let args = args
                    .iter()
                    .map(|a| self.type_to_string(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{}>", self.type_to_string(base), args)
            }
            TypeKind::Smart { kind, pointee } => {
                format!("#{}<{}>", kind.as_str(), self.type_to_string(pointee))
            }
            TypeKind::Union { left, right } => {
                format!(
                    "{} | {}",
                    self.type_to_string(left),
                    self.type_to_string(right)
                )
            }
        }
    }
}
