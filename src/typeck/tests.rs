//! Type checker tests.
//!
//! Each test runs the full lex → parse → check pipeline over a source
//! snippet and asserts on the collected diagnostics.

use crate::diagnostics::ErrorReporter;
use crate::parser::Parser;
use crate::typeck::check_program;

/// Run the whole pipeline; return (success, diagnostic messages).
fn typecheck(source: &str) -> (bool, Vec<String>) {
    let mut reporter = ErrorReporter::new();
    let mut parser = Parser::from_source(source, "test.tspp", &mut reporter);
    let program = parser.parse_program();
    let interner = parser.take_interner();

    let ok = check_program(&program, interner, &mut reporter);
    let messages = reporter
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect();
    (ok, messages)
}

fn assert_checks(source: &str) {
    let (ok, messages) = typecheck(source);
    assert!(
        ok,
        "expected type checking to succeed, got errors:\n{}",
        messages.join("\n")
    );
}

fn assert_check_error(source: &str, expected: &str) {
    let (ok, messages) = typecheck(source);
    assert!(!ok, "expected a type error containing '{}'", expected);
    assert!(
        messages.iter().any(|m| m.contains(expected)),
        "expected an error containing '{}', got:\n{}",
        expected,
        messages.join("\n")
    );
}

// ============================================================
// Variable declarations
// ============================================================

#[test]
fn var_with_matching_type_and_initializer() {
    assert_checks("let x: int = 42;");
}

#[test]
fn var_infers_type_from_initializer() {
    assert_checks("let x = 42;\nlet y = x + 1;");
}

#[test]
fn var_without_type_or_initializer_is_rejected() {
    assert_check_error(
        "let x;",
        "Variable declaration needs either a type or an initializer",
    );
}

#[test]
fn var_initializer_must_match_declared_type() {
    assert_check_error("let x: int = \"hi\";", "Cannot assign string to int");
}

#[test]
fn int_widens_to_float_implicitly_but_not_on_assignment() {
    // Assignability is structural; widening applies to conversions, not
    // declared-type assignment.
    assert_check_error("let x: int = 2.5;", "Initializer type doesn't match");
}

#[test]
fn redeclaration_in_same_scope_is_reported() {
    assert_check_error("let x = 1;\nlet x = 2;", "Redeclaration of 'x'");
}

#[test]
fn shadowing_in_inner_block_is_allowed() {
    assert_checks("let x = 1;\n{\n  let x = \"inner\";\n}\n");
}

// ============================================================
// Scope correctness
// ============================================================

#[test]
fn block_locals_do_not_leak_to_siblings() {
    assert_check_error(
        "{\n  let a = 1;\n}\n{\n  let b = a;\n}\n",
        "Undefined identifier: a",
    );
}

#[test]
fn outer_names_are_visible_in_nested_blocks() {
    assert_checks("let a = 1;\n{\n  {\n    let b = a + 1;\n  }\n}\n");
}

// ============================================================
// Functions, calls, and returns
// ============================================================

#[test]
fn function_body_sees_parameters() {
    assert_checks("function add(a: int, b: int): int { return a + b; }");
}

#[test]
fn return_type_mismatch_is_reported() {
    assert_check_error(
        "function f(): int { return \"hi\"; }",
        "Return value type doesn't match function return type",
    );
}

#[test]
fn bare_return_requires_void() {
    assert_check_error(
        "function f(): int { return; }",
        "Return value type doesn't match function return type",
    );
    assert_checks("function g(): void { return; }");
    assert_checks("function h() { return; }");
}

#[test]
fn recursion_is_resolvable() {
    assert_checks(
        "function fact(n: int): int {\n  if (n == 0) { return 1; }\n  return n * fact(n - 1);\n}",
    );
}

#[test]
fn call_requires_function_type() {
    assert_check_error("let x = 1;\nx();", "Cannot call non-function type");
}

#[test]
fn call_arity_is_checked() {
    assert_check_error(
        "function f(a: int): int { return a; }\nf(1, 2);",
        "Wrong number of arguments",
    );
}

#[test]
fn call_argument_types_are_checked() {
    assert_check_error(
        "function f(a: int): int { return a; }\nf(\"no\");",
        "Argument type mismatch",
    );
}

#[test]
fn function_types_install_in_the_enclosing_scope() {
    assert_checks("function f(): int { return 1; }\nlet x = f();");
}

#[test]
fn default_values_are_checked_against_parameter_types() {
    assert_check_error(
        "function f(a: int = \"no\") { }",
        "Default value type doesn't match parameter type",
    );
}

#[test]
fn generic_parameters_resolve_inside_the_function() {
    assert_checks("function id<T>(value: T): T { return value; }");
}

// ============================================================
// Conditions
// ============================================================

#[test]
fn if_condition_must_be_boolean() {
    assert_check_error(
        "if (1) { }",
        "If condition must be convertible to boolean",
    );
}

#[test]
fn while_condition_must_be_boolean() {
    assert_check_error(
        "while (\"no\") { }",
        "While condition must be convertible to boolean",
    );
}

#[test]
fn for_condition_must_be_boolean() {
    assert_check_error(
        "for (let i = 0; i; i = i + 1) { }",
        "For loop condition must be convertible to boolean",
    );
}

#[test]
fn do_while_condition_must_be_boolean() {
    assert_check_error(
        "do { } while (3);",
        "Do-while condition must be convertible to boolean",
    );
}

// ============================================================
// Operators
// ============================================================

#[test]
fn arithmetic_mixes_to_float() {
    assert_checks("let x: float = 1 * 2.5;");
}

#[test]
fn plus_concatenates_strings() {
    assert_checks("let s: string = \"a\" + 1;");
}

#[test]
fn arithmetic_rejects_strings() {
    assert_check_error(
        "let x = \"a\" * 2;",
        "Invalid operands for arithmetic operator",
    );
}

#[test]
fn comparison_yields_boolean() {
    assert_checks("let b: boolean = 1 < 2;");
}

#[test]
fn comparison_rejects_incompatible_operands() {
    assert_check_error("let b = 1 == \"one\";", "Cannot compare incompatible types");
}

#[test]
fn logical_operators_require_booleans() {
    assert_check_error(
        "let b = 1 && true;",
        "Logical operators require boolean operands",
    );
    assert_checks("let b = true && false || true;");
}

#[test]
fn bitwise_operators_require_integers() {
    assert_check_error(
        "let x = 1.5 & 2;",
        "Bitwise operators require integer operands",
    );
    assert_checks("let x = 1 & 2 | 3 ^ 4;");
    assert_checks("let y = 1 << 2 >> 3;");
}

#[test]
fn unary_minus_requires_numeric() {
    assert_check_error("let x = -\"no\";", "Unary +/- requires numeric operand");
    assert_checks("let x = -5;");
}

#[test]
fn bitwise_not_requires_integer() {
    assert_check_error("let x = ~1.5;", "Bitwise NOT requires integer operand");
}

#[test]
fn logical_not_requires_boolean() {
    assert_check_error("let x = !3;", "Logical NOT requires boolean operand");
    assert_checks("let x = !true;");
}

#[test]
fn increment_requires_numeric() {
    assert_check_error(
        "let s = \"x\";\ns++;",
        "Increment/decrement requires numeric operand",
    );
    assert_checks("let i = 0;\ni++;\n++i;");
}

// ============================================================
// Assignment
// ============================================================

#[test]
fn simple_assignment_uses_assignability() {
    assert_checks("let x = 1;\nx = 2;");
    assert_check_error("let x = 1;\nx = \"no\";", "Cannot assign incompatible type");
}

#[test]
fn compound_assignment_applies_binary_rule() {
    assert_checks("let x = 1;\nx += 2;");
    assert_check_error(
        "let x = 1;\nx *= \"no\";",
        "Invalid operands for arithmetic operator",
    );
}

#[test]
fn compound_result_must_fit_target() {
    // int += float computes a float, which does not fit back into int.
    assert_check_error(
        "let x = 1;\nx += 2.5;",
        "Result of compound assignment is not assignable to target",
    );
}

// ============================================================
// Indexing and array literals
// ============================================================

#[test]
fn indexing_requires_array_and_int_index() {
    assert_checks("let xs = [1, 2, 3];\nlet x: int = xs[0];");
    assert_check_error("let x = 1;\nlet y = x[0];", "Cannot index non-array type");
    assert_check_error(
        "let xs = [1, 2];\nlet y = xs[\"zero\"];",
        "Array index must be an integer",
    );
}

#[test]
fn array_elements_must_agree_with_first() {
    assert_check_error(
        "let xs = [1, \"two\"];",
        "Array elements must have compatible types",
    );
}

#[test]
fn empty_array_literal_is_an_error() {
    // Known behaviour: empty literals are untypeable even with an
    // annotation.
    assert_check_error(
        "let xs: int[] = [];",
        "Cannot determine type of empty array literal",
    );
}

// ============================================================
// new, cast, classes
// ============================================================

#[test]
fn new_resolves_declared_classes() {
    assert_checks("class Point { let x: int = 0; }\nlet p = new Point();");
}

#[test]
fn new_reports_unknown_classes() {
    assert_check_error("let p = new Missing();", "Undefined class: Missing");
}

#[test]
fn classes_resolve_regardless_of_order() {
    assert_checks("let p = new Later();\nclass Later { }");
}

#[test]
fn cast_requires_known_target() {
    assert_check_error("let x = cast<Missing>(1);", "Undefined type: Missing");
}

#[test]
fn cast_narrowing_is_permitted() {
    assert_checks("let x: int = cast<int>(2.75);");
    assert_checks("let b: boolean = cast<boolean>(1);");
}

#[test]
fn invalid_casts_are_reported() {
    assert_check_error("let x = cast<int>(\"five\");", "Invalid cast");
}

// ============================================================
// for-of, switch, try
// ============================================================

#[test]
fn for_of_binds_the_element_type() {
    assert_checks(
        "let items = [1, 2, 3];\nfor (const item of items) {\n  let next: int = item + 1;\n}",
    );
}

#[test]
fn switch_cases_must_match_scrutinee() {
    assert_check_error(
        "let x = 1;\nswitch (x) {\n  case \"one\": { }\n}",
        "Case value type doesn't match switch expression type",
    );
    assert_checks(
        "let x = 1;\nswitch (x) {\n  case 1:\n    x = 2;\n  default:\n    x = 3;\n}",
    );
}

#[test]
fn catch_parameter_is_scoped_to_its_clause() {
    assert_checks(
        "try {\n  throw 1;\n} catch (e: int) {\n  let copy: int = e;\n}",
    );
    assert_check_error(
        "try {\n  throw 1;\n} catch (e: int) {\n}\nlet after = e;",
        "Undefined identifier: e",
    );
}

// ============================================================
// Error suppression
// ============================================================

#[test]
fn undefined_identifier_reports_once() {
    let (_, messages) = typecheck("let x = missing + 1;");
    let count = messages
        .iter()
        .filter(|m| m.contains("Undefined identifier"))
        .count();
    assert_eq!(count, 1, "got: {:?}", messages);
    // The binary operation on the error operand stays silent.
    assert!(
        !messages.iter().any(|m| m.contains("Invalid operands")),
        "cascade was not suppressed: {:?}",
        messages
    );
}

#[test]
fn unknown_literals_are_reported() {
    assert_check_error("let x = null;", "Unknown literal type");
}

#[test]
fn this_outside_class_is_reported() {
    assert_check_error("let x = this;", "'this' is only valid inside class members");
}

// ============================================================
// Compile-time operators and conditionals
// ============================================================

#[test]
fn sizeof_yields_int() {
    assert_checks("let x = 1;\nlet n: int = sizeof(x);");
}

#[test]
fn typeof_yields_string() {
    assert_checks("let x = 1;\nlet s: string = typeof(x);");
}

#[test]
fn constexpr_preserves_operand_type() {
    assert_checks("let x: int = constexpr(2 + 3);");
}

#[test]
fn conditional_branches_must_agree() {
    assert_checks("let x: int = true ? 1 : 2;");
    assert_check_error(
        "let x = true ? 1 : \"two\";",
        "Conditional branches have incompatible types",
    );
}

// ============================================================
// Pointers and smart pointers
// ============================================================

#[test]
fn address_of_yields_pointer() {
    assert_checks("let x = 1;\nlet p: int@ = @x;");
}

#[test]
fn reference_parameters_convert_to_their_pointee() {
    // A `ref boolean` parameter dereferences implicitly where a boolean is
    // expected.
    assert_checks(
        "function flip(ref flag: boolean): boolean {\n  if (flag) { return false; }\n  return true;\n}",
    );
}

#[test]
fn smart_pointer_types_resolve() {
    assert_checks("function take(box: #unique<int>): void { }");
}

#[test]
fn union_annotations_accept_either_arm() {
    assert_checks("let x: int | string = 1;\nlet y: int | string = \"s\";");
    assert_check_error("let z: int | string = true;", "Cannot assign");
}
