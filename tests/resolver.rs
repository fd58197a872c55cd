#[macro_use]
mod common;

use shale_lang::parser::Parser;
use shale_lang::resolve;

/// Resolves the code and returns the recorded depths in parse order.
fn depths(code: &str) -> Vec<usize> {
    let program = Parser::parse_code(code).expect("code should parse");
    let bindings = resolve(&program).expect("code should resolve");

    bindings.values().copied().collect()
}

fn resolve_errors(code: &str) -> Vec<String> {
    let program = Parser::parse_code(code).expect("code should parse");

    match resolve(&program) {
        Err(errors) => errors.messages(),
        Ok(_) => panic!("expected code to fail resolution"),
    }
}

#[cfg(test)]
mod scope {
    // The canonical case: a closure keeps reading the variable that was
    // visible at its declaration site, not the one declared after it.
    tests! {
        closure_ignores_later_shadowing is OK r#"
            var a = "global";
            {
              fun showA() {
                print a;
              }

              showA();
              var a = "block";
              showA();
            }
        "# =>
        "global"
        "global"
    }

    tests! {
        blocks_shadow_and_restore is OK r#"
            var a = "outer";
            {
              var a = "inner";
              print a;
            }
            print a;
        "# =>
        "inner"
        "outer"
    }

    tests! {
        globals_resolve_late is OK r#"
            fun f() {
              return g();
            }

            fun g() {
              return 42;
            }

            print f();
        "# =>
        "42"
    }
}

#[test]
fn records_depths_per_reference() {
    let bindings = depths(r#"
        fun f() {
            var b = 1;

            var g = \a -> a + b;

            fun id(x) { return x; }

            b;
        }
    "#);

    // a at 0 and b at 1 inside the lambda, x at 0 inside id, b at 0 in the
    // function body. References to globals stay out of the table.
    assert_eq!(bindings, vec![0, 1, 0, 0]);
}

#[test]
fn double_declaration_errors() {
    let errors = resolve_errors(r#"
        fun f() {
            var a = "first";
            var a = "again";
        }
    "#);

    assert_eq!(errors, vec!["Variable [a] is already defined"]);
}

#[test]
fn self_initialization_errors() {
    let errors = resolve_errors(r#"
        fun f() {
            var a = a;
        }
    "#);

    assert_eq!(errors, vec!["Variable [a] accessed inside its own initializer"]);
}

#[test]
fn duplicate_parameters_error() {
    let errors = resolve_errors("fun f(a, a) { return a; }");

    assert_eq!(errors, vec!["Variable [a] is already defined"]);
}

#[test]
fn top_level_return_errors() {
    assert_eq!(resolve_errors("return 4;"), vec!["Cannot return from top-level code"]);
}

#[test]
fn initializer_cannot_return_a_value() {
    let errors = resolve_errors("class Foo { init() { return 3; } }");

    assert_eq!(errors, vec!["Cannot return a value from an initializer"]);
}

#[test]
fn initializer_may_return_bare() {
    let program = Parser::parse_code("class Foo { init() { return; } }").unwrap();

    assert!(resolve(&program).is_ok());
}

#[test]
fn class_cannot_inherit_from_itself() {
    assert_eq!(
        resolve_errors("class Foo < Foo {}"),
        vec!["A class cannot inherit from itself"],
    );
}

#[test]
fn this_outside_class_errors() {
    assert_eq!(
        resolve_errors("print this;"),
        vec!["Cannot use 'this' outside of a class"],
    );
}

#[test]
fn super_outside_class_errors() {
    assert_eq!(
        resolve_errors("print super.f;"),
        vec!["Cannot use 'super' outside of a class"],
    );
}

#[test]
fn super_without_superclass_errors() {
    assert_eq!(
        resolve_errors("class Foo { bar() { return super.f(); } }"),
        vec!["Cannot use 'super' in a class with no superclass"],
    );
}

#[test]
fn errors_accumulate() {
    let errors = resolve_errors(r#"
        fun f() {
            var a = 1;
            var a = a;
        }
    "#);

    assert_eq!(errors, vec![
        "Variable [a] is already defined",
        "Variable [a] accessed inside its own initializer",
    ]);
}
