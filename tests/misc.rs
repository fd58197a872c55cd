use shale_lang::error::Error;
use shale_lang::from_code;
use shale_lang::printer::FakePrinter;

#[test]
fn scan_errors_surface_from_the_pipeline() {
    let mut printer = FakePrinter::new();
    let error = from_code("print @;", &mut printer).unwrap_err();

    match error {
        Error::Scan(errors) => {
            assert_eq!(errors.messages(), vec!["Unrecognized character [@]"]);
        },
        other => panic!("expected scan errors, got {other:?}"),
    }
}

#[test]
fn parse_errors_surface_from_the_pipeline() {
    let mut printer = FakePrinter::new();
    let error = from_code("print 1", &mut printer).unwrap_err();

    match error {
        Error::Parse(errors) => {
            assert_eq!(errors.messages(), vec!["Expected semicolon after statement"]);
        },
        other => panic!("expected parse errors, got {other:?}"),
    }
}

#[test]
fn resolve_errors_surface_from_the_pipeline() {
    let mut printer = FakePrinter::new();
    let error = from_code("return 4;", &mut printer).unwrap_err();

    match error {
        Error::Compile(errors) => {
            assert_eq!(errors.messages(), vec!["Cannot return from top-level code"]);
        },
        other => panic!("expected compile errors, got {other:?}"),
    }
}

#[test]
fn runtime_errors_halt_execution_where_raised() {
    let mut printer = FakePrinter::new();
    let error = from_code("print 1; -nil; print 2;", &mut printer).unwrap_err();

    match error {
        Error::Runtime(error) => {
            assert_eq!(error.message, "Operand of (-) must be of type number, nil given");
            assert_eq!(error.token.line, 1);
        },
        other => panic!("expected a runtime error, got {other:?}"),
    }

    // Output up to the failure point sticks around.
    assert_eq!(printer.entries(), ["1"]);
}

#[test]
fn runtime_errors_carry_the_line() {
    let mut printer = FakePrinter::new();
    let error = from_code("print 1;\nprint missing;", &mut printer).unwrap_err();

    assert_eq!(
        error.to_string(),
        "runtime error on line 2: Variable [missing] is not defined",
    );
}

#[test]
fn deterministic_output_for_a_fixed_program() {
    let source = r#"
        fun fib(n) {
          if (n < 2) { return n; }
          return fib(n - 1) + fib(n - 2);
        }

        for (var i = 0; i < 7; i = i + 1) {
          print fib(i);
        }
    "#;

    for _ in 0..2 {
        let mut printer = FakePrinter::new();
        from_code(source, &mut printer).unwrap();
        assert_eq!(printer.entries(), ["0", "1", "1", "2", "3", "5", "8"]);
    }
}
