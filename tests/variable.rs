#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        declares_and_reads is OK r#"
            var a = 4;
            print a;
        "# =>
        "4"
    }

    tests! {
        assignment_returns_the_value is OK r#"
            var a = 1;
            var b = a = 2;
            print a, b;
        "# =>
        "2 2"
    }

    tests! {
        assignment_reaches_enclosing_scope is OK r#"
            var a = 1;
            {
              a = 2;
            }
            print a;
        "# =>
        "2"
    }

    tests! {
        uninitialized_variable_errors_on_read is ERR r#"
            var a;
            a;
        "# =>
        "Variable [a] is not initialized"
    }

    tests! {
        uninitialized_variable_can_be_assigned is OK r#"
            var a;
            a = 3;
            print a;
        "# =>
        "3"
    }

    tests! {
        undefined_variable_errors is ERR r#"
            print missing;
        "# =>
        "Variable [missing] is not defined"
    }

    tests! {
        undefined_assignment_errors is ERR r#"
            missing = 1;
        "# =>
        "Variable [missing] is not defined"
    }

    tests! {
        global_redeclaration_errors_at_runtime is ERR r#"
            var a = 1;
            var a = 2;
        "# =>
        "Variable [a] is already defined"
    }

    tests! {
        shadowing_in_child_scope_is_fine is OK r#"
            var a = 1;
            {
              var a = 2;
              print a;
            }
            print a;
        "# =>
        "2"
        "1"
    }
}
