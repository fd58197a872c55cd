#[macro_use]
mod common;

#[cfg(test)]
mod print {
    tests! {
        stringifies_values is OK r#"
            print nil;
            print true;
            print false;
            print 42;
            print 69.96;
            print "text";
        "# =>
        "nil"
        "true"
        "false"
        "42"
        "69.96"
        "text"
    }

    tests! {
        floats_stay_floats is OK r#"
            print 2.0;
            print 4 / 2;
        "# =>
        "2"
        "2"
    }

    tests! {
        multiple_values_become_one_entry is OK r#"
            print 1, 2, 3;
        "# =>
        "1 2 3"
    }

    tests! {
        arguments_are_evaluated_before_the_sink_call is OK r#"
            fun loud(n) { print "eval", n; return n; }

            print loud(1), loud(2);
        "# =>
        "eval 1"
        "eval 2"
        "1 2"
    }

    tests! {
        prints_callables is OK r#"
            fun f() {}
            class C {}

            print f, C, C();
        "# =>
        "<fun f> <class C> <instance C>"
    }
}
