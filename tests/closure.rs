#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        counter_factory is OK r#"
            fun factory() {
              var i = 0;
              fun step() {
                i = i + 1;
                return i;
              }
              return step;
            }

            var s = factory();
            print s();
            print s();
            print s();
        "# =>
        "1"
        "2"
        "3"
    }

    tests! {
        factories_do_not_share_state is OK r#"
            fun factory() {
              var i = 0;
              fun step() {
                i = i + 1;
                return i;
              }
              return step;
            }

            var a = factory();
            var b = factory();
            print a();
            print a();
            print b();
        "# =>
        "1"
        "2"
        "1"
    }

    tests! {
        two_closures_share_one_frame is OK r#"
            fun pair() {
              var n = 0;
              fun bump() { n = n + 1; return n; }
              fun read() { return n; }
              print bump();
              print read();
            }

            pair();
        "# =>
        "1"
        "1"
    }

    tests! {
        closes_over_function_parameter is OK r#"
            fun capture(param) {
              fun inner() { print param; }
              return inner;
            }

            capture("param")();
        "# =>
        "param"
    }

    tests! {
        closure_survives_its_scope is OK r#"
            var f;

            {
              var local = "local";
              fun inner() { print local; }
              f = inner;
            }

            f();
        "# =>
        "local"
    }

    tests! {
        nested_closures is OK r#"
            fun outer() {
              var a = "a";
              fun middle() {
                var b = "b";
                fun inner() {
                  print a, b;
                }
                return inner;
              }
              return middle;
            }

            outer()()();
        "# =>
        "a b"
    }

    tests! {
        assignment_through_closure_is_visible_outside is OK r#"
            var shared = "before";

            fun update() { shared = "after"; }

            update();
            print shared;
        "# =>
        "after"
    }
}
