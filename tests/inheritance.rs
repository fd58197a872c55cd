#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        methods_are_inherited is OK r#"
            class Base {
              greet() { return "hello"; }
            }

            class Derived < Base {}

            print Derived().greet();
        "# =>
        "hello"
    }

    tests! {
        subclass_overrides is OK r#"
            class Base {
              name() { return "base"; }
            }

            class Derived < Base {
              name() { return "derived"; }
            }

            print Derived().name();
        "# =>
        "derived"
    }

    tests! {
        super_calls_the_overridden_method is OK r#"
            class Bar {
              boo() { return 21; }
            }

            class Foo < Bar {
              boo() { return super.boo() * 2; }
            }

            print Foo().boo();
        "# =>
        "42"
    }

    tests! {
        super_skips_the_own_override is OK r#"
            class A {
              say() { return "A"; }
            }

            class B < A {
              say() { return "B " + super.say(); }
            }

            class C < B {
              say() { return "C " + super.say(); }
            }

            print C().say();
        "# =>
        "C B A"
    }

    tests! {
        inherited_method_binds_the_subclass_instance is OK r#"
            class Base {
              whoami() { return this.name; }
            }

            class Derived < Base {
              init() { this.name = "derived"; }
            }

            print Derived().whoami();
        "# =>
        "derived"
    }

    tests! {
        initializers_are_inherited is OK r#"
            class Base {
              init(v) { this.v = v; }
            }

            class Derived < Base {}

            print Derived(7).v;
        "# =>
        "7"
    }

    tests! {
        super_method_must_exist is ERR r#"
            class Bar {}

            class Foo < Bar {
              boo() { return super.boo(); }
            }

            Foo().boo();
        "# =>
        "Undefined method [boo]"
    }

    tests! {
        superclass_must_be_a_class is ERR r#"
            var NotAClass = "so not a class";

            class Foo < NotAClass {}
        "# =>
        "Superclass must be a class"
    }
}
