/// Runs a program through the whole pipeline against an in-memory sink.
///
/// `is OK` asserts the entries the sink collected, one literal per print
/// statement. `is ERR` asserts the reported error messages.
#[macro_export]
macro_rules! tests {
    ($name:ident is OK $source:expr => $($expected:literal)*) => {
        #[test]
        fn $name() {
            let mut printer = shale_lang::printer::FakePrinter::new();

            shale_lang::from_code($source, &mut printer).expect("program should run");

            let expected: Vec<String> = vec![$($expected.to_string()),*];
            assert_eq!(printer.entries(), expected.as_slice());
        }
    };

    ($name:ident is ERR $source:expr => $($expected:literal)+) => {
        #[test]
        fn $name() {
            let mut printer = shale_lang::printer::FakePrinter::new();

            let error = shale_lang::from_code($source, &mut printer)
                .expect_err("program should fail");

            let expected: Vec<String> = vec![$($expected.to_string()),+];
            assert_eq!(error.messages(), expected);
        }
    };
}
