use std::io::Write;

/// The sink a print statement writes through. `print a, b;` evaluates and
/// stringifies every value first, then makes a single call here.
pub trait Printer {
    fn print(&mut self, values: &[String]);
}

/// Writes each print call as one line, values joined by a single space.
pub struct RealPrinter<W: Write> {
    out: W,
}

impl<W: Write> RealPrinter<W> {
    pub fn new(out: W) -> Self {
        RealPrinter { out }
    }
}

impl RealPrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        RealPrinter::new(std::io::stdout())
    }
}

impl<W: Write> Printer for RealPrinter<W> {
    fn print(&mut self, values: &[String]) {
        // A broken pipe is not the program's problem.
        let _ = writeln!(self.out, "{}", values.join(" "));
    }
}

/// Collects each print call as one entry. Used by tests to observe output.
#[derive(Debug, Default)]
pub struct FakePrinter {
    buffer: Vec<String>,
}

impl FakePrinter {
    pub fn new() -> Self {
        FakePrinter::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.buffer
    }
}

impl Printer for FakePrinter {
    fn print(&mut self, values: &[String]) {
        self.buffer.push(values.join(" "));
    }
}
