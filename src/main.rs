use std::{env, process};

use shale_lang::printer::RealPrinter;
use shale_lang::shale;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut printer = RealPrinter::stdout();
    let mut shale = shale::new(&mut printer);

    match args.len() {
        n if n > 2 => {
            println!("Usage: shale [script]");
            process::exit(64);
        },
        2 => shale.run_file(&args[1]),
        _ => shale.run_prompt(),
    };
}
