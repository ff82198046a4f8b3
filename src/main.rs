use std::{env, io, process};

use slate_lang::slate;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut slate = slate::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            println!("Usage: slate [script]");
            process::exit(64);
        },
        2 => slate.run_file(&args[1]),
        _ => slate.run_prompt(),
    }
}
