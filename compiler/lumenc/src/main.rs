//! Lumen CLI

use lumenc::commands::{
    check_file, lex_file, parse_file, run_file, steps_file, Options, EXTENSION,
};

fn main() {
    lumenc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "lex" | "parse" | "check" | "run" | "steps" => {
            let options = parse_options(&args[2..]);
            let Some(path) = options.path.as_deref() else {
                eprintln!("Usage: lumen {command} <file.{EXTENSION}>");
                std::process::exit(1);
            };
            match command.as_str() {
                "lex" => lex_file(path),
                "parse" => parse_file(path),
                "check" => check_file(path, &options),
                "steps" => steps_file(path),
                _ => run_file(path, &options),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Lumen {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // If it looks like a source file, run it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
            {
                let options = parse_options(&args[1..]);
                run_file(command, &options);
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn parse_options(args: &[String]) -> Options {
    match Options::parse(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Lumen");
    println!();
    println!("Usage: lumen <command> <file.{EXTENSION}> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>           Evaluate a program, then one pass per produced value");
    println!("  check <file>         Report conflicts without evaluating");
    println!("  steps <file>         Print the step plans of a program");
    println!("  parse <file>         Print the syntax tree");
    println!("  lex <file>           Print the token stream");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  --max-steps=<n>      Steps allowed per pass (default 1000000)");
    println!("  --max-depth=<n>      Nested evaluations allowed (default 256)");
    println!("  --produce=<S>:<v>    Send value <v> to stream <S>, then re-evaluate");
    println!("                       (repeatable; applied in order)");
    println!("  --color=<mode>       Diagnostics color: auto, always, never");
    println!();
    println!("Examples:");
    println!("  lumen run counter.{EXTENSION} --produce=Button:⊤ --produce=Button:⊥");
    println!("  lumen check main.{EXTENSION}");
    println!("  RUST_LOG=lumen_eval=debug lumen run main.{EXTENSION}");
}
