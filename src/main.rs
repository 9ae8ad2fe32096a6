use std::{path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use malang::{
    error::Error,
    interpret::{describe_count, interpret},
    interpreter::{
        evaluator::core::Context,
        lexer::tokenize_file,
        parser::core::parse_program,
        value::number::Number,
    },
    options::{DEFAULT_STD_LIB_DIR, parse_argument},
};
use num_traits::One;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Runs a Malang file and prints its result.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// Print the tokens and the top-level instructions.
    #[arg(short, long)]
    debug: bool,

    /// Print the whole operation that computes the result.
    #[arg(short, long)]
    show: bool,

    /// Report each phase, the operation count and the elapsed time.
    #[arg(short, long)]
    verbose: bool,

    /// Read the result as a boolean or as text when possible.
    #[arg(short, long)]
    interpret: bool,

    /// Directory searched for included files not found next to the main file.
    #[arg(long, env = "MALANG_STD_LIBS", default_value = DEFAULT_STD_LIB_DIR)]
    std_libs: PathBuf,

    /// The file to run.
    file: PathBuf,

    /// Arguments passed to the `main` function.
    #[arg(value_parser = parse_argument)]
    args: Vec<Number>,
}

/// Installs a stderr subscriber when `RUST_LOG` is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)
                                                        .with_target(true)
                                                        .with_level(true))
                                      .with(EnvFilter::from_default_env())
                                      .init();
    }
}

fn run(args: Args) -> Result<(), Error> {
    let start = Instant::now();

    if args.verbose {
        println!("Lexing..");
    }
    let tokens = tokenize_file(&args.file, &args.std_libs)?;
    if args.verbose {
        println!("Lexed {} tokens", tokens.len());
    }
    if args.debug {
        println!("Tokens:");
        for token in &tokens {
            println!("\t{token}\t({}:{})", token.location.line, token.location.column);
        }
    }

    if args.verbose {
        println!("Parsing..");
    }
    let root = parse_program(&tokens)?;
    if args.verbose {
        println!("Parsed {} top-level instructions", root.content.len());
    }
    if args.debug {
        println!("Instructions:");
        for instruction in &root.content {
            println!("\t- {instruction}");
        }
    }

    if args.verbose {
        println!("Constructing and computing the operation..");
    }
    let program = Context::new(args.args).evaluate_program(&root)?;
    if args.verbose {
        println!("Computed the operation");
    }
    if args.show {
        println!("Operation:");
        println!("{}", program.show());
    }

    let result = program.result();
    let count = program.operations_count();

    if args.verbose {
        if args.interpret {
            println!("The interpreted result is `{}`", interpret(result));
            println!("The raw result is {result}");
        } else {
            println!("The result is {result}");
        }
        let plural = if count.is_one() { "" } else { "s" };
        println!("It took {} operation{plural} to compute the result", describe_count(count));
        println!("This whole process took {:?}", start.elapsed());
    } else if args.interpret {
        println!("{}", interpret(result));
    } else {
        println!("{result}");
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}
