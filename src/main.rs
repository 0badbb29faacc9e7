use clap::{Parser as ClapParser, Subcommand};
use formula_lang::{
    Limits,
    cli::{self, CheckOptions, CheckResult, CliError},
    functions::standard_registry,
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(about = "Parse, type check and inspect spreadsheet field formulas")]
#[command(version)]
struct Cli {
    /// JSON file with parser limits
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a formula and print its type and dependencies
    Check {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,

        /// JSON file describing the table's fields
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't type check
        #[arg(long)]
        syntax_only: bool,
    },

    /// List the fields a formula references
    Deps {
        formula: Option<String>,
    },

    /// Print a formula in canonical form
    Fmt {
        formula: Option<String>,

        /// Spread nested calls over several lines
        #[arg(short, long)]
        pretty: bool,
    },

    /// Rename a field inside a formula
    Rename {
        formula: Option<String>,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Only rename lookup targets reached through this link field
        #[arg(long)]
        via: Option<String>,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a topic, category or function
    Doc {
        /// Topic name (use 'formula docs' to list topics)
        topic: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(verbose, std::env::var("RUST_LOG").ok()))
        .init();
}

/// A usable `RUST_LOG` wins over `-v`.
fn log_filter(verbose: u8, rust_log: Option<String>) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let limits = match &cli.config {
        Some(path) => Limits::load(path)?,
        None => Limits::default(),
    };

    match cli.command {
        Commands::Check {
            formula,
            schema,
            pretty,
            syntax_only,
        } => {
            let schema = schema.map(fs::read_to_string).transpose()?;
            let options = CheckOptions {
                formula: read_formula(formula)?,
                schema,
                limits,
                syntax_only,
            };
            match cli::execute_check(&options) {
                Ok(CheckResult::SyntaxValid { formula }) => {
                    println!("Syntax is valid: {}", formula)
                }
                Ok(result) => println!("{}", cli::to_json(&result, pretty)?),
                Err(CliError::Formula(e)) if !syntax_only => {
                    println!("{}", cli::to_json(&cli::error_to_json(&e)?, pretty)?);
                    std::process::exit(1);
                }
                Err(e) => return Err(e),
            }
        }
        Commands::Deps { formula } => {
            let deps = cli::execute_deps(&read_formula(formula)?, limits)?;
            for dep in deps {
                println!("{}", dep);
            }
        }
        Commands::Fmt { formula, pretty } => {
            println!("{}", cli::execute_fmt(&read_formula(formula)?, pretty, limits)?);
        }
        Commands::Rename {
            formula,
            from,
            to,
            via,
        } => {
            let formula = read_formula(formula)?;
            println!(
                "{}",
                cli::execute_rename(&formula, &from, &to, via.as_deref(), limits)?
            );
        }
        Commands::Docs => print!("{}", cli::get_docs_overview()),
        Commands::Doc { topic } => print!("{}", cli::get_topic(standard_registry(), &topic)?),
    }
    Ok(())
}

fn read_formula(formula: Option<String>) -> Result<String, CliError> {
    match formula {
        Some(f) => Ok(f),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}
