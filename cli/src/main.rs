mod config;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use emitter::{CompositeResult, Interpreter, detect_target};

const SUBCOMMANDS: &[&str] = &["run", "test", "detect", "help"];

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "WAHY_LOG";

#[derive(Parser)]
#[command(name = "wahy", version, about = "Wahy to HTML/CSS/JavaScript translator")]
struct Cli {
    /// Disable colored diagnostic output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a Wahy source file into a web page
    Run(RunArgs),

    /// Run .test.wahy conformance files
    Test(TestArgs),

    /// Guess whether a file targets HTML, CSS, JavaScript or a mix
    Detect(DetectArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Wahy source file
    file: PathBuf,

    /// Print the full result as JSON instead of the document
    #[arg(long, conflicts_with = "html_only")]
    json: bool,

    /// Print only the HTML emitter's output, without CSS/JS injection
    #[arg(long)]
    html_only: bool,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (defaults to wahy.toml next to the source)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.wahy file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

#[derive(clap::Args)]
struct DetectArgs {
    /// Wahy source file
    file: PathBuf,
}

fn main() {
    init_tracing();

    // `wahy file.wahy` is shorthand for `wahy run file.wahy`.
    let mut args: Vec<String> = std::env::args().collect();
    let first_positional = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, a)| !a.starts_with('-'))
        .map(|(index, a)| (index, a.clone()));
    if let Some((index, first)) = first_positional {
        if !SUBCOMMANDS.contains(&first.as_str()) {
            args.insert(index, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                return;
            }
            let exit_code =
                test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
        Command::Detect(detect_args) => {
            let source = read_source(&detect_args.file);
            println!("{}", detect_target(&source));
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn do_run(args: RunArgs, no_color: bool) {
    let source = read_source(&args.file);

    let config = match config::load_config(args.config.as_deref(), &args.file) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(1);
        }
    };

    let interpreter = Interpreter::new(config);
    debug!(config = ?interpreter.config(), file = %args.file.display(), "translating");
    let result = interpreter.interpret(&source);

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source);
    emit_diagnostics(&files, file_id, &result, no_color);

    let rendered = if args.json {
        result.to_json()
    } else if args.html_only {
        result.html.clone().unwrap_or_default()
    } else {
        result.combined_output.clone().unwrap_or_default()
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, format!("{}\n", rendered)) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
        None => println!("{}", rendered),
    }

    if !result.success {
        process::exit(1);
    }
}

/// Render every diagnostic against the source. CSS and JavaScript errors
/// arrive here already downgraded to warnings.
fn emit_diagnostics(
    files: &SimpleFiles<String, String>,
    file_id: usize,
    result: &CompositeResult,
    no_color: bool,
) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    for (target, line_diagnostic) in result.diagnostics() {
        let diagnostic = line_diagnostic
            .to_diagnostic(file_id)
            .with_notes(vec![format!("in the {} section", target)]);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }

    // Rejections happen before any emitter runs and carry no line.
    if result.sections.is_empty() {
        if let Some(error) = &result.error {
            eprintln!("error: {}", error);
        }
    }
}
