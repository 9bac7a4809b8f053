use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use om_eval::{ClassRegistry, EvalConfig, EvalFailure, Evaluator, Object, Value, DEFAULT_MAX_DEPTH};
use om_parser::parse_source;
use om_types::{Diagnostics, SourceFile};
use tracing::debug;


const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "om-tool", author, version, about = "Inspect and evaluate OM IR modules", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse and verify a module, printing its diagnostics as JSON.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List the classes of a module with their parameters and fields.
    Classes {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Instantiate a class and print its fields.
    Instantiate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "CLASS")]
        class: String,
        /// Actual parameters; integers where they parse as one, strings otherwise
        #[arg(value_name = "ARGS", allow_negative_numbers = true)]
        args: Vec<String>,
        /// Print the object as JSON
        #[arg(long)]
        json: bool,
        /// Maximum nesting of object instantiations
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

// ══════════════════════════════════════════════════════════════════════════════
// Loading
// ══════════════════════════════════════════════════════════════════════════════

fn read_source(path: &Path) -> anyhow::Result<SourceFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file '{}'", path.display()))?;
    Ok(SourceFile::new(path.display().to_string(), text))
}

/// Parse and verify a file into a registry.
fn load_registry(source: &SourceFile) -> Result<ClassRegistry, Diagnostics> {
    let module = parse_source(source)?;
    ClassRegistry::build_with_source(&module, source)
}

/// `42` → integer, anything else → string.
pub(crate) fn parse_actual(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::Integer(n),
        Err(_) => Value::String(raw.to_string()),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════════════════════

fn run_check(file: &Path) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let diagnostics = match load_registry(&source) {
        Ok(registry) => {
            debug!(classes = registry.len(), "module verified");
            Diagnostics::empty()
        }
        Err(diagnostics) => diagnostics,
    };
    println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    Ok(if diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_classes(file: &Path) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let registry = load_registry(&source)?;
    print!("{}", describe_classes(&registry));
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn describe_classes(registry: &ClassRegistry) -> String {
    let mut out = String::new();
    for class in registry.classes() {
        out.push_str(class.signature());
        out.push('\n');
        for field in class.fields() {
            out.push_str(&format!("  {}: {}\n", field.name, field.ty));
        }
    }
    out
}

fn run_instantiate(
    file: &Path,
    class: &str,
    args: &[String],
    json: bool,
    max_depth: usize,
) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let registry = load_registry(&source)?;
    let evaluator = Evaluator::from_registry(
        Arc::new(registry),
        EvalConfig::default().with_max_depth(max_depth),
    );

    let actuals: Vec<Value> = args.iter().map(|a| parse_actual(a)).collect();
    let object = evaluator.instantiate(class, actuals)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&object.to_json())?);
    } else {
        print!("{}", render_fields(&object));
    }
    Ok(ExitCode::SUCCESS)
}

/// One `name: value` line per field, in declaration order.
pub(crate) fn render_fields(object: &Object) -> String {
    object
        .fields()
        .map(|(name, value)| format!("{name}: {value}\n"))
        .collect()
}

fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    match args.command {
        Commands::Check { file } => run_check(&file),
        Commands::Classes { file } => run_classes(&file),
        Commands::Instantiate {
            file,
            class,
            args,
            json,
            max_depth,
        } => run_instantiate(&file, &class, &args, json, max_depth),
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run(CliArgs::parse()) {
        Ok(code) => code,
        Err(err) => {
            // Load and evaluation failures are already fully rendered.
            if err.downcast_ref::<Diagnostics>().is_some() || err.downcast_ref::<EvalFailure>().is_some() {
                eprintln!("{err}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
