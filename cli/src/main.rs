mod config;
mod error;
mod model_file;
mod script;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_builder_core::{Diagnostic, SchemaDefinition, SchemaState};
use tracing::info;

use crate::config::BuilderConfig;
use crate::model_file::{ModelFormat, load_model, save_model, write_model};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SCHEMA_BUILDER_LOG";

#[derive(Debug, Parser)]
#[command(name = "schema-builder")]
#[command(about = "Compose and check structured-output JSON Schemas")]
#[command(version)]
struct Cli {
    /// YAML configuration file (default: .schema-builder.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a model file into a structured-output JSON Schema.
    Compile(CompileArgs),
    /// Report validation diagnostics for a model file.
    Validate(ValidateArgs),
    /// Replay an edit script against a model and print the result.
    Apply(ApplyArgs),
    /// Print an empty model to start from.
    Init(InitArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Top-level schema name (overrides the configuration).
    #[arg(long)]
    name: Option<String>,
    /// Mark the compiled schema as strict.
    #[arg(long, overrides_with = "no_strict")]
    strict: bool,
    /// Mark the compiled schema as non-strict.
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,
}

impl SessionArgs {
    fn strict_override(&self) -> Option<bool> {
        if self.strict {
            Some(true)
        } else if self.no_strict {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// Model file (.json, .yaml or .yml).
    model: PathBuf,
    #[command(flatten)]
    session: SessionArgs,
    /// Refuse to print output when the model has diagnostics or the name is invalid.
    #[arg(long)]
    check: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Model file (.json, .yaml or .yml).
    model: PathBuf,
    /// Print diagnostics as a JSON array.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// Starting model file; an empty model when omitted.
    model: Option<PathBuf>,
    /// Edit script (YAML or JSON list of operations).
    #[arg(long)]
    script: PathBuf,
    /// Write the edited model to this file.
    #[arg(long)]
    output: Option<PathBuf>,
    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: ModelFormat,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Compile(args) => run_compile(cli.config.as_deref(), args),
        Command::Validate(args) => run_validate(args),
        Command::Apply(args) => run_apply(cli.config.as_deref(), args),
        Command::Init(args) => run_init(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<(), String> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {e}"))
}

fn run_compile(config_path: Option<&Path>, args: CompileArgs) -> Result<(), String> {
    let config = BuilderConfig::resolve(config_path).map_err(|e| e.to_string())?;
    let schema = load_model(&args.model).map_err(|e| e.to_string())?;
    let state = build_session(schema, &config, &args.session);
    info!(model = %args.model.display(), name = state.schema_name(), "Compiling schema");

    if args.check {
        let json = state.export_json().map_err(|e| {
            print_diagnostics(&state.diagnostics());
            e.to_string()
        })?;
        println!("{json}");
        return Ok(());
    }

    for diagnostic in state.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }
    println!("{}", state.compiled_json());
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let schema = load_model(&args.model).map_err(|e| e.to_string())?;
    let diagnostics = schema_builder_core::validate_schema(&schema);

    if args.json {
        let json = serde_json::to_string_pretty(&diagnostics).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if diagnostics.is_empty() {
        println!(
            "Validated {} with {} root propert{}.",
            args.model.display(),
            schema.properties.len(),
            if schema.properties.len() == 1 { "y" } else { "ies" }
        );
    } else {
        print_diagnostics(&diagnostics);
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(format!("{} validation error(s)", diagnostics.len()))
    }
}

fn run_apply(config_path: Option<&Path>, args: ApplyArgs) -> Result<(), String> {
    let config = BuilderConfig::resolve(config_path).map_err(|e| e.to_string())?;
    let schema = match &args.model {
        Some(path) => load_model(path).map_err(|e| e.to_string())?,
        None => SchemaDefinition::new(),
    };
    let ops = script::load_script(&args.script).map_err(|e| e.to_string())?;

    let mut state = build_session(schema, &config, &args.session);
    let summary = script::replay(&mut state, &ops);
    info!(
        applied = summary.applied,
        ignored = summary.ignored,
        "Replayed edit script"
    );

    let rendered = state.render();
    println!("{}", rendered.json);
    print_diagnostics(&rendered.diagnostics);
    eprintln!("Applied: {}, Ignored: {}", summary.applied, summary.ignored);

    if let Some(output) = &args.output {
        save_model(output, state.schema()).map_err(|e| e.to_string())?;
        info!(path = %output.display(), "Wrote edited model");
    }
    Ok(())
}

fn run_init(args: InitArgs) -> Result<(), String> {
    let mut stdout = std::io::stdout().lock();
    write_model(&mut stdout, &SchemaDefinition::new(), args.format).map_err(|e| e.to_string())?;
    if args.format == ModelFormat::Json {
        writeln!(stdout).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Builds a session, letting flags override the configuration.
fn build_session(
    schema: SchemaDefinition,
    config: &BuilderConfig,
    args: &SessionArgs,
) -> SchemaState {
    let strict = args.strict_override().unwrap_or(config.strict);
    let name = args.name.clone().unwrap_or_else(|| config.schema_name.clone());

    let mut state = SchemaState::new(schema, strict).with_schema_name(name);
    if let Some(allowed) = config.additional_properties {
        state.set_additional_properties(allowed);
    }
    state
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}
