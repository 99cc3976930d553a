//! stacksift CLI
//!
//! Normalizes captured Node.js runtime error reports against the local
//! project tree and prints the result as JSON, YAML, a colorized console
//! block or a plain summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stacksift_core::{
    format_output, Config, ErrorInput, LogLevel, LogSink, OutputFormat, ProjectLayout, RawError,
    StackTracer,
};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Stack-trace normalization for Node.js projects
#[derive(Parser)]
#[command(name = "stacksift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Normalize runtime error reports into stable, source-annotated stacks")]
#[command(long_about = r#"
stacksift: Stack-Trace Normalization

Converts a raw runtime error (name, message, engine stack-trace text and
diagnostic fields) into a stable, structured, de-duplicated representation.
Frames are classified (project / dependency / runtime-internal / anonymous),
resolved against the enclosing project or monorepo workspace, annotated with
the referenced source lines and rendered for machines or humans.

Input formats:
  - JSON error report: {"name", "message", "stack", "code", "errno", ...}
  - Raw stack-trace text (the `trace` subcommand)

Output formats:
  - json (default when piped) - Pretty JSON record
  - ansi (default on a TTY)   - Colorized console block
  - yaml                      - YAML record
  - summary                   - Plain text summary

Examples:
  stacksift normalize report.json         # Normalize a captured report
  cat report.json | stacksift             # Same, from stdin
  stacksift trace crash.txt --name Error  # Raw stack text
  stacksift normalize report.json --format yaml
"#)]
struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON error report to normalize (default: stdin)
    report: Option<PathBuf>,

    /// Output format (default: ansi on a TTY, json otherwise)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormatArg>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Project root (default: discovered from the working directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Skip source-line annotation output
    #[arg(long)]
    no_code: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a JSON error report
    Normalize {
        /// Path to the report (default: stdin)
        report: Option<PathBuf>,
    },

    /// Normalize raw stack-trace text
    Trace {
        /// Path to the stack text (default: stdin)
        file: Option<PathBuf>,

        /// Error name for the record header
        #[arg(long, default_value = "Error")]
        name: String,

        /// Error message for the record header
        #[arg(long, default_value = "No message provided")]
        message: String,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormatArg {
    Json,
    Yaml,
    Ansi,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let layout = match &args.root {
        Some(root) => ProjectLayout::with_root(root.clone()),
        None => ProjectLayout::detect(),
    };
    let config = Config::load_or_default(&layout.effective_root());

    let sink = Arc::new(LogSink::new(&layout));
    if config.log.enabled {
        sink.enable();
    }

    let tracer = Arc::new(StackTracer::new(layout));
    if config.stacktrace.enabled {
        tracer.enable();
    }
    tracer.install_panic_hook(Arc::clone(&sink));

    let input = read_input(&args)?;
    let rendered = tracer.process(input).await;
    sink.append(LogLevel::Error, &rendered.log_text).await;

    let mut record = rendered.record;
    if args.no_code {
        if let stacksift_core::StackInfo::Frames(frames) = &mut record.stack {
            for frame in frames.iter_mut() {
                frame.code = None;
            }
        }
    }

    let format = resolve_format(&args);
    let output = format_output(&record, format).context("Failed to format output")?;
    write_output(&output, args.output.as_ref())?;

    Ok(())
}

/// Build the normalizer input from the selected subcommand
fn read_input(args: &Args) -> Result<ErrorInput> {
    match &args.command {
        Some(Commands::Trace {
            file,
            name,
            message,
        }) => {
            let stack = read_source(file.as_ref())?;
            Ok(RawError::new(name.clone(), message.clone())
                .with_stack(stack)
                .into())
        }
        Some(Commands::Normalize { report }) => parse_report(report.as_ref()),
        None => parse_report(args.report.as_ref()),
    }
}

fn parse_report(path: Option<&PathBuf>) -> Result<ErrorInput> {
    let raw = read_source(path)?;
    let report: RawError =
        serde_json::from_str(&raw).context("Failed to parse error report JSON")?;
    Ok(report.into())
}

fn read_source(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Explicit format wins; otherwise ANSI on a TTY, JSON when piped
fn resolve_format(args: &Args) -> OutputFormat {
    match &args.format {
        Some(format) => format.clone().into(),
        None if atty::is(atty::Stream::Stdout) => OutputFormat::Ansi,
        None => OutputFormat::Json,
    }
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, output).context("Failed to write output file")?;
    } else {
        println!("{}", output);
    }
    Ok(())
}
