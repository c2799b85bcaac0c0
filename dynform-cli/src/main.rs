use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dynform::{
    DocumentFormat, DynamicForm, DynamicFormContext, ErrorOverlay, FormEdit, FormOptions,
    OptionResolver, OutputDestination, OutputOptions, StaticInventory, emit, form_lines,
    manifest_schema, parse_document_str, plain_text,
};

#[derive(Debug, Parser)]
#[command(
    name = "dynform",
    version,
    about = "Render field manifests as configuration forms and apply edits to their values"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a manifest against a value and print the form
    Render(RenderArgs),
    /// Apply edits to a value and write the resulting tree
    Apply(ApplyArgs),
    /// Print the JSON Schema of the manifest document format
    Schema,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Manifest spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'm', long = "manifest", value_name = "SPEC")]
    manifest: String,

    /// Value spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'c', long = "value", alias = "config", value_name = "SPEC")]
    value: Option<String>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Validation messages keyed by field path, as a JSON object
    #[arg(long = "errors", value_name = "SPEC")]
    errors: Option<String>,

    /// JSON Schema to validate the value against; its errors join --errors
    #[arg(long = "validate", value_name = "SPEC")]
    validate: Option<String>,

    /// Context object ({integrationName, organizationId, canvasId})
    #[arg(long = "context", value_name = "SPEC")]
    context: Option<String>,

    /// Inventory document serving resource lookups
    #[arg(long = "inventory", value_name = "SPEC")]
    inventory: Option<String>,

    /// Render every field read-only
    #[arg(long = "disabled")]
    disabled: bool,

    /// Print the view tree as JSON instead of text
    #[arg(long = "json")]
    json: bool,

    /// Text layout width
    #[arg(long = "width", value_name = "COLUMNS", default_value_t = 80)]
    width: u16,
}

#[derive(Debug, Args)]
struct ApplyArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Edit spec: one edit object or an array of them. Repeatable.
    #[arg(short = 'e', long = "edit", value_name = "SPEC", action = ArgAction::Append, required = true)]
    edits: Vec<String>,

    /// Output destinations ("-" writes to stdout). Defaults to stdout.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(args) => render(args).await,
        Command::Apply(args) => apply(args),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&manifest_schema())?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn render(args: RenderArgs) -> Result<()> {
    ensure_single_stdin([
        Some(args.input.manifest.as_str()),
        args.input.value.as_deref(),
        args.errors.as_deref(),
        args.validate.as_deref(),
        args.context.as_deref(),
        args.inventory.as_deref(),
    ])?;

    let form = load_form(&args.input.manifest)?;
    let value = load_optional(args.input.value.as_deref(), "value")?.unwrap_or(Value::Null);

    let mut errors = match load_optional(args.errors.as_deref(), "errors")? {
        Some(doc) => serde_json::from_value::<ErrorOverlay>(doc)
            .wrap_err("errors must be an object of path -> message")?,
        None => ErrorOverlay::new(),
    };
    if let Some(schema) = load_optional(args.validate.as_deref(), "validation schema")? {
        let validator = jsonschema::validator_for(&schema)
            .map_err(|err| eyre!("invalid validation schema: {err}"))?;
        errors.merge(ErrorOverlay::from_validator(&validator, &value));
    }

    let context = match load_optional(args.context.as_deref(), "context")? {
        Some(doc) => serde_json::from_value::<DynamicFormContext>(doc)
            .wrap_err("context must be an object")?,
        None => DynamicFormContext::default(),
    };
    let form = form.with_options(
        FormOptions::default()
            .with_context(context)
            .with_disabled(args.disabled),
    );

    let view = match load_optional(args.inventory.as_deref(), "inventory")? {
        Some(inventory) => {
            let mut resolver = OptionResolver::current(Arc::new(StaticInventory::new(inventory)))?;
            form.render_with(&value, &errors, &mut resolver);
            resolver.settle().await;
            debug!(lookups = resolver.lookup_count(), "resource lookups settled");
            form.render_with(&value, &errors, &mut resolver)
        }
        None => form.render(&value, &errors),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", plain_text(&form_lines(&view, args.width)));
    }
    Ok(())
}

fn apply(args: ApplyArgs) -> Result<()> {
    let mut specs = vec![Some(args.input.manifest.as_str()), args.input.value.as_deref()];
    specs.extend(args.edits.iter().map(|spec| Some(spec.as_str())));
    ensure_single_stdin(specs)?;

    let form = load_form(&args.input.manifest)?;
    let value = load_optional(args.input.value.as_deref(), "value")?
        .unwrap_or_else(|| Value::Object(Default::default()));

    let mut edits = Vec::new();
    for spec in &args.edits {
        let doc = load_value(spec, "edit")?;
        let parsed = match doc {
            Value::Array(_) => serde_json::from_value::<Vec<FormEdit>>(doc),
            other => serde_json::from_value::<FormEdit>(other).map(|edit| vec![edit]),
        };
        edits.extend(parsed.wrap_err_with(|| format!("invalid edit '{spec}'"))?);
    }
    debug!(count = edits.len(), "applying edits");

    let next = form.apply_all(&value, &edits)?;
    emit(&next, &build_output_options(&args)?).map_err(Report::msg)
}

fn load_form(spec: &str) -> Result<DynamicForm> {
    let document = load_value(spec, "manifest")?;
    DynamicForm::from_document(&document).map_err(Report::msg)
}

fn build_output_options(args: &ApplyArgs) -> Result<OutputOptions> {
    let destinations = args
        .outputs
        .iter()
        .map(|raw| OutputDestination::parse(raw))
        .collect();
    let options = OutputOptions::for_destinations(destinations).map_err(Report::msg)?;
    Ok(options.with_pretty(!args.no_pretty))
}

fn ensure_single_stdin<'a>(specs: impl IntoIterator<Item = Option<&'a str>>) -> Result<()> {
    let stdin = specs.into_iter().flatten().filter(|spec| *spec == "-").count();
    if stdin > 1 {
        return Err(eyre!("only one input can be read from stdin"));
    }
    Ok(())
}

fn load_optional(spec: Option<&str>, label: &str) -> Result<Option<Value>> {
    spec.map(|spec| load_value(spec, label)).transpose()
}

fn load_value(spec: &str, label: &str) -> Result<Value> {
    if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        return parse_contents(&buffer, DocumentFormat::default(), label);
    }

    let path = Path::new(spec);
    match fs::read_to_string(path) {
        Ok(contents) => {
            let format = DocumentFormat::from_extension(path).unwrap_or_default();
            parse_contents(&contents, format, label)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound || looks_inline(spec) => {
            parse_contents(spec, DocumentFormat::default(), &format!("inline {label}"))
        }
        Err(err) => Err(Report::new(err)
            .wrap_err(format!("failed to load {label} from {}", path.display()))),
    }
}

/// Inline JSON payloads can be too long to be checked as a path.
fn looks_inline(spec: &str) -> bool {
    matches!(spec.trim_start().chars().next(), Some('{' | '['))
}

/// Parse with the hinted format first, then every other enabled one.
fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(eyre!(
                "failed to parse {label}: tried {} (first error: {primary:#})",
                format_list()
            ))
        }
    }
}

fn format_list() -> String {
    DocumentFormat::available_formats()
        .into_iter()
        .map(|format| format.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn inline_payloads_parse_when_no_file_exists() {
        let value = load_value(r#"{"fields": []}"#, "manifest").expect("inline");
        assert_eq!(value, json!({"fields": []}));
    }

    #[test]
    fn long_inline_payloads_are_not_paths() {
        let spec = format!(r#"{{"fields": [], "displayName": "{}"}}"#, "x".repeat(400));
        let value = load_value(&spec, "manifest").expect("inline");
        assert_eq!(value["fields"], json!([]));
    }

    #[test]
    fn rejects_two_stdin_inputs() {
        assert!(ensure_single_stdin([Some("-"), None, Some("-")]).is_err());
        assert!(ensure_single_stdin([Some("-"), Some("a.json")]).is_ok());
    }
}
