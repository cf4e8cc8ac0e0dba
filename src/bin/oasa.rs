//! oasa CLI
//!
//! Command-line interface for inspecting OpenAPI documents, interpreting
//! payloads against their schemas, and assembling requests.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oasa::{load_document, load_json, Document, DocumentOptions, Operation};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oasa")]
#[command(about = "Inspect OpenAPI v3 documents and interpret payloads against them")]
#[command(version)]
struct Cli {
    /// Print diagnostics (unknown properties, discarded data) to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the operations of a document
    Operations {
        /// OpenAPI document (JSON)
        document: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the properties of a component schema
    Schema {
        /// OpenAPI document (JSON)
        document: PathBuf,

        /// Name under components/schemas
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Narrow a payload to the shape of a component schema
    Interpret {
        /// OpenAPI document (JSON)
        document: PathBuf,

        /// Payload file (JSON)
        payload: PathBuf,

        /// Name under components/schemas
        #[arg(long, short)]
        schema: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Assemble the HTTP request for an operation
    Request {
        /// OpenAPI document (JSON)
        document: PathBuf,

        /// operationId to build the request for
        #[arg(long, short)]
        op: String,

        /// Server URL (default: first server of the document)
        #[arg(long)]
        server: Option<String>,

        /// Parameter value, repeatable
        #[arg(long = "param", short, value_name = "NAME=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Content type of the body
        #[arg(long)]
        content_type: Option<String>,

        /// Body file (JSON)
        #[arg(long)]
        body: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let options = DocumentOptions::new().debug(cli.debug);

    let result = match cli.command {
        Commands::Operations { document, json } => run_operations(&document, options, json),
        Commands::Schema {
            document,
            name,
            json,
        } => run_schema(&document, options, &name, json),
        Commands::Interpret {
            document,
            payload,
            schema,
            pretty,
        } => run_interpret(&document, options, &payload, &schema, pretty),
        Commands::Request {
            document,
            op,
            server,
            params,
            content_type,
            body,
        } => run_request(
            &document,
            options,
            RequestArgs {
                op,
                server,
                params,
                content_type,
                body,
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Console diagnostics go through tracing; only install a subscriber when
/// asked to.
fn init_tracing(debug: bool) {
    if !debug && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let default = if debug { "oasa=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got \"{}\"", s)),
    }
}

fn open(path: &Path, options: DocumentOptions) -> Result<Document, u8> {
    load_document(path, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn print_json(value: &Value, pretty: bool) -> Result<(), u8> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    println!("{}", output);
    Ok(())
}

fn run_operations(path: &Path, options: DocumentOptions, json_output: bool) -> Result<(), u8> {
    let doc = open(path, options)?;
    let operations = doc.operations().map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json_output {
        let listed: Vec<Value> = operations
            .iter()
            .map(|op| {
                json!({
                    "method": op.method(),
                    "path": op.path(),
                    "operationId": op.id(),
                    "summary": op.summary(),
                })
            })
            .collect();
        return print_json(&Value::Array(listed), false);
    }

    for op in &operations {
        println!("{} /{} {}", op.method(), op.path(), op.id().unwrap_or("-"));
    }
    Ok(())
}

fn run_schema(
    path: &Path,
    options: DocumentOptions,
    name: &str,
    json_output: bool,
) -> Result<(), u8> {
    let doc = open(path, options)?;
    let cx = doc.context();
    let schema = match doc.schema(name) {
        Ok(Some(schema)) => schema,
        Ok(None) => {
            eprintln!("Error: no schema named \"{}\"", name);
            return Err(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e.exit_code() as u8);
        }
    };

    let report = |e: oasa::SchemaError| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    };
    let mut props = schema.all_props(&cx).map_err(report)?;
    props.extend(schema.additional_prop(&cx).map_err(report)?);
    let is_required = |name: &str| schema.required().iter().any(|r| *r == name);

    if json_output {
        let listed: Vec<Value> = props
            .iter()
            .map(|p| {
                json!({
                    "name": p.name(),
                    "type": p.schema_type().as_str(),
                    "required": is_required(p.name()),
                    "readOnly": p.read_only(),
                    "wildcard": p.is_wildcard(),
                })
            })
            .collect();
        return print_json(
            &json!({ "schema": name, "type": schema.schema_type().as_str(), "properties": listed }),
            false,
        );
    }

    println!("{} ({})", name, schema.schema_type());
    for p in &props {
        let mut flags = vec![if is_required(p.name()) {
            "required"
        } else {
            "optional"
        }];
        if p.read_only() {
            flags.push("read-only");
        }
        if p.is_wildcard() {
            flags.push("wildcard");
        }
        println!("  {}: {} [{}]", p.name(), p.schema_type(), flags.join(", "));
    }
    Ok(())
}

fn run_interpret(
    path: &Path,
    options: DocumentOptions,
    payload_path: &Path,
    name: &str,
    pretty: bool,
) -> Result<(), u8> {
    let doc = open(path, options)?;
    let payload = load_json(payload_path).map_err(|e| {
        eprintln!("Error loading payload: {}", e);
        e.exit_code() as u8
    })?;

    let cx = doc.context();
    let report = |e: oasa::SchemaError| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    };
    let schema = doc.schema(name).map_err(report)?.ok_or_else(|| {
        eprintln!("Error: no schema named \"{}\"", name);
        2u8
    })?;

    let interpreted = schema.interpret(&cx, &payload).map_err(report)?;
    let output = interpreted.map(|i| i.serialise()).unwrap_or(Value::Null);
    print_json(&output, pretty)
}

struct RequestArgs {
    op: String,
    server: Option<String>,
    params: Vec<(String, String)>,
    content_type: Option<String>,
    body: Option<PathBuf>,
}

fn run_request(path: &Path, options: DocumentOptions, args: RequestArgs) -> Result<(), u8> {
    let RequestArgs {
        op,
        server,
        params,
        content_type,
        body,
    } = args;
    let doc = open(path, options)?;
    let cx = doc.context();

    let report = |e: oasa::ComponentError| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    };
    let operation: Operation<'_> = doc.named_operation(&op).map_err(report)?.ok_or_else(|| {
        eprintln!("Error: no operation with id \"{}\"", op);
        2u8
    })?;

    let server = match server.or_else(|| doc.servers().first().cloned()) {
        Some(server) => server,
        None => {
            eprintln!("Error: document declares no servers, pass --server");
            return Err(2);
        }
    };

    let body = match body {
        Some(body_path) => Some(load_json(&body_path).map_err(|e| {
            eprintln!("Error loading body: {}", e);
            e.exit_code() as u8
        })?),
        None => None,
    };

    let values: Map<String, Value> = params
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    let request = operation
        .request(&cx, &server, &values, content_type.as_deref(), body.as_ref())
        .map_err(report)?;
    let output = serde_json::to_value(&request).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    print_json(&output, true)
}
