//! Core logic of the `scim-patch` binary.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use scim_schema::{core_group_schema, core_user_schema, enterprise_user_extension, Schema, SchemaError};
use serde_json::{json, Value};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::codec::parse_request;
use crate::logger::TracingLogger;
use crate::patcher::{Patcher, PatcherOptions};
use crate::types::PatchError;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("resource is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("resource must be a JSON object")]
    NotAnObject,
    #[error("{path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
    #[error(transparent)]
    Patch(#[from] PatchError),
}

// ── Arguments ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceType {
    /// Core User with the Enterprise User extension
    User,
    Group,
}

/// Apply a SCIM PATCH request to a resource document.
#[derive(Parser, Debug)]
#[command(name = "scim-patch", version, about)]
pub struct Args {
    /// PatchOp request JSON, or `@FILE` to read it from a file
    #[arg(value_name = "REQUEST")]
    pub request: String,

    /// Resource document (reads from stdin if not provided)
    #[arg(short, long, value_name = "FILE")]
    pub resource: Option<PathBuf>,

    /// Built-in schema set the resource is typed by
    #[arg(short = 't', long, value_enum, default_value_t = ResourceType::User)]
    pub resource_type: ResourceType,

    /// Additional extension schema document (RFC 7643 §7), repeatable
    #[arg(short, long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,

    /// Wrap the output as {"changed": .., "results": [..], "resource": ..}
    #[arg(short, long)]
    pub changed: bool,

    /// Log engine decisions to stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "scim_patch=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a subscriber may already be set when embedded; keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn load_schema(path: &Path) -> Result<Schema, CliError> {
    Schema::from_json(&read_file(path)?).map_err(|source| CliError::Schema {
        path: path.display().to_string(),
        source,
    })
}

/// Builds the patcher for the selected resource type plus extra extensions.
pub fn build_patcher(resource_type: ResourceType, extra: &[PathBuf]) -> Result<Patcher, CliError> {
    let (schema, mut extensions) = match resource_type {
        ResourceType::User => (core_user_schema(), vec![enterprise_user_extension()]),
        ResourceType::Group => (core_group_schema(), vec![]),
    };
    for path in extra {
        extensions.push(load_schema(path)?);
    }
    Ok(Patcher::new(
        schema,
        extensions,
        PatcherOptions::default().with_logger(TracingLogger),
    ))
}

/// Applies `request` to `resource` and renders the output document.
pub fn patch_document(
    patcher: &Patcher,
    resource: &str,
    request: &str,
    with_changed: bool,
) -> Result<Value, CliError> {
    let mut resource = match serde_json::from_str(resource)? {
        Value::Object(map) => map,
        _ => return Err(CliError::NotAnObject),
    };
    let ops = parse_request(request)?;
    tracing::debug!(count = ops.len(), "applying operations");
    let result = patcher.apply_ops(&ops, &mut resource)?;

    if with_changed {
        Ok(json!({
            "changed": result.changed,
            "results": result.results,
            "resource": resource,
        }))
    } else {
        Ok(Value::Object(resource))
    }
}

pub fn run(args: &Args) -> Result<Value, CliError> {
    let patcher = build_patcher(args.resource_type, &args.schemas)?;

    let request = match args.request.strip_prefix('@') {
        Some(path) => read_file(Path::new(path))?,
        None => args.request.clone(),
    };
    let resource = match &args.resource {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            buf
        }
    };

    patch_document(&patcher, resource.trim(), &request, args.changed)
}
