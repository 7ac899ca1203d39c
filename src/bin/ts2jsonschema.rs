//! CLI front-end: reads one TypeScript file, writes one JSON Schema document
//! to standard output (spec §6.2). Argument parsing, `--doctor` diagnostics,
//! and stdout rendering are ambient stack built on top of the library's
//! public API — the compiler pipeline itself lives in `ts2jsonschema::*`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use ts2jsonschema::resolver::{DuplicatePolicy, FollowMode, ResolveOptions};
use ts2jsonschema::{EmitOptions, FileEmitOptions};

#[derive(Parser)]
#[command(
    name = "ts2jsonschema",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compiles a practical subset of TypeScript type declarations into a JSON Schema document",
    disable_version_flag = true
)]
struct Cli {
    /// TypeScript source file to convert.
    file: PathBuf,

    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Emit the given declaration as the schema root; the rest go under $defs.
    #[arg(short = 'r', long = "rootType")]
    root_type: Option<String>,

    /// Whether to prepend `$schema` to the root schema.
    #[arg(short = 's', long = "includeSchema", default_value_t = true)]
    include_schema: bool,

    /// URL used for `$schema` when `--includeSchema` is set.
    #[arg(long = "schemaVersion", default_value = "https://json-schema.org/draft/2020-12/schema")]
    schema_version: String,

    /// Set `additionalProperties: false` on object schemas that nothing else specifies.
    #[arg(long = "strictObjects")]
    strict_objects: bool,

    /// Fallback `additionalProperties` value when nothing more specific applies.
    #[arg(long = "additionalProperties")]
    additional_properties: Option<bool>,

    /// Include JSDoc-derived descriptions and constraints.
    #[arg(long = "includeJSDoc", default_value_t = true)]
    include_jsdoc: bool,

    /// Which imports the module resolver follows.
    #[arg(long = "followImports", value_enum, default_value_t = CliFollowMode::Local)]
    follow_imports: CliFollowMode,

    /// Directory the input file path is resolved against (defaults to cwd).
    #[arg(long = "baseDir")]
    base_dir: Option<PathBuf>,

    /// Emit a diagnostic JSON document instead of a schema; never exits non-zero.
    #[arg(long)]
    doctor: bool,

    /// Enable debug-level logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
enum CliFollowMode {
    None,
    Local,
    All,
}

impl From<CliFollowMode> for FollowMode {
    fn from(mode: CliFollowMode) -> Self {
        match mode {
            CliFollowMode::None => FollowMode::None,
            CliFollowMode::Local => FollowMode::Local,
            CliFollowMode::All => FollowMode::All,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.doctor {
        println!("{}", serde_json::to_string_pretty(&doctor_report(&cli)).expect("doctor report is always valid JSON"));
        return ExitCode::SUCCESS;
    }

    match convert(&cli) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn entry_path(cli: &Cli) -> PathBuf {
    match &cli.base_dir {
        Some(base) => base.join(&cli.file),
        None => cli.file.clone(),
    }
}

fn emit_options(cli: &Cli) -> EmitOptions<'static> {
    EmitOptions {
        include_schema: cli.include_schema,
        schema_version: cli.schema_version.clone(),
        strict_objects: cli.strict_objects,
        additional_properties: cli.additional_properties,
        root_type: cli.root_type.clone(),
        include_jsdoc: cli.include_jsdoc,
        define_name_transform: None,
        define_id: None,
    }
}

fn convert(cli: &Cli) -> Result<String> {
    let path = entry_path(cli);
    debug!(path = %path.display(), "converting");
    let options = FileEmitOptions {
        emit: emit_options(cli),
        resolve: ResolveOptions {
            follow: cli.follow_imports.into(),
            on_duplicate: DuplicatePolicy::Error,
        },
    };
    let schema = ts2jsonschema::to_json_schema_from_file(&path, &options).context("conversion failed")?;
    serde_json::to_string_pretty(&schema).context("failed to render schema as JSON")
}

/// Builds the `--doctor` diagnostic document (spec §6.2). A missing input
/// file is recorded here, not raised as an error — this function never fails.
fn doctor_report(cli: &Cli) -> serde_json::Value {
    use serde_json::json;

    let path = entry_path(cli);
    let absolute = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    let metadata = std::fs::metadata(&path).ok();
    let file_exists = metadata.is_some();

    let mut input = json!({
        "filePath": cli.file.display().to_string(),
        "absolutePath": absolute.display().to_string(),
        "fileExists": file_exists,
    });
    if let Some(meta) = &metadata {
        input["fileSize"] = json!(meta.len());
        if let Ok(modified) = meta.modified() {
            if let Ok(dt) = modified.duration_since(std::time::UNIX_EPOCH) {
                input["modified"] = json!(chrono::DateTime::<chrono::Utc>::from_timestamp(
                    dt.as_secs() as i64,
                    dt.subsec_nanos()
                )
                .map(|t| t.to_rfc3339()));
            }
        }
    }

    let options = json!({
        "rootType": cli.root_type,
        "includeSchema": cli.include_schema,
        "schemaVersion": cli.schema_version,
        "strictObjects": cli.strict_objects,
        "additionalProperties": cli.additional_properties,
        "includeJSDoc": cli.include_jsdoc,
        "followImports": match cli.follow_imports {
            CliFollowMode::None => "none",
            CliFollowMode::Local => "local",
            CliFollowMode::All => "all",
        },
        "baseDir": cli.base_dir,
    });

    let mut report = json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": {
            "runtimeVersion": env!("CARGO_PKG_VERSION"),
            "platform": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "cwd": std::env::current_dir().map(|p| p.display().to_string()).unwrap_or_default(),
        },
        "input": input,
        "options": options,
    });

    if !file_exists {
        report["readError"] = json!({ "message": format!("no such file: {}", path.display()) });
        return report;
    }

    match std::fs::read_to_string(&path) {
        Err(e) => {
            report["readError"] = json!({ "message": e.to_string() });
        }
        Ok(source) => {
            report["input"]["sourceLength"] = json!(source.len());
            report["input"]["sourceLines"] = json!(source.lines().count());
            report["input"]["source"] = json!(source);

            let options = FileEmitOptions {
                emit: emit_options(cli),
                resolve: ResolveOptions {
                    follow: cli.follow_imports.into(),
                    on_duplicate: DuplicatePolicy::Error,
                },
            };
            report["conversionResult"] = match ts2jsonschema::to_json_schema_from_file(&path, &options) {
                Ok(schema) => json!({ "success": true, "schema": schema }),
                Err(e) => json!({ "success": false, "error": { "message": e.to_string() } }),
            };
        }
    }

    report
}
