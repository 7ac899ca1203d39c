//! Compiles a practical subset of TypeScript type declarations into JSON
//! Schema (2020-12 draft): tokenize → parse → emit, plus a cross-file module
//! resolver that assembles declarations from a set of source files.
//!
//! This crate is the compiler core only (spec §1). A CLI front-end consumes
//! it from `src/bin/ts2jsonschema.rs`; argument parsing, `--doctor`
//! diagnostics, and stdout rendering live there, not here.

pub mod ast;
pub mod emitter;
pub mod error;
pub mod imports;
pub mod jsdoc;
pub mod parser;
pub mod resolver;
pub mod token;

pub use ast::{Declaration, DeclarationKind, TypeNode};
pub use emitter::{EmitOptions, Schema};
pub use error::{Error, Result};
pub use resolver::{DuplicatePolicy, FileReader, FollowMode, ModuleResolver, ResolveOptions, StdFileReader};

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Options for the file-based entry points: an `EmitOptions` plus the
/// resolver behavior (follow mode, duplicate-declaration policy) the
/// distilled spec's single-string API doesn't need (spec §6.1, §4.4).
#[derive(Default)]
pub struct FileEmitOptions<'a> {
    pub emit: EmitOptions<'a>,
    pub resolve: ResolveOptions,
}

/// The set of entry files `toJsonSchemasFromFiles` operates over: either an
/// explicit list, or a glob pattern expanded against the current working
/// directory (spec §6.1).
pub enum FileSet {
    Paths(Vec<PathBuf>),
    Glob(String),
}

impl FileSet {
    fn expand(&self) -> Result<Vec<PathBuf>> {
        match self {
            FileSet::Paths(paths) => Ok(paths.clone()),
            FileSet::Glob(pattern) => {
                let paths = glob::glob(pattern).map_err(|e| Error::Resolution {
                    specifier: format!("{pattern} ({e})"),
                    importer: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
                })?;
                Ok(paths.filter_map(std::result::Result::ok).collect())
            }
        }
    }
}

impl From<Vec<PathBuf>> for FileSet {
    fn from(paths: Vec<PathBuf>) -> Self {
        FileSet::Paths(paths)
    }
}

impl From<&str> for FileSet {
    fn from(pattern: &str) -> Self {
        FileSet::Glob(pattern.to_string())
    }
}

/// Exposes the AST for inspection (`parseDeclarations`, spec §6.1):
/// tokenizes then parses `source` with no module resolution.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>> {
    parser::parse(token::tokenize(source))
}

/// `toJsonSchema`: source string → single-document schema (spec §6.1,
/// §4.5.2.A).
pub fn to_json_schema(source: &str, options: &EmitOptions) -> Result<Schema> {
    let declarations = parse_declarations(source)?;
    emitter::emit(&declarations, options)
}

/// `toJsonSchemas`: source string → batch mapping (spec §6.1, §4.5.2.B).
pub fn to_json_schemas(source: &str, options: &EmitOptions) -> Result<IndexMap<String, Schema>> {
    let declarations = parse_declarations(source)?;
    emitter::emit_all(&declarations, options)
}

/// `toJsonSchemaFromFile` using `std::fs` for reads.
pub fn to_json_schema_from_file(entry: impl AsRef<Path>, options: &FileEmitOptions) -> Result<Schema> {
    to_json_schema_from_file_with_reader(entry, options, &StdFileReader)
}

/// `toJsonSchemaFromFile` parameterized over a `FileReader`, so callers
/// (and tests) can substitute an in-memory double for the resolver's reads.
pub fn to_json_schema_from_file_with_reader(
    entry: impl AsRef<Path>,
    options: &FileEmitOptions,
    reader: &dyn FileReader,
) -> Result<Schema> {
    let declarations = ModuleResolver::new(reader, options.resolve).resolve(entry.as_ref())?;
    emitter::emit(&declarations, &options.emit)
}

/// `toJsonSchemasFromFile` using `std::fs` for reads.
pub fn to_json_schemas_from_file(
    entry: impl AsRef<Path>,
    options: &FileEmitOptions,
) -> Result<IndexMap<String, Schema>> {
    to_json_schemas_from_file_with_reader(entry, options, &StdFileReader)
}

pub fn to_json_schemas_from_file_with_reader(
    entry: impl AsRef<Path>,
    options: &FileEmitOptions,
    reader: &dyn FileReader,
) -> Result<IndexMap<String, Schema>> {
    let declarations = ModuleResolver::new(reader, options.resolve).resolve(entry.as_ref())?;
    emitter::emit_all(&declarations, &options.emit)
}

/// `toJsonSchemasFromFiles`: an explicit path list or glob pattern, each
/// entry resolved and merged into one declaration set sharing a single
/// visited-path table (so files imported by more than one entry are read
/// once), then emitted in batch mode (spec §6.1).
pub fn to_json_schemas_from_files(
    entries: impl Into<FileSet>,
    options: &FileEmitOptions,
) -> Result<IndexMap<String, Schema>> {
    to_json_schemas_from_files_with_reader(entries, options, &StdFileReader)
}

pub fn to_json_schemas_from_files_with_reader(
    entries: impl Into<FileSet>,
    options: &FileEmitOptions,
    reader: &dyn FileReader,
) -> Result<IndexMap<String, Schema>> {
    let paths = entries.into().expand()?;
    let declarations = ModuleResolver::new(reader, options.resolve).resolve_entries(&paths)?;
    emitter::emit_all(&declarations, &options.emit)
}
