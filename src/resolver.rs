//! Cross-file module resolution (spec §4.4): walks imports from an entry
//! file, merging a deduplicated declaration list across every transitively
//! reachable source file.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::ast::Declaration;
use crate::error::{Error, Result};
use crate::imports::{self, ImportStatement};

/// Behavior the resolver consumes for reading source files — swapped for an
/// in-memory double in tests, `StdFileReader` in the file-based API entry
/// points.
pub trait FileReader {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
}

pub struct StdFileReader;

impl FileReader for StdFileReader {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowMode {
    None,
    Local,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Error,
    Warn,
    Silent,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub follow: FollowMode,
    pub on_duplicate: DuplicatePolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            follow: FollowMode::Local,
            on_duplicate: DuplicatePolicy::Error,
        }
    }
}

pub struct ModuleResolver<'a> {
    reader: &'a dyn FileReader,
    options: ResolveOptions,
    visited: HashSet<PathBuf>,
    declarations: Vec<Declaration>,
    seen_names: HashMap<String, PathBuf>,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(reader: &'a dyn FileReader, options: ResolveOptions) -> Self {
        ModuleResolver {
            reader,
            options,
            visited: HashSet::new(),
            declarations: Vec::new(),
            seen_names: HashMap::new(),
        }
    }

    /// Resolves `entry`, returning the merged declaration list in discovery
    /// order.
    pub fn resolve(mut self, entry: &Path) -> Result<Vec<Declaration>> {
        let abs = normalize_entry(entry);
        self.visit(&abs)?;
        Ok(self.declarations)
    }

    /// Resolves each of `entries` in turn, sharing one visited-path table and
    /// one merged declaration list across all of them — a file imported by
    /// two different entries is read once (`toJsonSchemasFromFiles`, spec
    /// §6.1).
    pub fn resolve_entries(mut self, entries: &[PathBuf]) -> Result<Vec<Declaration>> {
        for entry in entries {
            let abs = normalize_entry(entry);
            self.visit(&abs)?;
        }
        Ok(self.declarations)
    }

    fn visit(&mut self, abs_path: &Path) -> Result<()> {
        if self.visited.contains(abs_path) {
            return Ok(());
        }
        self.visited.insert(abs_path.to_path_buf());

        tracing::debug!(path = %abs_path.display(), "resolving module");
        let content = self.reader.read_to_string(abs_path)?;
        let tokens = crate::token::tokenize(&content);
        let import_statements = imports::extract_imports(&tokens);
        let mut decls = crate::parser::parse(tokens)?;
        for decl in &mut decls {
            decl.source_file = Some(abs_path.to_path_buf());
        }
        self.merge(decls, abs_path)?;

        let base_dir = abs_path.parent().unwrap_or_else(|| Path::new("."));
        for import in &import_statements {
            if let Some(resolved) = self.resolve_import_path(base_dir, import)? {
                self.visit(&resolved)?;
            }
        }
        Ok(())
    }

    fn merge(&mut self, decls: Vec<Declaration>, file: &Path) -> Result<()> {
        for decl in decls {
            if let Some(first) = self.seen_names.get(&decl.name) {
                match self.options.on_duplicate {
                    DuplicatePolicy::Error => {
                        return Err(Error::DuplicateDeclaration {
                            name: decl.name,
                            first: first.clone(),
                            second: file.to_path_buf(),
                        });
                    }
                    DuplicatePolicy::Warn => {
                        tracing::warn!(
                            name = %decl.name,
                            kept_from = %first.display(),
                            discarded_from = %file.display(),
                            "duplicate declaration"
                        );
                        continue;
                    }
                    DuplicatePolicy::Silent => continue,
                }
            }
            self.seen_names.insert(decl.name.clone(), file.to_path_buf());
            self.declarations.push(decl);
        }
        Ok(())
    }

    fn resolve_import_path(&self, base_dir: &Path, import: &ImportStatement) -> Result<Option<PathBuf>> {
        let specifier = &import.module_path;
        let is_relative = specifier.starts_with("./") || specifier.starts_with("../");

        match (self.options.follow, is_relative) {
            (FollowMode::None, _) => Ok(None),
            (FollowMode::Local, false) => Ok(None),
            (FollowMode::Local, true) | (FollowMode::All, true) => {
                let candidate = lexically_normalize(&base_dir.join(specifier));
                resolve_extension(self.reader, &candidate)
                    .map(Some)
                    .ok_or_else(|| Error::Resolution {
                        specifier: specifier.clone(),
                        importer: base_dir.to_path_buf(),
                    })
            }
            (FollowMode::All, false) => resolve_bare_specifier(self.reader, base_dir, specifier)
                .map(Some)
                .ok_or_else(|| Error::Resolution {
                    specifier: specifier.clone(),
                    importer: base_dir.to_path_buf(),
                }),
        }
    }
}

/// TypeScript-style extension resolution: try the path as-is, then with
/// `.ts`/`.tsx`/`.d.ts` appended, then `index.ts`/`index.tsx`/`index.d.ts`
/// under it as a directory.
fn resolve_extension(reader: &dyn FileReader, base: &Path) -> Option<PathBuf> {
    let append = |ext: &str| -> PathBuf {
        let mut s = base.as_os_str().to_os_string();
        s.push(".");
        s.push(ext);
        PathBuf::from(s)
    };
    let candidates = [
        base.to_path_buf(),
        append("ts"),
        append("tsx"),
        append("d.ts"),
        base.join("index.ts"),
        base.join("index.tsx"),
        base.join("index.d.ts"),
    ];
    candidates.into_iter().find(|c| reader.exists(c))
}

fn resolve_bare_specifier(reader: &dyn FileReader, start_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let (pkg_name, sub_path) = split_specifier(specifier);
    let mut dir = start_dir.to_path_buf();
    loop {
        let pkg_dir = dir.join("node_modules").join(&pkg_name);
        if let Some(resolved) = resolve_within_package(reader, &pkg_dir, sub_path.as_deref()) {
            return Some(resolved);
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => break,
        }
    }
    None
}

fn split_specifier(specifier: &str) -> (String, Option<String>) {
    if let Some(rest) = specifier.strip_prefix('@') {
        let mut parts = rest.splitn(2, '/');
        let scope_name = parts.next().unwrap_or("");
        let after_name = parts.next().unwrap_or("");
        let mut sub_parts = after_name.splitn(2, '/');
        let name = sub_parts.next().unwrap_or("");
        let sub = sub_parts.next();
        (format!("@{scope_name}/{name}"), sub.map(str::to_string))
    } else {
        let mut parts = specifier.splitn(2, '/');
        let name = parts.next().unwrap_or(specifier).to_string();
        let sub = parts.next();
        (name, sub.map(str::to_string))
    }
}

/// `package.json` resolution order: `exports` map (`types` condition), then
/// `types`/`typings`, then `main` with a sibling `.d.ts`, else `index.d.ts`.
fn resolve_within_package(reader: &dyn FileReader, pkg_dir: &Path, sub_path: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = resolve_via_exports_map(reader, pkg_dir, sub_path) {
        return Some(p);
    }

    if let Some(sub) = sub_path {
        return resolve_extension(reader, &pkg_dir.join(sub));
    }

    let pkg_json_path = pkg_dir.join("package.json");
    if reader.exists(&pkg_json_path) {
        if let Ok(content) = reader.read_to_string(&pkg_json_path) {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) {
                if let Some(types) = json
                    .get("types")
                    .or_else(|| json.get("typings"))
                    .and_then(|v| v.as_str())
                {
                    if let Some(p) = resolve_extension(reader, &pkg_dir.join(types)) {
                        return Some(p);
                    }
                }
                if let Some(main) = json.get("main").and_then(|v| v.as_str()) {
                    let sibling = pkg_dir.join(main).with_extension("d.ts");
                    if reader.exists(&sibling) {
                        return Some(sibling);
                    }
                }
            }
        }
    }

    resolve_extension(reader, &pkg_dir.join("index"))
}

fn resolve_via_exports_map(reader: &dyn FileReader, pkg_dir: &Path, sub_path: Option<&str>) -> Option<PathBuf> {
    let pkg_json_path = pkg_dir.join("package.json");
    if !reader.exists(&pkg_json_path) {
        return None;
    }
    let content = reader.read_to_string(&pkg_json_path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let exports = json.get("exports")?;

    let key = match sub_path {
        Some(s) => format!("./{s}"),
        None => ".".to_string(),
    };
    let entry = exports
        .get(&key)
        .or_else(|| (sub_path.is_none() && !exports.is_object()).then_some(exports))?;
    let types_path = find_types_condition(entry)?;
    resolve_extension(reader, &pkg_dir.join(types_path))
}

fn find_types_condition(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("types")
            .and_then(find_types_condition)
            .or_else(|| map.get("import").and_then(find_types_condition))
            .or_else(|| map.get("default").and_then(find_types_condition)),
        _ => None,
    }
}

fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn normalize_entry(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    lexically_normalize(&absolute)
}
