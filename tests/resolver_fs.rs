//! Module resolution against real files on disk, exercising `StdFileReader`
//! (the `MapReader` double in `tests/properties.rs` covers the same logic
//! in-memory; this is the on-disk counterpart spec §6.1 expects tested).

use std::fs;

use ts2jsonschema::resolver::{DuplicatePolicy, FollowMode, ModuleResolver, ResolveOptions};
use ts2jsonschema::StdFileReader;

#[test]
fn follows_relative_imports_across_real_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pet.ts"), "export interface Pet { _id: string; name: string; }").unwrap();
    fs::write(
        dir.path().join("api.ts"),
        r#"import { Pet } from "./pet"; export interface Req { pet: Pet; }"#,
    )
    .unwrap();

    let reader = StdFileReader;
    let resolver = ModuleResolver::new(
        &reader,
        ResolveOptions {
            follow: FollowMode::Local,
            on_duplicate: DuplicatePolicy::Error,
        },
    );
    let decls = resolver.resolve(&dir.path().join("api.ts")).unwrap();
    let names: std::collections::BTreeSet<_> = decls.iter().map(|d| d.name.clone()).collect();
    assert_eq!(names, ["Pet", "Req"].into_iter().map(String::from).collect());
}

#[test]
fn follow_mode_none_ignores_imports_entirely() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pet.ts"), "export interface Pet { _id: string; }").unwrap();
    fs::write(
        dir.path().join("api.ts"),
        r#"import { Pet } from "./pet"; export interface Req { pet: Pet; }"#,
    )
    .unwrap();

    let reader = StdFileReader;
    let resolver = ModuleResolver::new(
        &reader,
        ResolveOptions {
            follow: FollowMode::None,
            on_duplicate: DuplicatePolicy::Error,
        },
    );
    let decls = resolver.resolve(&dir.path().join("api.ts")).unwrap();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name, "Req");
}

#[test]
fn unresolvable_relative_import_is_a_resolution_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("api.ts"),
        r#"import { Missing } from "./does-not-exist"; export interface Req { x: Missing; }"#,
    )
    .unwrap();

    let reader = StdFileReader;
    let resolver = ModuleResolver::new(
        &reader,
        ResolveOptions {
            follow: FollowMode::Local,
            on_duplicate: DuplicatePolicy::Error,
        },
    );
    let result = resolver.resolve(&dir.path().join("api.ts"));
    assert!(matches!(result, Err(ts2jsonschema::error::Error::Resolution { .. })));
}

#[test]
fn duplicate_declaration_across_files_is_an_error_by_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "export interface Shared { x: string; }").unwrap();
    fs::write(
        dir.path().join("b.ts"),
        r#"import { Shared } from "./a"; export interface Shared { y: number; }"#,
    )
    .unwrap();

    let reader = StdFileReader;
    let resolver = ModuleResolver::new(
        &reader,
        ResolveOptions {
            follow: FollowMode::Local,
            on_duplicate: DuplicatePolicy::Error,
        },
    );
    let result = resolver.resolve(&dir.path().join("b.ts"));
    assert!(matches!(result, Err(ts2jsonschema::error::Error::DuplicateDeclaration { .. })));
}
