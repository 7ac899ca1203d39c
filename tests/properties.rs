//! The universal properties enumerated in spec §8, each realized as a
//! handful of representative hand-written cases rather than a
//! property-testing crate (see SPEC_FULL.md §8 — the corpus's test posture
//! is plain `#[test]` functions, not `proptest`/`quickcheck`).

mod common;

use serde_json::json;

use ts2jsonschema::ast::DeclarationKind;
use ts2jsonschema::error::Error;
use ts2jsonschema::resolver::{DuplicatePolicy, FollowMode, ModuleResolver, ResolveOptions};
use ts2jsonschema::token::{tokenize, TokenKind};
use ts2jsonschema::{parse_declarations, to_json_schema, EmitOptions};

fn opts() -> EmitOptions<'static> {
    EmitOptions {
        include_schema: false,
        ..Default::default()
    }
}

// --- Tokenizer robustness ---------------------------------------------------

#[test]
fn tokenizer_never_panics_and_always_ends_in_eof() {
    let inputs = [
        "",
        "   \n\n  ",
        "interface { [[[",
        "/* unterminated",
        "/** unterminated doc",
        "\"unterminated string",
        "'' `` \"\"",
        "\\",
        "🦀 unicode_ident_like 名前: string;",
        "}}}}}{{{{{",
        "interface A { a: -1.5; }",
    ];
    for src in inputs {
        let tokens = tokenize(src);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof, "input: {src:?}");
        let mut last_line = 1;
        for tok in &tokens {
            assert!(tok.line >= last_line, "line went backwards for input {src:?}");
            last_line = tok.line;
        }
    }
}

// --- Round-trip structural fidelity -----------------------------------------

#[test]
fn round_trip_structural_fidelity() {
    let source = r#"
        interface Widget {
            id: string;
            label?: string;
            tags: string[];
            [key: string]: unknown;
        }
    "#;
    let decls = parse_declarations(source).unwrap();
    assert_eq!(decls.len(), 1);
    let DeclarationKind::Interface(iface) = &decls[0].kind else {
        panic!("expected interface");
    };
    assert_eq!(iface.properties.len(), 3);
    let required_count = iface.properties.iter().filter(|p| !p.optional).count();
    assert_eq!(required_count, 2);
    assert!(iface.index_signature.is_some());

    let schema = to_json_schema(source, &opts()).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["properties"].as_object().unwrap().len(), 3);
    assert_eq!(value["required"].as_array().unwrap().len(), 2);
    assert!(value["additionalProperties"].is_object());
}

// --- Flattening idempotence --------------------------------------------------

#[test]
fn union_of_unions_flattens_like_the_equivalent_flat_union() {
    let nested = r#"type U = ("a" | "b") | ("c" | ("d" | "e"));"#;
    let flat = r#"type U = "a" | "b" | "c" | "d" | "e";"#;
    let nested_schema = serde_json::to_value(to_json_schema(nested, &opts()).unwrap()).unwrap();
    let flat_schema = serde_json::to_value(to_json_schema(flat, &opts()).unwrap()).unwrap();
    assert_eq!(nested_schema, flat_schema);
    assert_eq!(nested_schema, json!({"type": "string", "enum": ["a", "b", "c", "d", "e"]}));
}

// --- Pick / Omit duality -----------------------------------------------------

#[test]
fn pick_and_omit_partition_the_property_set() {
    let source = r#"
        interface Widget { a: string; b: number; c: boolean; d: string; }
        type Picked = Pick<Widget, "a" | "b">;
        type Omitted = Omit<Widget, "a" | "b">;
    "#;
    let picked = serde_json::to_value(to_json_schema(source, &EmitOptions { root_type: Some("Picked".into()), ..opts() }).unwrap()).unwrap();
    let omitted = serde_json::to_value(to_json_schema(source, &EmitOptions { root_type: Some("Omitted".into()), ..opts() }).unwrap()).unwrap();

    let picked_keys: std::collections::BTreeSet<_> = picked["properties"].as_object().unwrap().keys().cloned().collect();
    let omitted_keys: std::collections::BTreeSet<_> = omitted["properties"].as_object().unwrap().keys().cloned().collect();

    assert_eq!(picked_keys, ["a", "b"].into_iter().map(String::from).collect());
    assert_eq!(omitted_keys, ["c", "d"].into_iter().map(String::from).collect());
    assert!(picked_keys.is_disjoint(&omitted_keys));
}

// --- Self-reference invariant ------------------------------------------------

#[test]
fn direct_self_reference_keeps_root_in_defs() {
    let source = "interface Node { next: Node | null; }";
    let schema = serde_json::to_value(to_json_schema(source, &EmitOptions { root_type: Some("Node".into()), ..opts() }).unwrap()).unwrap();
    assert_eq!(schema["$ref"], json!("#/$defs/Node"));
    assert!(schema["$defs"]["Node"].is_object());
}

#[test]
fn mutual_recursion_keeps_both_roots_in_defs() {
    let source = r#"
        interface A { b: B | null; }
        interface B { a: A | null; }
    "#;
    let schema = serde_json::to_value(to_json_schema(source, &EmitOptions { root_type: Some("A".into()), ..opts() }).unwrap()).unwrap();
    assert_eq!(schema["$ref"], json!("#/$defs/A"));
    assert!(schema["$defs"]["A"].is_object());
    assert!(schema["$defs"]["B"].is_object());
}

#[test]
fn non_self_referential_root_is_inlined() {
    let source = r#"
        interface Leaf { value: string; }
        interface Root { leaf: Leaf; }
    "#;
    let schema = serde_json::to_value(to_json_schema(source, &EmitOptions { root_type: Some("Root".into()), ..opts() }).unwrap()).unwrap();
    assert!(schema.get("$ref").is_none());
    assert_eq!(schema["type"], json!("object"));
    assert_eq!(schema["$defs"]["Leaf"]["type"], json!("string"));
}

// --- additionalProperties precedence ----------------------------------------

#[test]
fn additional_properties_precedence_prefers_index_signature_first() {
    let source = r#"
        /** @additionalProperties true */
        interface Config {
            [key: string]: number;
        }
    "#;
    let options = EmitOptions {
        strict_objects: true,
        additional_properties: Some(false),
        ..EmitOptions { root_type: Some("Config".into()), ..opts() }
    };
    let schema = serde_json::to_value(to_json_schema(source, &options).unwrap()).unwrap();
    // index signature beats the @additionalProperties tag, strictObjects, and the option.
    assert_eq!(schema["additionalProperties"], json!({"type": "number"}));
}

#[test]
fn additional_properties_precedence_falls_back_through_the_chain() {
    let tag_wins = r#"/** @additionalProperties true */ interface A { x: string; }"#;
    let strict_wins = r#"interface A { x: string; }"#;

    let tag_schema = serde_json::to_value(
        to_json_schema(
            tag_wins,
            &EmitOptions { strict_objects: true, additional_properties: Some(false), ..opts() },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(tag_schema["additionalProperties"], json!(true));

    // strictObjects must win over the additionalProperties option even when
    // they disagree (true here vs. strictObjects's forced false).
    let strict_schema = serde_json::to_value(
        to_json_schema(
            strict_wins,
            &EmitOptions { strict_objects: true, additional_properties: Some(true), ..opts() },
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(strict_schema["additionalProperties"], json!(false));

    let option_schema = serde_json::to_value(
        to_json_schema(strict_wins, &EmitOptions { additional_properties: Some(true), ..opts() }).unwrap(),
    )
    .unwrap();
    assert_eq!(option_schema["additionalProperties"], json!(true));

    let default_schema = serde_json::to_value(to_json_schema(strict_wins, &opts()).unwrap()).unwrap();
    assert!(default_schema.get("additionalProperties").is_none());
}

// --- Name-transform bijection ------------------------------------------------

#[test]
fn name_transform_rewrites_defs_keys_and_every_ref() {
    let source = r#"
        interface Leaf { value: string; }
        interface Root { leaf: Leaf; other: Leaf; }
    "#;
    let transform = |name: &str, _decl: &ts2jsonschema::Declaration| -> std::result::Result<String, String> {
        Ok(format!("Renamed{name}"))
    };
    let options = EmitOptions {
        root_type: Some("Root".into()),
        define_name_transform: Some(&transform),
        ..opts()
    };
    let schema = serde_json::to_value(to_json_schema(source, &options).unwrap()).unwrap();
    assert!(schema["$defs"].as_object().unwrap().contains_key("RenamedLeaf"));
    assert_eq!(schema["properties"]["leaf"]["$ref"], json!("#/$defs/RenamedLeaf"));
    assert_eq!(schema["properties"]["other"]["$ref"], json!("#/$defs/RenamedLeaf"));
}

#[test]
fn name_transform_collision_is_an_error() {
    let source = r#"
        interface Foo { x: string; }
        interface Bar { y: string; }
    "#;
    let transform = |_name: &str, _decl: &ts2jsonschema::Declaration| -> std::result::Result<String, String> {
        Ok("Same".to_string())
    };
    let options = EmitOptions {
        define_name_transform: Some(&transform),
        ..opts()
    };
    let result = to_json_schema(source, &options);
    assert!(matches!(result, Err(Error::NameCollision { .. })));
}

// --- Cycle-safety ------------------------------------------------------------

#[test]
fn resolver_visits_mutually_importing_files_exactly_once() {
    let reader = common::MapReader::new(&[
        ("/virtual/a.ts", r#"import { B } from "./b"; export interface A { b: B | null; }"#),
        ("/virtual/b.ts", r#"import { A } from "./a"; export interface B { a: A | null; }"#),
    ]);
    let resolver = ModuleResolver::new(
        &reader,
        ResolveOptions { follow: FollowMode::Local, on_duplicate: DuplicatePolicy::Error },
    );
    let declarations = resolver.resolve(std::path::Path::new("/virtual/a.ts")).unwrap();
    assert_eq!(declarations.len(), 2);
    let names: std::collections::BTreeSet<_> = declarations.iter().map(|d| d.name.clone()).collect();
    assert_eq!(names, ["A", "B"].into_iter().map(String::from).collect());
}

// --- Top-level statement skipping (imports, exports, ambient declarations) --

#[test]
fn leading_import_statements_are_skipped_without_hanging() {
    let source = r#"
        import { Foo } from "./foo";
        import Bar from "./bar";
        import * as NS from "./ns";
        export { Baz } from "./baz";
        export * from "./all";
        export type { Qux } from "./qux";
        interface Widget { id: string; }
    "#;
    let decls = parse_declarations(source).unwrap();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name, "Widget");
}

#[test]
fn declare_const_is_skipped_as_an_ambient_declaration() {
    let source = r#"
        declare const VERSION: string;
        interface Widget { id: string; }
    "#;
    let decls = parse_declarations(source).unwrap();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name, "Widget");
}

#[test]
fn const_enum_is_still_parsed_as_a_declaration() {
    let source = "const enum Color { Red, Green, Blue }";
    let decls = parse_declarations(source).unwrap();
    assert_eq!(decls.len(), 1);
    let DeclarationKind::Enum(e) = &decls[0].kind else {
        panic!("expected enum");
    };
    assert_eq!(e.members.len(), 3);
}
