//! The six end-to-end scenarios enumerated in spec §8.

mod common;

use serde_json::json;

use ts2jsonschema::resolver::{DuplicatePolicy, FollowMode, ResolveOptions};
use ts2jsonschema::{to_json_schema, to_json_schema_from_file_with_reader, EmitOptions, FileEmitOptions};

fn options(root_type: Option<&str>) -> EmitOptions<'static> {
    EmitOptions {
        include_schema: false,
        root_type: root_type.map(str::to_string),
        ..Default::default()
    }
}

#[test]
fn scenario_1_primitives_and_optional() {
    let source = "interface User { name: string; age?: number; active: boolean; }";
    let schema = to_json_schema(source, &options(Some("User"))).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "number"},
                "active": {"type": "boolean"},
            },
            "required": ["name", "active"],
        })
    );
}

#[test]
fn scenario_2_string_literal_union() {
    let source = r#"type Status = "a" | "b" | "c";"#;
    let schema = to_json_schema(source, &options(None)).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value, json!({"type": "string", "enum": ["a", "b", "c"]}));
}

#[test]
fn scenario_3_recursive_self_reference() {
    let source = "interface T { v: string; kids: T[]; }";
    let schema = to_json_schema(source, &options(Some("T"))).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["$ref"], json!("#/$defs/T"));
    assert_eq!(value["$defs"]["T"]["type"], json!("object"));
    assert_eq!(
        value["$defs"]["T"]["properties"]["kids"],
        json!({"type": "array", "items": {"$ref": "#/$defs/T"}})
    );
}

#[test]
fn scenario_4_omit_in_extends_with_jsdoc() {
    let source = r#"
        interface Pet { _id: string; name: string; }
        /** @additionalProperties false */
        export interface PostPetReq extends Omit<Pet, "_id"> {}
    "#;
    let schema = to_json_schema(source, &options(Some("PostPetReq"))).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["type"], json!("object"));
    assert_eq!(value["properties"], json!({"name": {"type": "string"}}));
    assert_eq!(value["required"], json!(["name"]));
    assert_eq!(value["additionalProperties"], json!(false));
}

#[test]
fn scenario_5_multi_file_import() {
    let reader = common::MapReader::new(&[
        ("/virtual/pet.ts", "export interface Pet { _id: string; name: string; }"),
        (
            "/virtual/api.ts",
            r#"
                import { Pet } from "./pet";
                export interface Req extends Omit<Pet, "_id"> {}
            "#,
        ),
    ]);

    let file_options = FileEmitOptions {
        emit: options(Some("Req")),
        resolve: ResolveOptions {
            follow: FollowMode::Local,
            on_duplicate: DuplicatePolicy::Error,
        },
    };

    let schema = to_json_schema_from_file_with_reader("/virtual/api.ts", &file_options, &reader).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["type"], json!("object"));
    assert_eq!(value["properties"], json!({"name": {"type": "string"}}));
    assert_eq!(value["required"], json!(["name"]));
    assert_eq!(value["$defs"]["Pet"]["type"], json!("object"));
}

#[test]
fn scenario_6_jsdoc_numeric_constraints() {
    let source = r#"
        interface Config {
            /**
             * @minimum 1
             * @maximum 50
             * @default 10
             */
            level: number;
        }
    "#;

    let schema = to_json_schema(source, &options(Some("Config"))).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(
        value["properties"]["level"],
        json!({"type": "number", "minimum": 1.0, "maximum": 50.0, "default": 10})
    );

    let no_doc_options = EmitOptions {
        include_jsdoc: false,
        ..options(Some("Config"))
    };
    let schema = to_json_schema(source, &no_doc_options).unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["properties"]["level"], json!({"type": "number"}));
}
