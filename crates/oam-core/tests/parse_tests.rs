use oam_core::error::ParseError;
use oam_core::parse;
use oam_core::parse::parameter::{ParameterLocation, ParameterOrRef};
use oam_core::parse::response::ResponseOrRef;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

#[test]
fn parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore");
    assert_eq!(spec.openapi, "3.0.1");
    let info = spec.info.as_ref().expect("should have info");
    assert_eq!(info.title.as_deref(), Some("Pet Store"));
    assert_eq!(info.version, "2024-01-01");

    assert_eq!(spec.paths.len(), 5);
    assert_eq!(spec.custom_paths.len(), 1);
    assert!(spec.custom_paths.contains_key("/pets?kind=search"));
    assert_eq!(spec.components.schemas.len(), 10);
    assert_eq!(spec.components.parameters.len(), 1);

    let pets = spec.paths.get("/pets").expect("should have /pets");
    assert!(matches!(
        &pets.parameters[0],
        ParameterOrRef::Ref { ref_path } if ref_path == "#/components/parameters/ApiVersion"
    ));
    let list = pets.get.as_ref().expect("should have GET");
    assert_eq!(list.operation_id.as_deref(), Some("Pets_List"));
    assert!(list.consumes.is_none());
    assert!(list.produces.is_none());

    match list.responses.get("default").expect("should have default") {
        ResponseOrRef::Response(r) => {
            assert!(r.content.contains_key("application/json"));
            assert!(r.schema().is_some());
        }
        _ => panic!("expected inline response"),
    }
}

#[test]
fn explicit_empty_produces_is_kept() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let delete = spec.paths["/pets/{petId}"].delete.as_ref().unwrap();
    assert_eq!(delete.produces, Some(Vec::new()));
}

#[test]
fn only_vendor_extensions_are_kept() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let dog = &spec.components.schemas["Dog"];
    assert_eq!(dog.extensions.str_value("x-ms-discriminator-value"), Some("dog"));
    assert_eq!(dog.extensions.len(), 1);

    let get = spec.paths["/pets/{petId}"].get.as_ref().unwrap();
    match &get.responses["404"] {
        ResponseOrRef::Response(r) => assert!(r.extensions.flag("x-ms-error-response")),
        _ => panic!("expected inline response"),
    }
}

#[test]
fn parse_json() {
    let json = r##"{
        "openapi": "3.0.0",
        "info": {"title": "Json", "version": "1"},
        "paths": {
            "/items": {
                "get": {
                    "operationId": "Items_List",
                    "parameters": [{"name": "top", "in": "query", "schema": {"type": "integer"}}],
                    "responses": {"200": {"description": "ok"}}
                }
            }
        }
    }"##;
    let spec = parse::from_json(json).expect("should parse JSON");
    let get = spec.paths["/items"].get.as_ref().unwrap();
    match &get.parameters[0] {
        ParameterOrRef::Parameter(p) => {
            assert_eq!(p.name, "top");
            assert_eq!(p.location, ParameterLocation::Query);
            assert!(!p.is_required());
        }
        _ => panic!("expected inline parameter"),
    }
}

#[test]
fn path_parameters_are_always_required() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    match &spec.paths["/pets/{petId}"].parameters[0] {
        ParameterOrRef::Parameter(p) => {
            assert!(!p.required);
            assert!(p.is_required());
        }
        _ => panic!("expected inline parameter"),
    }
}

#[test]
fn parse_invalid_version() {
    let yaml = r#"
openapi: "2.0.0"
info:
  title: Test
  version: "1.0"
paths: {}
"#;
    let err = parse::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "2.0.0"));
}

#[test]
fn parse_malformed_yaml() {
    let err = parse::from_yaml("openapi: [3.0.0").unwrap_err();
    assert!(matches!(err, ParseError::Yaml(_)));
}
