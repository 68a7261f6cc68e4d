use oam_core::error::{ResolveError, TransformError};
use oam_core::ir::CodeModel;
use oam_core::parse;
use oam_core::transform::{self, TransformOptions};

fn build(yaml: &str) -> Result<CodeModel, TransformError> {
    let spec = parse::from_yaml(yaml).unwrap();
    transform::transform(&spec)
}

fn with_schemas(schemas: &str) -> String {
    format!(
        "openapi: 3.0.0\ninfo: {{title: Test, version: '1'}}\npaths: {{}}\ncomponents:\n  schemas:\n{schemas}"
    )
}

#[test]
fn missing_info_section() {
    let err = build("openapi: 3.0.0\npaths: {}\n").unwrap_err();
    assert!(matches!(err, TransformError::InfoSectionMissing));
}

#[test]
fn missing_title_without_client_name() {
    let yaml = "openapi: 3.0.0\ninfo: {version: '1'}\npaths: {}\n";
    let err = build(yaml).unwrap_err();
    assert!(matches!(err, TransformError::TitleMissing));

    let spec = parse::from_yaml(yaml).unwrap();
    let options = TransformOptions {
        client_name: Some("StorageClient".into()),
        ..Default::default()
    };
    let model = transform::transform_with_options(&spec, &options).unwrap();
    assert_eq!(model.name, "StorageClient");
}

#[test]
fn missing_operation_id() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    get:
      responses:
        "200": {description: ok}
"#,
    )
    .unwrap_err();
    match err {
        TransformError::OperationIdMissing { verb, path } => {
            assert_eq!(verb, "GET");
            assert_eq!(path, "/items");
        }
        other => panic!("expected OperationIdMissing, got {other:?}"),
    }
}

#[test]
fn duplicate_operation_id() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    get:
      operationId: Items_List
      responses:
        "200": {description: ok}
  /other-items:
    get:
      operationId: Items_List
      responses:
        "200": {description: ok}
"#,
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::DuplicateOperationId(ref id) if id == "Items_List"));
}

#[test]
fn array_without_items() {
    let err = build(&with_schemas("    Bad: {type: array}\n")).unwrap_err();
    assert!(matches!(err, TransformError::MissingArrayItems(ref name) if name == "Bad"));
}

#[test]
fn enum_without_values() {
    let err = build(&with_schemas("    Empty: {type: string, enum: []}\n")).unwrap_err();
    assert!(matches!(err, TransformError::EmptyEnum(ref name) if name == "Empty"));
}

#[test]
fn enum_extension_without_enum() {
    let err = build(&with_schemas(
        "    Dangling: {type: string, x-ms-enum: {name: Dangling}}\n",
    ))
    .unwrap_err();
    assert!(matches!(err, TransformError::DanglingEnumExtension(ref name) if name == "Dangling"));
}

#[test]
fn enum_extension_without_name() {
    let err = build(&with_schemas(
        "    Color: {type: string, enum: [red], x-ms-enum: {modelAsString: true}}\n",
    ))
    .unwrap_err();
    assert!(matches!(err, TransformError::MissingEnumName(ref name) if name == "Color"));
}

#[test]
fn enum_extension_values_must_match() {
    let err = build(&with_schemas(
        r#"    Color:
      type: string
      enum: [red, green]
      x-ms-enum:
        name: Color
        values:
          - value: red
          - value: blue
"#,
    ))
    .unwrap_err();
    match err {
        TransformError::EnumValueMismatch {
            name,
            declared,
            extension,
        } => {
            assert_eq!(name, "Color");
            assert_eq!(declared, "'red', 'green'");
            assert_eq!(extension, "'red', 'blue'");
        }
        other => panic!("expected EnumValueMismatch, got {other:?}"),
    }
}

#[test]
fn enum_extension_values_describe_members() {
    let model = build(&with_schemas(
        r#"    Color:
      type: string
      enum: [r, g]
      x-ms-enum:
        name: Color
        modelAsString: false
        values:
          - {value: g, name: Green, description: The green one.}
          - {value: r, name: Red}
"#,
    ))
    .unwrap();
    let color = model.enum_type("Color").unwrap();
    assert!(!color.model_as_string);
    assert_eq!(color.values[0].name, "Green");
    assert_eq!(color.values[0].serialized_name, "g");
    assert_eq!(color.values[0].description.as_deref(), Some("The green one."));
    assert_eq!(color.values[1].name, "Red");
}

#[test]
fn conflicting_enum_names() {
    let err = build(&with_schemas(
        r#"    Color:
      type: string
      enum: [red]
      x-ms-enum: {name: Shade}
    Tint:
      type: string
      enum: [blue]
      x-ms-enum: {name: Shade}
"#,
    ))
    .unwrap_err();
    assert!(matches!(err, TransformError::DuplicateEnumName { ref name, .. } if name == "Shade"));
}

#[test]
fn unsupported_schema_type() {
    let err = build(&with_schemas("    Money: {type: decimal128}\n")).unwrap_err();
    assert!(matches!(
        err,
        TransformError::UnsupportedSchemaType { ref name, ref kind }
            if name == "Money" && kind == "decimal128"
    ));
}

const EMPTY_PARENT: &str = r#"    Base:
      type: object
    Child:
      allOf:
        - $ref: '#/components/schemas/Base'
        - properties:
            name: {type: string}
"#;

#[test]
fn ancestors_without_properties() {
    let err = build(&with_schemas(EMPTY_PARENT)).unwrap_err();
    assert!(matches!(err, TransformError::InvalidAncestors(ref name) if name == "Child"));
}

#[test]
fn ancestors_without_properties_allowed_with_empty_classes() {
    let spec = parse::from_yaml(&with_schemas(EMPTY_PARENT)).unwrap();
    let options = TransformOptions {
        generate_empty_classes: true,
        ..Default::default()
    };
    let model = transform::transform_with_options(&spec, &options).unwrap();

    let base_id = model.model_type_id("Base").expect("Base should be a composite");
    assert!(model.composite(base_id).properties.is_empty());
    let child = model.model_type("Child").unwrap();
    assert_eq!(child.base_type, Some(base_id));
}

#[test]
fn circular_inheritance() {
    let err = build(&with_schemas(
        r#"    A:
      allOf:
        - $ref: '#/components/schemas/B'
        - properties:
            a: {type: string}
    B:
      allOf:
        - $ref: '#/components/schemas/A'
        - properties:
            b: {type: string}
"#,
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        TransformError::Resolve(ResolveError::CircularRef(_))
    ));
}

#[test]
fn unresolved_reference() {
    let err = build(&with_schemas(
        "    Holder:\n      properties:\n        missing: {$ref: '#/components/schemas/Nowhere'}\n",
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        TransformError::Resolve(ResolveError::UnresolvedRef(_))
    ));
}

#[test]
fn forward_to_unknown_method() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    get:
      operationId: Items_List
      x-ms-forward-to: Items_Nowhere
      responses:
        "200": {description: ok}
"#,
    )
    .unwrap_err();
    match err {
        TransformError::CodeGeneration(message) => {
            assert_eq!(
                message,
                "Cannot forward to 'Items_Nowhere'. No method with that name found."
            );
        }
        other => panic!("expected CodeGeneration, got {other:?}"),
    }
}

#[test]
fn body_without_schema() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    post:
      operationId: Items_Create
      requestBody:
        content:
          application/json: {}
      responses:
        "204": {description: created}
"#,
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::MissingBodySchema(ref name) if name == "body"));
}

#[test]
fn mixed_response_header_declarations() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    get:
      operationId: Items_List
      responses:
        "200":
          description: ok
          x-ms-headers: {$ref: '#/components/schemas/ListHeaders'}
        "202":
          description: accepted
          x-ms-headers: {$ref: '#/components/schemas/OtherHeaders'}
components:
  schemas:
    ListHeaders:
      properties:
        etag: {type: string}
    OtherHeaders:
      properties:
        location: {type: string}
"#,
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::InvalidResponseHeaders(ref op) if op == "Items_List"));
}

#[test]
fn binary_response_without_byte_array() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /thumbnails:
    get:
      operationId: Thumbnails_Get
      produces: [image/png]
      responses:
        "200":
          description: ok
          content:
            image/png:
              schema: {$ref: '#/components/schemas/Thumbnail'}
components:
  schemas:
    Thumbnail:
      properties:
        name: {type: string}
"#,
    )
    .unwrap_err();
    match err {
        TransformError::MissingByteArrayProperty { operation, schema } => {
            assert_eq!(operation, "Thumbnails_Get");
            assert_eq!(schema, "Thumbnail");
        }
        other => panic!("expected MissingByteArrayProperty, got {other:?}"),
    }
}

#[test]
fn empty_produces_with_modelled_response() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
paths:
  /items:
    get:
      operationId: Items_Get
      produces: []
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                properties:
                  id: {type: string}
"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TransformError::UnsupportedResponseMimeType { ref operation, ref status }
            if operation == "Items_Get" && status == "200"
    ));
}

#[test]
fn invalid_host_position() {
    let err = build(
        r#"
openapi: 3.0.0
info: {title: Test, version: "1"}
servers:
  - url: https://{account}.example.com
    x-ms-parameterized-host:
      positionInOperation: middle
    variables:
      account:
        default: main
paths: {}
"#,
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::InvalidHostPosition(ref p) if p == "middle"));
}
