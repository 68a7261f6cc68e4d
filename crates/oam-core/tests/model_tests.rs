use oam_core::ir::{
    CodeModel, CollectionFormat, Constraint, ForwardTarget, HttpMethod, KnownPrimaryType,
    ModelType, ParameterLocation,
};
use oam_core::parse;
use oam_core::transform;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn petstore() -> CodeModel {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    transform::transform(&spec).unwrap()
}

fn names(model: &CodeModel, ids: &[oam_core::ir::CompositeTypeId]) -> String {
    ids.iter()
        .map(|id| model.composite(*id).name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn model_metadata() {
    let model = petstore();

    assert_eq!(model.name, "PetStore");
    assert_eq!(model.api_version.as_deref(), Some("2024-01-01"));
    assert_eq!(model.documentation.as_deref(), Some("A sample pet store."));
    assert_eq!(model.base_url, "https://pets.example.com/v1");
    assert!(model.host_parameters_front.is_empty());
    assert!(model.host_parameters_back.is_empty());
}

#[test]
fn named_model_types_in_registration_order() {
    let model = petstore();

    insta::assert_snapshot!(names(&model, &model.model_types), @r"
    Pet
    Dog
    Cat
    Node
    Settings
    Photo
    Error
    ErrorDetail
    NotFound
    ");
}

#[test]
fn inheritance_and_discriminators() {
    let model = petstore();

    let pet_id = model.model_type_id("Pet").expect("should have Pet");
    let pet = model.composite(pet_id);
    assert_eq!(pet.polymorphic_discriminator.as_deref(), Some("petType"));
    // The discriminator is not modelled as a property
    assert!(pet.property("petType").is_none());
    assert!(pet.base_type.is_none());

    let dog = model.model_type("Dog").expect("should have Dog");
    assert_eq!(dog.base_type, Some(pet_id));
    assert_eq!(dog.serialized_name, "dog");
    // Inherited members stay on the parent
    assert!(dog.property("name").is_none());
    assert!(dog.property("barks").is_some());

    let cat = model.model_type("Cat").expect("should have Cat");
    assert_eq!(cat.base_type, Some(pet_id));
    assert_eq!(cat.serialized_name, "Cat");
}

#[test]
fn property_details() {
    let model = petstore();
    let pet = model.model_type("Pet").unwrap();

    let name = pet.property("name").unwrap();
    assert!(name.is_required);
    assert!(name.model_type.is_primary(KnownPrimaryType::String));
    assert_eq!(
        name.constraints.get(&Constraint::MaxLength).map(String::as_str),
        Some("64")
    );

    // A referenced enum is documented by the referring property
    let status = pet.property("status").unwrap();
    let status_enum = status.model_type.as_enum().expect("status should be an enum");
    assert_eq!(status_enum.name, "PetStatus");
    assert_eq!(
        status_enum.documentation.as_deref(),
        Some("Adoption status of the pet.")
    );
    assert_eq!(status.documentation.as_deref(), Some("Adoption status of the pet."));

    let labels = pet.property("labels").unwrap();
    match &labels.model_type {
        ModelType::Dictionary {
            value,
            supports_additional_properties,
        } => {
            assert!(value.is_primary(KnownPrimaryType::String));
            assert!(supports_additional_properties);
        }
        other => panic!("labels should be a dictionary, got {other:?}"),
    }
}

#[test]
fn self_recursive_type_refers_to_itself() {
    let model = petstore();
    let node_id = model.model_type_id("Node").unwrap();

    let children = model.composite(node_id).property("children").unwrap();
    match &children.model_type {
        ModelType::Sequence(element) => assert_eq!(element.as_composite(), Some(node_id)),
        other => panic!("children should be a sequence, got {other:?}"),
    }
    assert_eq!(model.type_name(&children.model_type), "Sequence<Node>");
}

#[test]
fn constant_properties() {
    let model = petstore();
    let settings = model.model_type("Settings").unwrap();

    assert!(settings.contains_constant_properties);
    let kind = settings.property("kind").unwrap();
    assert!(kind.is_constant);
    assert_eq!(kind.default_value.as_deref(), Some("fixed"));
    assert!(kind.model_type.is_primary(KnownPrimaryType::String));

    let retries = settings.property("retries").unwrap();
    assert!(!retries.is_constant);
    assert_eq!(
        retries
            .constraints
            .get(&Constraint::InclusiveMinimum)
            .map(String::as_str),
        Some("0")
    );
}

#[test]
fn enums_are_registered_once() {
    let model = petstore();

    let enum_names: Vec<&str> = model.enum_types.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(enum_names, ["PetStatus", "ContentTypes"]);

    let status = model.enum_type("PetStatus").unwrap();
    assert_eq!(status.serialized_values(), ["available", "adopted"]);
    assert!(status.model_as_string);

    let content_types = model.enum_type("ContentTypes").unwrap();
    assert_eq!(content_types.serialized_values(), ["image/png", "image/jpeg"]);
}

#[test]
fn methods_in_document_order() {
    let model = petstore();

    // OPTIONS is skipped, custom paths come last
    let method_names = model
        .methods
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(method_names, @r"
    List
    Get
    Update
    Delete
    GetPhoto
    UploadPhoto
    GetLegacy
    UploadFile
    Search
    ");

    let search = model.method("Search").unwrap();
    assert_eq!(search.group.as_deref(), Some("Pets"));
    assert_eq!(search.url.as_deref(), Some("/pets"));
    assert_eq!(search.http_method, HttpMethod::Get);

    let upload = model.method("UploadFile").unwrap();
    assert!(upload.group.is_none());
    assert_eq!(upload.serialized_name, "UploadFile");
}

#[test]
fn client_properties_and_global_parameters() {
    let model = petstore();

    assert_eq!(model.properties.len(), 1);
    let api_version = model.property("api-version").unwrap();
    assert!(api_version.is_required);
    assert_eq!(api_version.default_value.as_deref(), Some("2024-01-01"));

    let list = model.method("List").unwrap();
    let parameter_names: Vec<&str> = list.parameters.iter().map(|p| p.name.as_str()).collect();
    // Accept is never a method parameter
    assert_eq!(parameter_names, ["api-version", "tags"]);

    let version = list.parameter("api-version").unwrap();
    assert_eq!(version.client_property, Some(0));
    assert_eq!(version.location, ParameterLocation::Query);

    let tags = list.parameter("tags").unwrap();
    assert_eq!(tags.client_property, None);
    assert_eq!(tags.collection_format, CollectionFormat::Csv);
    assert_eq!(model.type_name(&tags.model_type), "Sequence<String>");
}

#[test]
fn response_bodies_unify_to_common_ancestor() {
    let model = petstore();

    let list = model.method("List").unwrap();
    let body = list.return_type.body.as_ref().unwrap();
    assert_eq!(model.type_name(body), "Sequence<Pet>");

    let get = model.method("Get").unwrap();
    assert_eq!(get.responses.len(), 3);
    let dog = get.responses["200"].body.as_ref().unwrap();
    assert_eq!(model.type_name(dog), "Dog");
    // Dog and Cat share Pet; the flagged 404 does not take part
    let unified = get.return_type.body.as_ref().unwrap();
    assert_eq!(model.type_name(unified), "Pet");
}

#[test]
fn response_headers_become_header_types() {
    let model = petstore();

    let get = model.method("Get").unwrap();
    let headers_id = get.return_type.headers.expect("Get should have headers");
    let headers = model.composite(headers_id);
    assert_eq!(headers.name, "Pets-Get-Headers");
    assert_eq!(
        headers.documentation.as_deref(),
        Some("Defines headers for Get operation.")
    );
    let request_id = headers.property("x-request-id").unwrap();
    assert_eq!(request_id.documentation.as_deref(), Some("Request id."));

    assert!(model.header_type("Pets-Get-Headers").is_some());
    assert_eq!(model.header_types.len(), 1);
    assert!(model.method("List").unwrap().return_type.headers.is_none());
}

#[test]
fn error_models_propagate_to_descendants() {
    let model = petstore();

    insta::assert_snapshot!(names(&model, &model.error_types), @r"
    Error
    NotFound
    ErrorDetail
    ");

    let list = model.method("List").unwrap();
    let default = list.default_response.body.as_ref().unwrap();
    assert_eq!(model.type_name(default), "Error");
}

#[test]
fn body_parameter_renamed_on_clash() {
    let model = petstore();

    let update = model.method("Update").unwrap();
    let parameter_names: Vec<&str> = update.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(parameter_names, ["petId", "petIdBody"]);

    let body = update.parameter("petIdBody").unwrap();
    assert_eq!(body.location, ParameterLocation::Body);
    assert!(body.is_required);
    assert_eq!(body.collection_format, CollectionFormat::None);
    assert_eq!(model.type_name(&body.model_type), "Pet");
    assert_eq!(update.request_content_type, "application/json; charset=utf-8");
}

#[test]
fn empty_produces_yields_no_body() {
    let model = petstore();

    let delete = model.method("Delete").unwrap();
    assert!(delete.response_content_types.is_empty());
    assert!(delete.responses["200"].body.is_none());
    assert!(delete.return_type.body.is_none());
}

#[test]
fn binary_responses_are_streamed_models() {
    let model = petstore();

    let photo = model.method("GetPhoto").unwrap();
    assert_eq!(photo.response_content_types, ["image/png"]);
    let body = photo.return_type.body.as_ref().unwrap();
    assert_eq!(model.type_name(body), "Photo");
}

#[test]
fn content_type_parameter_enumerates_consumed_media_types() {
    let model = petstore();

    let upload = model.method("UploadPhoto").unwrap();
    assert_eq!(upload.request_content_type, "image/png");

    let content_type = upload.parameter("Content-Type").unwrap();
    assert!(content_type.is_required);
    assert_eq!(content_type.location, ParameterLocation::Header);
    let choices = content_type
        .model_type
        .as_enum()
        .expect("Content-Type should be an enum");
    assert_eq!(choices.serialized_values(), ["image/png", "image/jpeg"]);

    let body = upload.parameter("body").unwrap();
    assert!(body.model_type.is_primary(KnownPrimaryType::Stream));
    assert!(upload.return_type.body.is_none());
}

#[test]
fn multipart_body_becomes_form_parameters() {
    let model = petstore();

    let upload = model.method("UploadFile").unwrap();
    assert_eq!(upload.request_content_type, "multipart/form-data");
    assert_eq!(upload.parameters.len(), 2);

    let file = upload.parameter("file").unwrap();
    assert_eq!(file.location, ParameterLocation::FormData);
    assert!(file.is_required);
    assert!(file.model_type.is_primary(KnownPrimaryType::Stream));

    let note = upload.parameter("note").unwrap();
    assert_eq!(note.location, ParameterLocation::FormData);
    assert!(!note.is_required);
}

#[test]
fn forwarded_methods_resolve_to_their_target() {
    let model = petstore();

    let legacy = model.method("GetLegacy").unwrap();
    assert!(legacy.url.is_none());
    assert_eq!(legacy.forward_to, Some(ForwardTarget::Resolved(1)));
    assert_eq!(model.methods[1].serialized_name, "Pets_Get");
    assert!(legacy.is_deprecated());
    assert_eq!(
        legacy.deprecation_message.as_deref(),
        Some("This operation is deprecated. Please do not use it any longer.")
    );
}
