use study_map::api::backend::{
    analysis_path, boundaries_path, decode_ack, decode_customers, decode_feature_collection,
    decode_json, stores_path,
};
use study_map::core::{ClientConfig, CustomerId, StudyId, StudyRecord};
use study_map::error::StudyError;

#[test]
fn study_record_decodes_from_create_response() {
    let record: StudyRecord =
        decode_json(201, r#"{"study_id": 42, "name": "Surrey North"}"#).expect("created");
    assert_eq!(record.study_id, StudyId::new(42));
    assert_eq!(record.name, "Surrey North");
}

#[test]
fn non_success_statuses_become_backend_errors() {
    let err = decode_ack(500, r#"{"error": "Census data unavailable"}"#).expect_err("500");
    assert_eq!(err.user_detail(), "Census data unavailable");

    let err = decode_ack(404, "").expect_err("404");
    assert!(matches!(err, StudyError::Backend { status: 404, message: None }));
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let err = decode_json::<StudyRecord>(200, r#"{"study_id": "x"}"#).expect_err("bad body");
    assert!(matches!(err, StudyError::Decode(_)));
}

#[test]
fn client_config_tolerates_missing_token() {
    let config: ClientConfig = decode_json(200, "{}").expect("config");
    assert_eq!(config.map_token(), None);
    let config: ClientConfig = decode_json(200, r#"{"mapbox_token": "pk.abc"}"#).expect("config");
    assert_eq!(config.map_token(), Some("pk.abc"));
}

#[test]
fn customers_list_is_unwrapped() {
    let customers = decode_customers(
        200,
        r#"{"customers": [{"id": 3, "name": "Fraser Valley Storage"}, {"id": 4, "name": "Delta"}]}"#,
    )
    .expect("customers");
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].id, CustomerId::new(3));
}

#[test]
fn feature_collection_fetch_policies() {
    let body = r#"{
        "type": "FeatureCollection",
        "metadata": {"max_residual": 812.5},
        "features": [{
            "type": "Feature",
            "properties": {"demand": 1.0, "supply": 2.0, "residual": 1.0},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[0,1],[0,0]]]}
        }]
    }"#;
    let collection = decode_feature_collection(200, body)
        .expect("decodes")
        .expect("present");
    assert_eq!(collection.features.len(), 1);
    assert!(
        collection
            .foreign_members
            .as_ref()
            .is_some_and(|members| members.contains_key("metadata"))
    );

    assert!(decode_feature_collection(500, body).expect("absent").is_none());
    assert!(
        decode_feature_collection(200, r#"{"type": "FeatureCollection"}"#)
            .expect("absent")
            .is_none()
    );
    assert!(decode_feature_collection(200, "{").is_err());
}

#[test]
fn result_paths_match_backend_routes() {
    let id = StudyId::new(42);
    assert_eq!(analysis_path(id), "/api/studies/42/analysis/");
    assert_eq!(boundaries_path(id), "/api/studies/42/boundaries.geojson");
    assert_eq!(stores_path(id), "/api/studies/42/stores.geojson");
}
