use assert_matches::assert_matches;
use serde_json::{Map, json};
use tunedesk::{
    config::AdminConfig,
    entity::Resource,
    form::{LocalFile, UploadKind},
    http::{ApiError, ApiService, Backend},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    Request,
    matchers::{body_json, header_regex, method, path, query_param},
};

fn has_field(body: &[u8], name: &str) -> bool {
    let needle = format!("name=\"{name}\"");
    body.windows(needle.len()).any(|w| w == needle.as_bytes())
}

async fn service(server: &MockServer) -> ApiService {
    let config = AdminConfig {
        api_url: format!("{}/api/", server.uri()),
        image_api_url: format!("{}/media/", server.uri()),
        upload_song_api_url: format!("{}/media/", server.uri()),
        ..AdminConfig::default()
    };
    ApiService::new(&config).unwrap()
}

#[tokio::test]
async fn list_reads_rows_and_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .and(query_param("q", "blue note"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "_id": "s1", "name": "Blue" }],
            "pagination": { "count": 31 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = service(&server).await;
    let params = vec![
        ("q".to_string(), "blue note".to_string()),
        ("page".to_string(), "2".to_string()),
        ("limit".to_string(), "10".to_string()),
    ];
    let page = api.list(Resource::Songs, &params).await.unwrap();

    assert_eq!(page.total, 31);
    assert_eq!(page.rows[0]["_id"], "s1");
}

#[tokio::test]
async fn detail_envelope_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/albums/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "_id": "a1", "name": "Kind of Blue" }
        })))
        .mount(&server)
        .await;

    let record = service(&server).await.get(Resource::Albums, "a1").await.unwrap();
    assert_eq!(record["name"], "Kind of Blue");
}

#[tokio::test]
async fn update_patches_only_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/categories/c1"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut payload = Map::new();
    payload.insert("isActive".into(), json!(false));
    let saved = service(&server)
        .await
        .update(Resource::Categories, "c1", &payload)
        .await
        .unwrap();
    assert_eq!(saved, None);
}

#[tokio::test]
async fn error_message_is_taken_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/artists/a1"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Artist has songs" })),
        )
        .mount(&server)
        .await;

    let result = service(&server).await.delete(Resource::Artists, "a1").await;
    assert_matches!(
        result,
        Err(ApiError::Status { status: 409, message }) if message == "Artist has songs"
    );
}

#[tokio::test]
async fn image_upload_posts_multipart_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/media/images"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(|request: &Request| has_field(&request.body, "image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "path": "images/cover.png" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0; 32]);
    let file = LocalFile::from_bytes("cover.png", bytes);

    let response = service(&server)
        .await
        .upload(UploadKind::Image, &file)
        .await
        .unwrap();
    assert_eq!(response.data.path, "images/cover.png");
}
