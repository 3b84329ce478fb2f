//! End-to-end tests for the random item upload and listing endpoints.

mod common;

use common::{TestClient, TestServer, DISC_1_ID, EDITION_1_ID, EDITION_2_ID};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_full_batch_upload_persists_every_item() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![
                ("card", "ONEW", Some(("onew.jpg", JPEG_BYTES))),
                ("postcard", "KEY", Some(("key.jpg", JPEG_BYTES))),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert!(body["message"].as_str().unwrap().contains("2"));

    let uploads = server.image_store.recorded_uploads();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].file_name, "onew.jpg");
    assert_eq!(uploads[0].content_type, "image/jpeg");

    let items: Vec<serde_json::Value> = client
        .get_items(&format!("editionId={}", EDITION_1_ID))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["itemType"], "card");
    assert_eq!(items[0]["memberName"], "ONEW");
    assert!(items[0]["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://img.test/objects/"));
    assert!(items[0]["createdAt"].as_i64().unwrap() > 0);
    assert!(items[1]["itemId"].as_i64().unwrap() > items[0]["itemId"].as_i64().unwrap());
}

#[tokio::test]
async fn test_empty_slot_is_skipped_and_pairing_is_kept() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![
                ("card", "ONEW", Some(("onew.jpg", JPEG_BYTES))),
                ("card", "KEY", None),
                ("poster", "MINHO", Some(("minho.jpg", JPEG_BYTES))),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    // The empty slot is not an error and not counted.
    assert_eq!(body["count"], 2);

    // Slot 2 kept its own metadata despite slot 1 being skipped.
    let items: Vec<serde_json::Value> = client.get_items("").await.json().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["itemType"], "poster");
    assert_eq!(items[1]["memberName"], "MINHO");
}

#[tokio::test]
async fn test_mid_batch_upload_failure_keeps_earlier_items() {
    // The second upload attempt (0-based index 1) fails.
    let server = TestServer::spawn_with_failing_upload(1).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![
                ("card", "ONEW", Some(("onew.jpg", JPEG_BYTES))),
                ("card", "KEY", Some(("key.jpg", JPEG_BYTES))),
                ("card", "MINHO", Some(("minho.jpg", JPEG_BYTES))),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["failedIndex"], 1);
    assert_eq!(body["persistedCount"], 1);
    assert!(body["error"].as_str().unwrap().contains("upload failed"));

    // Item 0 survived; item 2 was never attempted.
    let items: Vec<serde_json::Value> = client.get_items("").await.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["memberName"], "ONEW");
    assert_eq!(server.image_store.attempt_count(), 2);
}

#[tokio::test]
async fn test_misaligned_arrays_are_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // Two names, one memberName, two images.
    let form = Form::new()
        .text("discId", DISC_1_ID)
        .text("editionId", EDITION_1_ID)
        .text("names", "card")
        .text("names", "card")
        .text("memberNames", "ONEW")
        .part(
            "images",
            Part::bytes(JPEG_BYTES.to_vec()).file_name("a.jpg"),
        )
        .part(
            "images",
            Part::bytes(JPEG_BYTES.to_vec()).file_name("b.jpg"),
        );

    let response = client.upload_raw(form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("misaligned"));

    // Nothing was uploaded or persisted.
    assert_eq!(server.image_store.attempt_count(), 0);
    let items: Vec<serde_json::Value> = client.get_items("").await.json().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_upload_without_edition_id_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let form = Form::new()
        .text("discId", DISC_1_ID)
        .text("names", "card")
        .text("memberNames", "ONEW")
        .part(
            "images",
            Part::bytes(JPEG_BYTES.to_vec()).file_name("a.jpg"),
        );

    let response = client.upload_raw(form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_batch_succeeds_with_zero_count() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.upload_items(DISC_1_ID, EDITION_1_ID, vec![]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(server.image_store.attempt_count(), 0);
}

#[tokio::test]
async fn test_upload_answers_503_without_image_storage() {
    let server = TestServer::spawn_without_image_store().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![("card", "ONEW", Some(("onew.jpg", JPEG_BYTES)))],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_items_listing_filters_by_edition() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![("card", "ONEW", Some(("a.jpg", JPEG_BYTES)))],
        )
        .await;
    client
        .upload_items(
            DISC_1_ID,
            EDITION_2_ID,
            vec![("card", "KEY", Some(("b.jpg", JPEG_BYTES)))],
        )
        .await;

    let items: Vec<serde_json::Value> = client
        .get_items(&format!("editionId={}", EDITION_2_ID))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["editionId"], EDITION_2_ID);
}

#[tokio::test]
async fn test_items_listing_treats_undefined_and_empty_as_no_filter() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client
        .upload_items(
            DISC_1_ID,
            EDITION_1_ID,
            vec![
                ("card", "ONEW", Some(("a.jpg", JPEG_BYTES))),
                ("card", "KEY", Some(("b.jpg", JPEG_BYTES))),
            ],
        )
        .await;

    for query in ["", "editionId=", "editionId=undefined"] {
        let response = client.get_items(query).await;
        assert_eq!(response.status(), StatusCode::OK);
        let items: Vec<serde_json::Value> = response.json().await.unwrap();
        assert_eq!(items.len(), 2, "query {:?} should list everything", query);
    }
}

#[tokio::test]
async fn test_items_listing_is_empty_without_uploads() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_items("").await;
    assert_eq!(response.status(), StatusCode::OK);
    let items: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(items.is_empty());
}
