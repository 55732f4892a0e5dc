//! Contract tests for the AniList GraphQL client.
//!
//! Verify request shape, response normalization, failure mapping, and
//! the TTL cache's effect on upstream call counts.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anime_track_catalog::{AniListClient, Catalog, CatalogError, CatalogOptions};
use anime_track_models::Season;

fn media_body(id: i32, title: &str) -> serde_json::Value {
    json!({
        "data": {
            "Media": {
                "id": id,
                "title": { "romaji": title },
                "description": "A <b>bold</b> tale.",
                "coverImage": {
                    "large": "https://img.example/large.png",
                    "medium": "https://img.example/medium.png",
                    "color": "#43aee4"
                },
                "genres": ["Action", "Drama"],
                "episodes": 24,
                "nextAiringEpisode": { "episode": 7, "airingAt": 1700000000 }
            }
        }
    })
}

fn client_for(server: &MockServer) -> AniListClient {
    AniListClient::new(CatalogOptions::default().with_base_url(server.uri()))
        .expect("client construction")
}

#[tokio::test]
async fn test_fetch_by_id_parses_full_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "variables": { "id": 21 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_body(21, "One Piece")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let snapshot = client.fetch_title(21).await.expect("snapshot");

    assert_eq!(snapshot.id, 21);
    assert_eq!(snapshot.title, "One Piece");
    assert_eq!(snapshot.description.as_deref(), Some("A bold tale."));
    assert_eq!(snapshot.genres, vec!["Action", "Drama"]);
    assert_eq!(snapshot.episodes, Some(24));
    assert_eq!(snapshot.cover.large.as_deref(), Some("https://img.example/large.png"));
    let airing = snapshot.next_airing.expect("airing info");
    assert_eq!(airing.episode, 7);
    assert_eq!(airing.airing_at, 1_700_000_000);
}

#[tokio::test]
async fn test_search_sends_search_variable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "search": "frieren" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_body(154587, "Sousou no Frieren")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let snapshot = client.search_title("frieren").await.expect("snapshot");
    assert_eq!(snapshot.id, 154587);
}

#[tokio::test]
async fn test_graphql_404_error_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Not Found.", "status": 404 }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.fetch_title(999_999_999).await,
        Err(CatalogError::NotFound)
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.fetch_title(21).await,
        Err(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.search_title("anything").await,
        Err(CatalogError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_repeat_fetch_within_ttl_hits_upstream_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_body(21, "One Piece")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.fetch_title(21).await.expect("first fetch");
    client.fetch_title(21).await.expect("cached fetch");
}

#[tokio::test]
async fn test_fetch_after_ttl_expiry_hits_upstream_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_body(21, "One Piece")))
        .expect(2)
        .mount(&server)
        .await;

    let options = CatalogOptions::default()
        .with_base_url(server.uri())
        .with_cache_ttl(Duration::from_millis(50));
    let client = AniListClient::new(options).expect("client construction");

    client.fetch_title(21).await.expect("first fetch");
    tokio::time::sleep(Duration::from_millis(80)).await;
    client.fetch_title(21).await.expect("re-fetch after expiry");
}

#[tokio::test]
async fn test_search_result_cached_under_resolved_id() {
    let server = MockServer::start().await;
    // Exactly one upstream call total: the search. The follow-up fetch
    // by id must be served from the cache.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(media_body(21, "One Piece")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let found = client.search_title("one piece").await.expect("search");
    let fetched = client.fetch_title(found.id).await.expect("cached fetch");
    assert_eq!(found, fetched);
}

#[tokio::test]
async fn test_seasonal_listing_parses_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "season": "FALL", "seasonYear": 2025, "page": 1, "perPage": 2 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "Page": {
                    "media": [
                        {
                            "id": 1,
                            "title": { "romaji": "Show A" },
                            "genres": ["Comedy"],
                            "episodes": 12,
                            "coverImage": { "medium": "https://img.example/a.png" }
                        },
                        {
                            "id": 2,
                            "title": { "romaji": "Show B" },
                            "description": "Second <i>show</i>",
                            "genres": [],
                            "episodes": null,
                            "coverImage": { "medium": null }
                        }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let listing = client
        .seasonal(Season::Fall, 2025, 1, 2)
        .await
        .expect("seasonal page");

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].title, "Show A");
    assert_eq!(listing[1].description.as_deref(), Some("Second show"));
    assert_eq!(listing[1].episodes, None);
}
