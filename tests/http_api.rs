use std::sync::Arc;

use serde_json::{json, Value};

use reading_list::config::Config;
use reading_list::server::router;
use reading_list_core::store::memory::InMemoryStore;

const TOKEN: &str = "test-token";

async fn spawn_server() -> String {
    let mut config: Config = toml::from_str(
        r#"
        [db]
        path = "unused.sqlite"

        [server]
        bind = "127.0.0.1:0"

        [pagination.press]
        default = 2
        max = 3

        [feed]
        title = "Test Feed"
        link = "https://example.com/"
        "#,
    )
    .unwrap();
    config.auth.token = Some(TOKEN.to_string());

    let app = router(config, Arc::new(InMemoryStore::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn save(client: &reqwest::Client, base: &str, kind: &str, entry: Value) -> reqwest::Response {
    client
        .post(format!("{base}/api/entry"))
        .bearer_auth(TOKEN)
        .json(&json!({ "type": kind, "entry": entry }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/health")).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let base = spawn_server().await;
    let resp = reqwest::get(format!("{base}/api/books")).await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "unknown collection: books");
}

#[tokio::test]
async fn test_empty_collection_lists_ok() {
    let base = spawn_server().await;
    let resp = reqwest::get(format!("{base}/api/shortform?page=4")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["totalResults"], 0);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["currentPage"], 4);
    assert_eq!(body["allTags"], json!([]));
}

#[tokio::test]
async fn test_save_requires_bearer_token() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/entry"))
        .json(&json!({ "type": "press", "entry": { "title": "x", "date": "2024-01-01" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/api/entry"))
        .bearer_auth("wrong")
        .json(&json!({ "type": "press", "entry": { "title": "x", "date": "2024-01-01" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = save(&client, &base, "books", json!({ "title": "x", "date": "2024-01-01" })).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_saved_entries_are_listed_with_tags() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for (title, date, tags) in [
        ("First mention", "2024-01-10", json!(["podcast_guest"])),
        ("Second mention", "2024-02-10", json!(["interview", "podcast_guest"])),
        ("Third mention", "2024-03-10", json!([])),
    ] {
        let resp = save(
            &client,
            &base,
            "press",
            json!({ "title": title, "date": date, "tags": tags, "publisher": "The Daily" }),
        )
        .await;
        assert_eq!(resp.status(), 204);
    }

    // Configured press default page size is 2; limit above max clamps to 3.
    let body: Value = reqwest::get(format!("{base}/api/press"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["results"][0]["title"], "Third mention");
    assert_eq!(body["results"][0]["date"], "2024-03-10T00:00:00Z");
    assert_eq!(body["results"][0]["dateDisplay"], "March 10, 2024");
    assert!(body["results"][0].get("reading").is_none());
    assert_eq!(
        body["results"][1]["tags"],
        json!([
            { "value": "interview", "text": "interview" },
            { "value": "podcast_guest", "text": "podcast guest" }
        ])
    );
    assert_eq!(body["allTags"][1]["frequency"], 2);

    let body: Value = reqwest::get(format!("{base}/api/press?limit=50&tags=interview&order=reverse"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pageSize"], 3);
    assert_eq!(body["totalResults"], 1);
    assert_eq!(body["totalUnfilteredResults"], 3);

    let tags: Value = reqwest::get(format!("{base}/api/tags")).await.unwrap().json().await.unwrap();
    assert_eq!(tags["press"].as_array().unwrap().len(), 2);
    assert_eq!(tags["shortform"], json!([]));
}

#[tokio::test]
async fn test_saving_an_existing_id_conflicts() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let entry = json!({ "id": "press-1", "title": "Interview", "date": "2024-01-01", "tags": ["interview"] });

    let resp = save(&client, &base, "press", entry.clone()).await;
    assert_eq!(resp.status(), 204);

    let resp = save(&client, &base, "press", entry).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "entry already exists: press-1");

    let tags: Value = reqwest::get(format!("{base}/api/tags")).await.unwrap().json().await.unwrap();
    assert_eq!(tags["press"][0]["frequency"], 1);
}

#[tokio::test]
async fn test_landing_highlights() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let body: Value = reqwest::get(format!("{base}/api/landing")).await.unwrap().json().await.unwrap();
    assert!(body["mostRecentShortform"].is_null());
    assert!(body["mostRecentBlockchain"].is_null());

    for date in ["2024-01-01", "2024-05-01", "2024-03-01"] {
        save(&client, &base, "shortform", json!({ "title": date, "started": date })).await;
    }
    let body: Value = reqwest::get(format!("{base}/api/landing")).await.unwrap().json().await.unwrap();
    assert_eq!(body["mostRecentShortform"]["title"], "2024-05-01");
    assert_eq!(body["mostRecentShortform"]["started"], "2024-05-01T00:00:00Z");
    assert_eq!(body["mostRecentShortform"]["reading"]["icon"], "newspaper");
    assert!(body["mostRecentBlockchain"].is_null());
}

#[tokio::test]
async fn test_recent_and_rss() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for i in 1..=3 {
        save(
            &client,
            &base,
            "blockchain",
            json!({
                "title": format!("Post {i}"),
                "started": "2024-01-01",
                "entryAdded": format!("2024-01-0{i}T12:00:00Z"),
                "tags": ["defi"]
            }),
        )
        .await;
    }

    let recent: Value = reqwest::get(format!("{base}/api/blockchain/recent?count=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = recent
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Post 3", "Post 2"]);

    let resp = reqwest::get(format!("{base}/api/blockchain/rss")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/rss+xml"));
    let xml = resp.text().await.unwrap();
    assert_eq!(xml.matches("<item>").count(), 3);
    assert!(xml.contains("<title>Test Feed: blockchain</title>"));
    assert!(xml.contains("<category>defi</category>"));
}

#[tokio::test]
async fn test_reading_statuses() {
    let base = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/api/reading-statuses"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pleasure"].as_array().unwrap().len(), 4);
    assert_eq!(body["reference"].as_array().unwrap().len(), 5);
}
