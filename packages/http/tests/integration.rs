use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use collection_literals::btree;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remote_hash_http::HttpHashStore;
use remote_hash_store::{HashStore, Mapping, StoreConfig, StoreError};

#[tokio::test]
async fn test_get_all_via_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Alice",
            "email": "alice@example.com"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.get_all("user-123").unwrap()
    })
    .await
    .unwrap();

    let expected: Mapping = btree! {
        "email".to_string() => "alice@example.com".to_string(),
        "name".to_string() => "Alice".to_string()
    };
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_get_all_returns_empty_on_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.get_all("missing").unwrap()
    })
    .await
    .unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_get_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user-123/name"))
        .respond_with(ResponseTemplate::new(200).set_body_json("Alice"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user-123/phone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();

    let (name, phone) = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        (
            store.get_field("user-123", "name").unwrap(),
            store.get_field("user-123", "phone").unwrap(),
        )
    })
    .await
    .unwrap();

    assert_eq!(name, Some("Alice".to_string()));
    assert_eq!(phone, None);
}

#[tokio::test]
async fn test_get_fields_is_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/k/_mget"))
        .and(body_json(serde_json::json!({"fields": ["a", "z", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["1", null, "2"])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.get_fields("k", &["a", "z", "b"]).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(
        result,
        vec![Some("1".to_string()), None, Some("2".to_string())]
    );
}

#[tokio::test]
async fn test_get_fields_rejects_short_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/k/_mget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["1"])))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.get_fields("k", &["a", "b"])
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(StoreError::UnexpectedReply { .. })));
}

#[tokio::test]
async fn test_set_field_via_put() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/k/a"))
        .and(body_json("1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.set_field("k", "a", "1")
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_set_fields_is_one_patch() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/k"))
        .and(body_json(serde_json::json!({"b": "3", "c": "4"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        let pairs: Mapping = btree! {
            "b".to_string() => "3".to_string(),
            "c".to_string() => "4".to_string()
        };
        store.set_fields("k", &pairs)
    })
    .await
    .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_set_field_if_absent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/k/a/_setnx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"set": false})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/k/b/_setnx"))
        .and(body_json("2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"set": true})))
        .mount(&server)
        .await;

    let uri = server.uri();

    let (a, b) = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        (
            store.set_field_if_absent("k", "a", "2").unwrap(),
            store.set_field_if_absent("k", "b", "2").unwrap(),
        )
    })
    .await
    .unwrap();

    assert!(!a);
    assert!(b);
}

#[tokio::test]
async fn test_server_error_is_status() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/k/a"))
        .respond_with(ResponseTemplate::new(503).set_body_string("read-only replica"))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.set_field("k", "a", "1")
    })
    .await
    .unwrap();

    match result {
        Err(StoreError::Status { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "read-only replica");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        store.get_all("k")
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(StoreError::Decode { .. })));
}

#[tokio::test]
async fn test_default_headers_from_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(header("Authorization", "Bearer default-token"))
        .and(header("X-Api-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let config = StoreConfig::new(uri)
            .with_header("Authorization", "Bearer default-token")
            .with_header("X-Api-Key", "secret");
        let store = HttpHashStore::from_config(&config).unwrap();
        store.get_all("protected").unwrap()
    })
    .await
    .unwrap();

    assert_eq!(result.get("status").map(String::as_str), Some("ok"));
}

#[tokio::test]
async fn test_dot_names_are_rejected_without_a_request() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let uri = format!("{}/hashes/", server.uri());

    let results = tokio::task::spawn_blocking(move || {
        let store = HttpHashStore::new(&uri).unwrap();
        vec![
            store.get_field("user", "..").map(|_| ()),
            store.get_field("user", ".").map(|_| ()),
            store.set_field("user", "..", "v"),
            store.set_field_if_absent("user", "..", "v").map(|_| ()),
            store.get_all("..").map(|_| ()),
            store.set_fields(".", &Mapping::new()),
        ]
    })
    .await
    .unwrap();

    for result in results {
        assert!(
            matches!(result, Err(StoreError::InvalidName { .. })),
            "got {:?}",
            result
        );
    }
}

#[test]
fn test_unreadable_error_body_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut byte = [0u8; 1];
        while !request.ends_with(b"\r\n\r\n") {
            stream.read_exact(&mut byte).unwrap();
            request.push(byte[0]);
        }
        // Promise 100 bytes, send 5, hang up.
        stream
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
            .unwrap();
    });

    let store = HttpHashStore::new(&format!("http://{}/", addr)).unwrap();
    let result = store.get_field("k", "a");
    server.join().unwrap();

    match result {
        Err(StoreError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.starts_with("(unreadable body:"), "got {:?}", message);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn test_connection_refused_is_transport() {
    // Port 1 is reserved and nothing listens on it.
    let store = HttpHashStore::new("http://127.0.0.1:1/").unwrap();
    let result = store.get_all("k");
    assert!(matches!(result, Err(StoreError::Transport(_))));
}
