use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spacetraveling::cms::{CmsError, ContentApi, PrismicClient};
use spacetraveling::config::CmsConfig;

const TYPE_QUERY: &str = r#"[[at(document.type, "post")]]"#;

fn client(server: &MockServer, token: Option<&str>) -> PrismicClient {
    let config = CmsConfig {
        endpoint: format!("{}/api/v2", server.uri()),
        access_token: token.map(str::to_string),
        ..CmsConfig::default()
    };
    PrismicClient::new(&config).unwrap()
}

async fn mount_master_ref(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [
                {"id": "master", "ref": "master-ref", "label": "Master", "isMasterRef": true}
            ]
        })))
        .mount(server)
        .await;
}

fn document(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("id-{uid}"),
        "uid": uid,
        "type": "post",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": "Pensando em sincronização",
            "author": "Joseph Oliveira"
        }
    })
}

fn envelope(results: Vec<Value>, next_page: Option<String>) -> Value {
    json!({
        "page": 1,
        "results_per_page": results.len(),
        "total_results_size": results.len(),
        "total_pages": 1,
        "next_page": next_page,
        "results": results
    })
}

#[tokio::test]
async fn first_page_queries_master_ref_and_follows_cursor() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    let cursor = format!(
        "{}/api/v2/documents/search?ref=master-ref&page=2&pageSize=4",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("ref", "master-ref"))
        .and(query_param("q", TYPE_QUERY))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "4"))
        .and(query_param("fetch", "post.title,post.subtitle,post.author"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            vec![document("first", "First"), document("second", "Second")],
            Some(cursor.clone()),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(vec![document("third", "Third")], None)),
        )
        .mount(&server)
        .await;

    let api = client(&server, None);

    let first = api.first_page().await.unwrap();
    let uids: Vec<_> = first.results.iter().map(|p| p.uid.as_str()).collect();
    assert_eq!(uids, ["first", "second"]);
    assert_eq!(first.results[0].author, "Joseph Oliveira");
    assert_eq!(first.next_page.as_deref(), Some(cursor.as_str()));

    let second = api.next_page(&cursor).await.unwrap();
    assert_eq!(second.results.len(), 1);
    assert_eq!(second.results[0].title, "Third");
    assert_eq!(second.next_page, None);
}

#[tokio::test]
async fn post_by_uid() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    let mut doc = document("como-utilizar-hooks", "Como utilizar Hooks");
    doc["data"]["banner"] = json!({"url": "https://images.prismic.io/banner.png"});
    doc["data"]["content"] = json!([
        {
            "heading": "Proin et varius",
            "body": [{"type": "paragraph", "text": "Lorem ipsum dolor", "spans": []}]
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param(
            "q",
            r#"[[at(document.type, "post")][at(my.post.uid, "como-utilizar-hooks")]]"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![doc], None)))
        .mount(&server)
        .await;

    let post = client(&server, None)
        .post("como-utilizar-hooks")
        .await
        .unwrap();

    assert_eq!(post.title, "Como utilizar Hooks");
    assert_eq!(post.banner.as_deref(), Some("https://images.prismic.io/banner.png"));
    assert_eq!(post.content.len(), 1);
    assert_eq!(post.content[0].heading, "Proin et varius");
    assert_eq!(post.content[0].body[0].text, "Lorem ipsum dolor");
}

#[tokio::test]
async fn unknown_uid_is_not_found() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![], None)))
        .mount(&server)
        .await;

    let err = client(&server, None).post("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn post_uids_walks_every_page() {
    let server = MockServer::start().await;
    mount_master_ref(&server).await;

    let cursor = format!("{}/api/v2/documents/search?page=2&pageSize=100", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            vec![document("a", "A"), document("b", "B")],
            Some(cursor),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(vec![document("c", "C")], None)),
        )
        .mount(&server)
        .await;

    let uids = client(&server, None).post_uids().await.unwrap();
    assert_eq!(uids, ["a", "b", "c"]);
}

#[tokio::test]
async fn access_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [{"id": "master", "ref": "master-ref", "isMasterRef": true}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/documents/search"))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![], None)))
        .mount(&server)
        .await;

    let page = client(&server, Some("secret")).first_page().await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn missing_master_ref_and_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refs": []})))
        .mount(&server)
        .await;

    let err = client(&server, None).first_page().await.unwrap_err();
    assert!(matches!(err, CmsError::NoMasterRef));

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let err = client(&broken, None).first_page().await.unwrap_err();
    assert!(matches!(err, CmsError::Http(_)));
}

#[tokio::test]
async fn cursor_must_be_http() {
    let server = MockServer::start().await;
    let api = client(&server, None);

    let err = api.next_page("file:///etc/passwd").await.unwrap_err();
    assert!(matches!(err, CmsError::InvalidCursor(_)));

    let err = api.next_page("not a url").await.unwrap_err();
    assert!(matches!(err, CmsError::InvalidCursor(_)));
}
