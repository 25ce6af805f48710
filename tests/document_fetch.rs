//! HTTP document source against a mock upstream

use policy_qa::{
    config::DocumentConfig,
    ingest::{load_document, DocumentSource, HttpDocumentSource},
    QaError,
};

const POLICY: &str = "A grace period of thirty days is allowed for payment of renewal premium.";

fn source(config: DocumentConfig) -> HttpDocumentSource {
    HttpDocumentSource::new(DocumentConfig {
        retry_backoff_ms: 10,
        ..config
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/policy.pdf")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(POLICY)
        .create_async()
        .await;

    let url = format!("{}/policy.pdf?sv=2023&sig=abc", server.url());
    let fetched = source(DocumentConfig::default()).fetch(&url).await.unwrap();

    assert_eq!(fetched.bytes.as_ref(), POLICY.as_bytes());
    assert_eq!(fetched.content_type.as_deref(), Some("text/plain"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/missing.pdf")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/missing.pdf", server.url());
    let result = source(DocumentConfig::default()).fetch(&url).await;

    assert!(matches!(result, Err(QaError::UpstreamStatus { status: 404 })));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky.pdf")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let config = DocumentConfig {
        retry_attempts: 2,
        ..Default::default()
    };
    let url = format!("{}/flaky.pdf", server.url());
    let result = source(config).fetch(&url).await;

    assert!(matches!(result, Err(QaError::UpstreamStatus { status: 503 })));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_oversized_document_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/huge.pdf")
        .with_status(200)
        .with_body("x".repeat(4096))
        .create_async()
        .await;

    let config = DocumentConfig {
        max_document_bytes: 1024,
        ..Default::default()
    };
    let url = format!("{}/huge.pdf", server.url());
    let result = source(config).fetch(&url).await;

    assert!(matches!(
        result,
        Err(QaError::DocumentTooLarge { limit: 1024, .. })
    ));
}

#[tokio::test]
async fn test_load_document_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/policy.txt")
        .with_status(200)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body(POLICY)
        .create_async()
        .await;

    let url = format!("{}/policy.txt", server.url());
    let http = source(DocumentConfig::default());
    let document = load_document(&http, &url, 50).await.unwrap();

    assert!(document.lowered().contains("grace period of thirty days"));
}

#[tokio::test]
async fn test_docx_recognized_by_url_suffix() {
    use docx_rs::{Docx, Paragraph, Run};

    let mut packed = std::io::Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(POLICY)))
        .build()
        .pack(&mut packed)
        .unwrap();

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/policy.docx")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(packed.into_inner())
        .create_async()
        .await;

    let url = format!("{}/policy.docx?sv=2023&sig=abc", server.url());
    let http = source(DocumentConfig::default());
    let document = load_document(&http, &url, 50).await.unwrap();

    assert_eq!(document.text(), POLICY);
}
