//! Shared helpers for integration tests

use mockito::{Mock, Server, ServerGuard};

/// Start a mock HTTP server for asset and page fixtures.
pub async fn setup_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Mock an endpoint returning a successful asset response.
pub async fn mock_asset(
    server: &mut ServerGuard,
    path: &str,
    content_type: &str,
    body: &[u8],
) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", content_type)
        .with_body(body)
        .create_async()
        .await
}

/// Mock an endpoint that fails with the given status.
pub async fn mock_failing(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .create_async()
        .await
}

/// Build a small test page with the given head and body fragments.
pub fn page_html(head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>fixture</title>
    {head}
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// The data URL the embedder should produce for `body` served as
/// `content_type`.
pub fn expected_data_url(content_type: &str, body: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    format!("data:{content_type};base64,{}", STANDARD.encode(body))
}
