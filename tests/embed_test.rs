//! Integration tests for the embedding branch against a mock HTTP server

mod common;

use std::time::Duration;

use url::Url;

use common::{expected_data_url, mock_asset, mock_failing, page_html, setup_mock_server};
use pagegrab::embed::{embed_page, EmbedLimits};
use pagegrab::utils::USER_AGENT;
use pagegrab::Fetcher;

fn test_fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(10), 10 * 1024 * 1024, USER_AGENT)
        .expect("client builds")
}

#[tokio::test]
async fn failed_image_keeps_its_external_reference() {
    let mut server = setup_mock_server().await;
    let a = mock_asset(&mut server, "/a.png", "image/png", b"png-a").await;
    let b = mock_asset(&mut server, "/b.png", "image/png", b"png-b").await;
    let c = mock_failing(&mut server, "/c.png", 404).await;

    let html = page_html(
        "",
        r#"<img src="/a.png"><img src="/b.png"><img src="/c.png">"#,
    );
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    assert!(result.contains(&expected_data_url("image/png", b"png-a")));
    assert!(result.contains(&expected_data_url("image/png", b"png-b")));
    // The failed asset keeps its original external src.
    assert!(result.contains(r#"src="/c.png""#));

    a.assert_async().await;
    b.assert_async().await;
    c.assert_async().await;
}

#[tokio::test]
async fn already_inline_images_cause_no_fetches() {
    let mut server = setup_mock_server().await;
    let nothing = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let html = page_html(
        "",
        r#"<img src="data:image/png;base64,AAAA"><img src="data:image/gif;base64,BBBB">"#,
    );
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    assert!(result.contains("data:image/png;base64,AAAA"));
    assert!(result.contains("data:image/gif;base64,BBBB"));
    nothing.assert_async().await;
}

#[tokio::test]
async fn duplicate_image_references_fetch_once() {
    let mut server = setup_mock_server().await;
    let logo = server
        .mock("GET", "/logo.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(b"logo".as_slice())
        .expect(1)
        .create_async()
        .await;

    let html = page_html("", r#"<img src="/logo.png"><img src="/logo.png">"#);
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    let data_url = expected_data_url("image/png", b"logo");
    assert_eq!(result.matches(&data_url).count(), 2);
    logo.assert_async().await;
}

#[tokio::test]
async fn invalid_stylesheet_is_inlined_verbatim() {
    let mut server = setup_mock_server().await;
    let raw = "body { color red }";
    mock_asset(&mut server, "/broken.css", "text/css", raw.as_bytes()).await;

    let html = page_html(r#"<link rel="stylesheet" href="/broken.css">"#, "");
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    // The link is replaced by a style element holding the raw text untouched.
    assert!(!result.contains("<link"));
    assert!(result.contains("<style"));
    assert!(result.contains(raw));
}

#[tokio::test]
async fn stylesheet_background_image_resolves_against_stylesheet_url() {
    let mut server = setup_mock_server().await;
    mock_asset(
        &mut server,
        "/styles/theme.css",
        "text/css",
        b".hero { background: url(bg.png) no-repeat; }",
    )
    .await;
    // Relative to the stylesheet's directory, not the page.
    let bg = mock_asset(&mut server, "/styles/bg.png", "image/png", b"bg-bytes").await;

    let html = page_html(r#"<link rel="stylesheet" href="/styles/theme.css">"#, "");
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    let data_url = expected_data_url("image/png", b"bg-bytes");
    assert!(result.contains(&format!("url(\"{data_url}\")")));
    assert!(!result.contains("<link"));
    bg.assert_async().await;
}

#[tokio::test]
async fn failed_background_image_leaves_declaration_untouched() {
    let mut server = setup_mock_server().await;
    mock_asset(
        &mut server,
        "/theme.css",
        "text/css",
        b".a { background-image: url(/gone.png); }\n.b { color: red; }",
    )
    .await;
    mock_failing(&mut server, "/gone.png", 404).await;

    let html = page_html(r#"<link rel="stylesheet" href="/theme.css">"#, "");
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    // Stylesheet still inlined, original declaration value preserved.
    assert!(result.contains("<style"));
    assert!(result.contains("url(/gone.png)"));
    assert!(result.contains("color: red"));
}

#[tokio::test]
async fn script_terminators_are_escaped_before_inlining() {
    let mut server = setup_mock_server().await;
    let js = r#"var tag = "</script>"; console.log(tag);"#;
    mock_asset(
        &mut server,
        "/app.js",
        "application/javascript",
        js.as_bytes(),
    )
    .await;

    let html = page_html("", r#"<script src="/app.js"></script>"#);
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    assert!(result.contains(r#"<script type="text/javascript">"#));
    assert!(result.contains(r#"var tag = "<\/script>";"#));
    assert!(!result.contains(r#"src="/app.js""#));
}

#[tokio::test]
async fn failed_script_keeps_its_external_reference() {
    let mut server = setup_mock_server().await;
    mock_failing(&mut server, "/app.js", 500).await;

    let html = page_html("", r#"<script src="/app.js"></script>"#);
    let page_url = Url::parse(&server.url()).unwrap();

    let result = embed_page(&test_fetcher(), &page_url, &html, EmbedLimits::default())
        .await
        .unwrap();

    assert!(result.contains(r#"src="/app.js""#));
}
