use super::*;
use std::io::Write;

#[test]
fn test_page_source_parse() {
    assert_eq!(
        PageSource::parse("https://example.com/about"),
        PageSource::Url("https://example.com/about".to_string())
    );
    assert_eq!(
        PageSource::parse(" HTTP://example.com "),
        PageSource::Url("HTTP://example.com".to_string())
    );
    assert_eq!(
        PageSource::parse("pages/index.html"),
        PageSource::File(PathBuf::from("pages/index.html"))
    );
}

#[tokio::test]
async fn test_load_local_file() {
    let path = std::env::temp_dir().join(format!("webaudit-fetch-{}.html", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "<html><body><p>Hi</p></body></html>").unwrap();

    let fetcher = PageFetcher::new().unwrap();
    let body = fetcher.load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(body, "<html><body><p>Hi</p></body></html>");

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_missing_file() {
    let fetcher = PageFetcher::new().unwrap();
    let err = fetcher.load("/nonexistent/webaudit/page.html").await.unwrap_err();
    assert!(matches!(err, FetchError::Read { .. }));

    assert_eq!(fetcher.load_or_empty("/nonexistent/webaudit/page.html").await, "");
}

#[tokio::test]
async fn test_unreachable_host() {
    let fetcher = PageFetcher::with_timeout(Duration::from_secs(2)).unwrap();
    let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(err, FetchError::RequestFailed(_)));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_fetch_live_page() {
    let fetcher = PageFetcher::new().unwrap();
    let body = fetcher.fetch("https://example.com").await.unwrap();
    assert!(body.contains("<html"));
}
