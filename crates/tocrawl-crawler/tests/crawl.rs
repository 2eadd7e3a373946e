mod common;

use std::time::Duration;

use common::{config, guide_site, leaf_page, page, toc_page, url};
use tocrawl_crawler::{CrawlError, OnError, Orchestrator, SiteSnapshot};

#[tokio::test]
async fn chapter_yields_one_document_per_leaf() {
    let config = config();
    let page = page(guide_site(), &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let documents = orchestrator.run_chapter("/db/guide").await.unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].path, "Root|Ch1|P1");
    assert_eq!(documents[1].path, "Root|Ch1|P2");
    assert_eq!(
        documents[0].body,
        "# Page one\n\nSee page.\n\n![A](https://docs.example.com/db/img/a.png)"
    );
    assert_eq!(
        documents[1].to_string(),
        "Root|Ch1|P2\n\n# Page two\n\nRead [the manual](https://other.org/manual)."
    );
}

#[tokio::test]
async fn failing_leaf_aborts_the_chapter() {
    let config = config();
    let site = guide_site().with_page(&url("/db/guide/p2"), "<p>no frame</p>");
    let page = page(site, &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let err = orchestrator.run_chapter("/db/guide").await.unwrap_err();
    assert!(format!("{err:#}").contains("Root|Ch1|P2"));
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::SelectorNotFound { selector, .. }) if selector == "#w_metadata_doc_frame"
    ));
}

#[tokio::test]
async fn slow_leaf_times_out() {
    let mut config = config();
    config.navigation_timeout = 0.05;
    let site = guide_site().with_delay(&url("/db/guide/p1/doc.html"), Duration::from_secs(5));
    let page = page(site, &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let err = orchestrator.run_chapter("/db/guide").await.unwrap_err();
    match err.downcast_ref::<CrawlError>() {
        Some(CrawlError::NavigationTimeout { url: at, timeout }) => {
            assert_eq!(at, &url("/db/guide/p1/doc.html"));
            assert_eq!(*timeout, config.navigation_deadline());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

fn two_chapter_site() -> SiteSnapshot {
    guide_site()
        .with_page(
            &url("/db/broken"),
            toc_page(r#"<li><a href="/db/broken/x">X</a></li>"#),
        )
        .with_page(
            &url("/db/other"),
            toc_page(r#"<li><a href="/db/other/only">Only</a></li>"#),
        )
        .with_page(&url("/db/other/only"), leaf_page("doc.html"))
        .with_page(
            &url("/db/other/doc.html"),
            "<html><body><p>Only page</p></body></html>",
        )
}

fn chapters() -> Vec<String> {
    ["/db/guide", "/db/broken", "/db/other"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn skipped_chapters_do_not_stop_the_run() {
    let mut config = config();
    config.on_chapter_error = OnError::SkipAndLog;
    let page = page(two_chapter_site(), &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let reports = orchestrator.run(&chapters()).await.unwrap();
    let done: Vec<_> = reports.iter().map(|r| r.chapter.as_str()).collect();
    assert_eq!(done, vec!["/db/guide", "/db/other"]);
    assert_eq!(reports[0].documents.len(), 2);
    assert_eq!(
        reports[1].documents[0].to_string(),
        "Root|Only\n\nOnly page"
    );
    assert_eq!(reports[1].slug(), "db-other");
}

#[tokio::test]
async fn failing_chapter_stops_the_run() {
    let mut config = config();
    config.on_chapter_error = OnError::Fail;
    let page = page(two_chapter_site(), &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let err = orchestrator.run(&chapters()).await.unwrap_err();
    assert_eq!(err.to_string(), "Chapter /db/broken");
}

#[tokio::test]
async fn throttled_run_keeps_order() {
    let mut config = config();
    config.throttle = Some(0.01);
    let page = page(guide_site(), &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let documents = orchestrator.run_chapter("/db/guide").await.unwrap();
    let paths: Vec<_> = documents.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["Root|Ch1|P1", "Root|Ch1|P2"]);
}

#[tokio::test]
async fn invalid_chapter_path() {
    let config = config();
    let page = page(guide_site(), &config);
    let orchestrator = Orchestrator::new(&page, &config).unwrap();

    let err = orchestrator.run_chapter("http://[::1").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::InvalidUrl { .. })
    ));
}
