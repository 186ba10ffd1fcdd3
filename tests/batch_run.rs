//! Batch discovery and sequential assembly against a mock sources index

mod common;

use std::sync::Arc;

use bookbinder::{BatchRunner, BookCandidate, Fetcher};
use common::{RecordingProgress, article_page, fast_config};

#[tokio::test]
async fn discovery_probes_and_filters_listings() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    // Five listings: accessible multi-page, locked, the excluded listing,
    // accessible single-page, and one whose probe errors out.
    let _index = server
        .mock("GET", "/sources")
        .with_body(
            "<html><body>\
             <a class=\"sources-listing--item\" href=\"/sources/open\">Open</a>\
             <a class=\"sources-listing--item\" href=\"/sources/locked\">Locked</a>\
             <a class=\"sources-listing--item\" href=\"/sources/ua\">UA</a>\
             <a class=\"sources-listing--item\" href=\"/sources/lone\">Lone</a>\
             <a class=\"sources-listing--item\" href=\"/sources/broken\">Broken</a>\
             </body></html>",
        )
        .create_async()
        .await;

    let _open = server
        .mock("GET", "/sources/open")
        .with_body(
            "<html><body><h1 class=\"page-title\">Open Book</h1>\
             <div class=\"compendium-toc-full-text\"><a href=\"/sources/open/ch1\">One</a></div>\
             </body></html>",
        )
        .create_async()
        .await;
    let _open_ch1 = server
        .mock("GET", "/sources/open/ch1")
        .with_body(article_page("one", "One", ""))
        .create_async()
        .await;

    // The locked book renders its TOC but not the content behind it
    let _locked = server
        .mock("GET", "/sources/locked")
        .with_body(
            "<html><body><h1 class=\"page-title\">Locked Book</h1>\
             <div class=\"compendium-toc-full-text\"><a href=\"/sources/locked/ch1\">One</a></div>\
             </body></html>",
        )
        .create_async()
        .await;
    let _locked_ch1 = server
        .mock("GET", "/sources/locked/ch1")
        .with_body("<html><body><p>subscribe first</p></body></html>")
        .create_async()
        .await;

    let ua = server.mock("GET", "/sources/ua").expect(0).create_async().await;

    let _lone = server
        .mock("GET", "/sources/lone")
        .with_body(
            "<html><body><h1 class=\"page-title\">Lone Book</h1>\
             <div class=\"p-article-content\">everything</div></body></html>",
        )
        .create_async()
        .await;

    let _broken = server
        .mock("GET", "/sources/broken")
        .with_status(500)
        .create_async()
        .await;

    let progress = Arc::new(RecordingProgress::default());
    let runner = BatchRunner::new(fast_config(), Fetcher::new(), progress.clone());
    let candidates = runner.discover(&format!("{url}/sources")).await.unwrap();

    assert_eq!(
        candidates,
        vec![
            BookCandidate {
                url: format!("{url}/sources/open"),
                title: "Open Book".to_string(),
            },
            BookCandidate {
                url: format!("{url}/sources/lone"),
                title: "Lone Book".to_string(),
            },
        ]
    );

    // The excluded listing counts toward the total but emits no probe event
    assert_eq!(
        progress.access_updates(),
        vec![(1, 5), (2, 5), (4, 5), (5, 5)]
    );
    let done = progress.done_messages.lock().unwrap();
    assert_eq!(
        *done,
        vec!["Please select the books you want to download".to_string()]
    );

    ua.assert_async().await;
}

#[tokio::test]
async fn failed_book_is_isolated_and_remaining_books_are_written() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _lone = server
        .mock("GET", "/sources/lone")
        .with_body(
            "<html><body><h1 class=\"page-title\">Lone Book</h1>\
             <div class=\"primary-content\">\
             <div class=\"p-article-content\"><h1 id=\"lone\">Lone</h1><p>content</p></div>\
             </div></body></html>",
        )
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/sources/gone")
        .with_status(404)
        .create_async()
        .await;

    let out_dir = tempfile::tempdir().unwrap();
    let candidates = vec![
        BookCandidate {
            url: format!("{url}/sources/gone"),
            title: "Gone Book".to_string(),
        },
        BookCandidate {
            url: format!("{url}/sources/lone"),
            title: "Lone Book".to_string(),
        },
    ];

    let progress = Arc::new(RecordingProgress::default());
    let runner = BatchRunner::new(fast_config(), Fetcher::new(), progress.clone());
    runner.run(&candidates, out_dir.path()).await.unwrap();

    // The first book failed, the second was still exported
    let permanent = progress.permanent_errors.lock().unwrap();
    assert_eq!(permanent.len(), 1);
    assert!(permanent[0].contains("Could not print book Gone Book (1)"));

    let exported = out_dir.path().join("Lone_Book.html");
    let html = std::fs::read_to_string(&exported).unwrap();
    assert!(html.contains("<title>Lone Book for Dungeons and Dragons Fifth Edition</title>"));
    assert!(html.contains("id=\"bookbinder-lone\""));

    let done = progress.done_messages.lock().unwrap();
    assert!(done.iter().any(|m| m == "Done downloading all books!"));
}
