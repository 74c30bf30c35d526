use std::sync::Arc;
use std::time::Duration;

use readtrack_application::{LookupCoordinator, LookupPhase, LookupStatus};
use readtrack_core::Isbn;
use readtrack_engine::{BookMetadata, FailureKind, FetchError, LookupError, resolve};
use readtrack_test::{ScriptedCatalog, edition, work};

const DUNE_ISBN: &str = "0441013597";
const GOOD_OMENS_ISBN: &str = "9780060853983";

fn isbn(value: &str) -> Isbn {
    Isbn::parse(value).unwrap()
}

#[test]
fn dune_with_embedded_author() {
    let api = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Ok(edition(Some("Dune"), None, &["/authors/A1"])))
        .with_author("/authors/A1", Ok("Frank Herbert"));

    let found = resolve(&api, &isbn(DUNE_ISBN)).unwrap();

    assert_eq!(
        found,
        Some(BookMetadata {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        })
    );
}

#[test]
fn work_failure_discards_partial_result() {
    let api = ScriptedCatalog::new()
        .with_edition(
            DUNE_ISBN,
            Ok(edition(Some("Dune"), Some("/works/W1"), &["/authors/A1"])),
        )
        .with_work("/works/W1", Err(FetchError::Network("connection reset".to_string())))
        .with_author("/authors/A1", Ok("Frank Herbert"));

    let err = resolve(&api, &isbn(DUNE_ISBN)).unwrap_err();

    assert!(matches!(err, LookupError::Work(FetchError::Network(_))));
    assert_eq!(err.kind(), FailureKind::Network);
    assert_eq!(
        api.calls(),
        vec![format!("edition:{DUNE_ISBN}"), "work:/works/W1".to_string()]
    );
}

#[test]
fn one_failed_author_of_three_keeps_order() {
    let api = ScriptedCatalog::new()
        .with_edition(
            GOOD_OMENS_ISBN,
            Ok(edition(Some("Good Omens"), Some("/works/W2"), &[])),
        )
        .with_work(
            "/works/W2",
            Ok(work(&["/authors/P", "/authors/X", "/authors/G"])),
        )
        .with_author("/authors/P", Ok("Terry Pratchett"))
        .with_author("/authors/X", Err(FetchError::Timeout))
        .with_author("/authors/G", Ok("Neil Gaiman"));

    let found = resolve(&api, &isbn(GOOD_OMENS_ISBN)).unwrap().unwrap();

    assert_eq!(found.title, "Good Omens");
    assert_eq!(found.author, "Terry Pratchett, Unknown Author, Neil Gaiman");
    assert_eq!(
        api.calls()[2..],
        [
            "author:/authors/P".to_string(),
            "author:/authors/X".to_string(),
            "author:/authors/G".to_string(),
        ]
    );
}

#[test]
fn edition_failure_runs_no_further_stages() {
    let api = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Err(FetchError::Parse("expected value".to_string())));

    let err = resolve(&api, &isbn(DUNE_ISBN)).unwrap_err();

    assert_eq!(err.kind(), FailureKind::Parse);
    assert_eq!(api.calls().len(), 1);
}

#[test]
fn coordinator_does_not_block_while_worker_runs() {
    let (api, gate) = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Ok(edition(Some("Dune"), None, &["/authors/A1"])))
        .with_author("/authors/A1", Ok("Frank Herbert"))
        .gated();
    let mut coordinator = LookupCoordinator::new(Arc::new(api));

    assert_eq!(coordinator.request(DUNE_ISBN), None);
    assert_eq!(coordinator.phase(), LookupPhase::Running);
    // The worker is parked on the gate; the owner keeps getting control back.
    for _ in 0..5 {
        assert_eq!(coordinator.poll(), None);
    }
    assert_eq!(coordinator.wait_timeout(Duration::from_millis(50)), None);

    gate.open();
    let status = coordinator.wait_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(status.label(), "found");
    assert_eq!(
        status,
        LookupStatus::Found(BookMetadata {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        })
    );
    assert_eq!(coordinator.poll(), None);
    assert_eq!(coordinator.phase(), LookupPhase::Idle);
}

#[test]
fn coordinator_reports_classified_errors() {
    let api = ScriptedCatalog::new().with_edition(DUNE_ISBN, Err(FetchError::Timeout));
    let mut coordinator = LookupCoordinator::new(Arc::new(api));

    assert_eq!(coordinator.request(DUNE_ISBN), None);
    let status = coordinator.wait_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(status.label(), "error:timeout");
    assert_eq!(status.message(), "Lookup timed out");
}

#[test]
fn coordinator_reports_not_found() {
    let api = ScriptedCatalog::new().with_edition(DUNE_ISBN, Ok(edition(None, None, &[])));
    let mut coordinator = LookupCoordinator::new(Arc::new(api));

    assert_eq!(coordinator.request(DUNE_ISBN), None);
    let status = coordinator.wait_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(status, LookupStatus::NotFound);
    assert_eq!(status.label(), "not-found");
}

#[test]
fn invalid_isbn_never_reaches_the_catalog() {
    let api = Arc::new(ScriptedCatalog::new());
    let mut coordinator = LookupCoordinator::new(api.clone());

    let status = coordinator.request("044101359").unwrap();

    assert_eq!(status.label(), "invalid-input");
    assert!(api.calls().is_empty());
}

#[test]
fn dialogs_have_independent_coordinators() {
    let (slow_api, gate) = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Ok(edition(Some("Dune"), None, &[])))
        .gated();
    let fast_api = ScriptedCatalog::new()
        .with_edition(GOOD_OMENS_ISBN, Ok(edition(Some("Good Omens"), None, &[])));
    let mut slow = LookupCoordinator::new(Arc::new(slow_api));
    let mut fast = LookupCoordinator::new(Arc::new(fast_api));

    assert_eq!(slow.request(DUNE_ISBN), None);
    assert_eq!(fast.request(GOOD_OMENS_ISBN), None);

    let fast_status = fast.wait_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(fast_status, LookupStatus::Found(ref m) if m.title == "Good Omens"));
    assert_eq!(slow.poll(), None);

    gate.open();
    let slow_status = slow.wait_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(slow_status, LookupStatus::Found(ref m) if m.title == "Dune"));
}

#[test]
fn dropping_coordinator_discards_outstanding_result() {
    let (api, gate) = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Ok(edition(Some("Dune"), None, &[])))
        .gated();
    let api = Arc::new(api);
    let mut coordinator = LookupCoordinator::new(api.clone());

    assert_eq!(coordinator.request(DUNE_ISBN), None);
    drop(coordinator);
    gate.open();

    // The worker still ran to completion; its send simply went nowhere.
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while Arc::strong_count(&api) > 1 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(Arc::strong_count(&api), 1);
    assert_eq!(api.calls(), vec![format!("edition:{DUNE_ISBN}")]);
}

#[test]
fn newer_request_replaces_pending_one() {
    let (api, gate) = ScriptedCatalog::new()
        .with_edition(DUNE_ISBN, Ok(edition(Some("Dune"), None, &[])))
        .with_edition(GOOD_OMENS_ISBN, Ok(edition(Some("Good Omens"), None, &[])))
        .gated();
    let mut coordinator = LookupCoordinator::new(Arc::new(api));

    assert_eq!(coordinator.request(DUNE_ISBN), None);
    assert_eq!(coordinator.request(GOOD_OMENS_ISBN), None);
    assert_eq!(
        coordinator.pending_isbn().map(Isbn::as_str),
        Some(GOOD_OMENS_ISBN)
    );
    gate.open();

    let status = coordinator.wait_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(status, LookupStatus::Found(ref m) if m.title == "Good Omens"));
    assert_eq!(coordinator.poll(), None);
}
