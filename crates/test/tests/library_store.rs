use readtrack_application::{Library, LibraryError};
use readtrack_core::{Book, BookDraft, Theme, progress_string};
use readtrack_storage::Storage;
use readtrack_test::{make_book, make_chapter_book};

fn sample() -> Vec<Book> {
    vec![
        make_book("Dune", "Frank Herbert", Some(100), Some(412)),
        make_chapter_book("The Hobbit", "J. R. R. Tolkien", Some(7), Some(19)),
        make_book("Neuromancer", "William Gibson", None, None),
        Book {
            image_path: Some("/nowhere/cover.png".to_string()),
            ..make_book("Snow Crash", "Neal Stephenson", Some(0), Some(480))
        },
    ]
}

#[test]
fn save_then_load_yields_equal_catalog_and_theme() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.json");

    let (mut library, _) = Library::open(Storage::new(&path));
    for book in sample() {
        library.append(book).unwrap();
    }
    library.toggle_theme();
    library.save().unwrap();

    let (reopened, issue) = Library::open(Storage::new(&path));
    assert!(issue.is_none());
    assert_eq!(reopened.books(), sample().as_slice());
    assert_eq!(reopened.theme(), Theme::Dark);
}

#[test]
fn delete_shifts_every_later_index() {
    let dir = tempfile::tempdir().unwrap();
    let books = sample();

    for i in 0..books.len() {
        let path = dir.path().join(format!("books-{i}.json"));
        let (mut library, _) = Library::open(Storage::new(&path));
        for book in &books {
            library.append(book.clone()).unwrap();
        }

        library.remove_at(i).unwrap();

        let mut expected = books.clone();
        expected.remove(i);
        assert_eq!(library.books(), expected.as_slice());
        let persisted = Storage::new(&path).try_load().unwrap().books;
        assert_eq!(persisted, expected);
    }
}

#[test]
fn progress_strings_for_catalog() {
    let strings: Vec<String> = sample().iter().map(progress_string).collect();
    assert_eq!(
        strings,
        vec![
            "100/412 (24%) pages",
            "7/19 (37%) chapters",
            "N/A",
            "0/480 (0%) pages",
        ]
    );
}

#[test]
fn edit_through_draft_rejects_overshoot() {
    let dir = tempfile::tempdir().unwrap();
    let (mut library, _) = Library::open(Storage::new(dir.path().join("books.json")));
    library.append(sample().remove(0)).unwrap();

    let mut draft = BookDraft::from_book(&library.books()[0]);
    draft.current_progress = "500".to_string();
    let err = draft.to_book().unwrap_err();
    assert!(err.to_string().contains("exceeds total"));

    draft.current_progress = "412".to_string();
    let edited = draft.to_book().unwrap();
    library.replace(0, edited).unwrap();
    assert_eq!(progress_string(&library.books()[0]), "412/412 (100%) pages");
}

#[test]
fn out_of_range_edit_is_a_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let (mut library, _) = Library::open(Storage::new(dir.path().join("books.json")));

    let err = library.replace(0, sample().remove(0)).unwrap_err();
    assert!(matches!(err, LibraryError::IndexOutOfRange { index: 0, len: 0 }));
}
