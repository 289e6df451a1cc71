use bookcat_core::{
    AuthorId, AuthorStore, ConnectionPool, ConnectivityError, DatabaseConfig,
    PersistenceErrorKind, SqliteAuthorStore, SqliteTitleStore, StoreError, Title, TitleStore,
};
use std::collections::BTreeSet;

const ISBN: &str = "0-13-000001-1";

struct Fixture {
    pool: ConnectionPool,
    titles: SqliteTitleStore,
    author_ids: Vec<AuthorId>,
}

fn setup() -> Fixture {
    let pool = ConnectionPool::init(&DatabaseConfig {
        acquire_timeout_ms: 200,
        ..DatabaseConfig::in_memory()
    })
    .unwrap();
    let authors = SqliteAuthorStore::new(pool.clone());
    let author_ids = [("Paul", "Deitel"), ("Harvey", "Deitel"), ("Abbey", "Deitel")]
        .iter()
        .map(|(first, last)| authors.insert(first, last).unwrap().id)
        .collect();
    Fixture {
        titles: SqliteTitleStore::new(pool.clone()),
        pool,
        author_ids,
    }
}

fn intro(edition_number: i32) -> Title {
    Title::new(ISBN, "Intro", edition_number, "2020")
}

fn linked_ids(titles: &SqliteTitleStore, isbn: &str) -> BTreeSet<AuthorId> {
    titles
        .list_authors_for(isbn)
        .unwrap()
        .into_iter()
        .map(|author| author.id)
        .collect()
}

fn link_rows(pool: &ConnectionPool, isbn: &str) -> i64 {
    let conn = pool.acquire().unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM author_titles WHERE isbn = ?1;",
        [isbn],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn create_persists_title_and_exact_author_set() {
    let fx = setup();
    let (a1, a2) = (fx.author_ids[0], fx.author_ids[1]);

    fx.titles.create(&intro(2), &[a1, a2]).unwrap();

    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), Some(intro(2)));
    assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a1, a2]));
}

#[test]
fn update_replaces_author_set_and_fields() {
    let fx = setup();
    let (a1, a2, a3) = (fx.author_ids[0], fx.author_ids[1], fx.author_ids[2]);
    fx.titles.create(&intro(2), &[a1, a2]).unwrap();

    fx.titles.update(&intro(3), &[a2, a3]).unwrap();

    let stored = fx.titles.get_by_isbn(ISBN).unwrap().unwrap();
    assert_eq!(stored.edition_number, 3);
    assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a2, a3]));
}

#[test]
fn update_is_idempotent_and_ignores_previous_set() {
    let fx = setup();
    let (a1, a2, a3) = (fx.author_ids[0], fx.author_ids[1], fx.author_ids[2]);
    fx.titles.create(&intro(1), &[a1, a2]).unwrap();

    // Disjoint replacement.
    fx.titles.update(&intro(1), &[a3]).unwrap();
    assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a3]));

    // Identical repeats.
    for _ in 0..3 {
        fx.titles.update(&intro(1), &[a1, a3]).unwrap();
        assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a1, a3]));
        assert_eq!(link_rows(&fx.pool, ISBN), 2);
    }
}

#[test]
fn delete_removes_title_and_links() {
    let fx = setup();
    fx.titles.create(&intro(2), &fx.author_ids).unwrap();

    fx.titles.delete(ISBN).unwrap();

    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), None);
    assert!(fx.titles.list_authors_for(ISBN).unwrap().is_empty());
    assert_eq!(link_rows(&fx.pool, ISBN), 0);
}

#[test]
fn delete_of_title_without_links_still_succeeds() {
    let fx = setup();
    fx.titles.create(&intro(1), &[fx.author_ids[0]]).unwrap();
    {
        let conn = fx.pool.acquire().unwrap();
        conn.execute("DELETE FROM author_titles WHERE isbn = ?1;", [ISBN])
            .unwrap();
    }

    fx.titles.delete(ISBN).unwrap();
    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), None);
}

#[test]
fn delete_of_unknown_isbn_is_not_found() {
    let fx = setup();
    let err = fx.titles.delete("9-99-999999-9").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn duplicate_isbn_create_leaves_original_untouched() {
    let fx = setup();
    let (a1, a2, a3) = (fx.author_ids[0], fx.author_ids[1], fx.author_ids[2]);
    fx.titles.create(&intro(2), &[a1, a2]).unwrap();

    let imposter = Title::new(ISBN, "Imposter", 9, "1999");
    let err = fx.titles.create(&imposter, &[a3]).unwrap_err();

    assert_eq!(err.persistence_kind(), Some(PersistenceErrorKind::DuplicateKey));
    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), Some(intro(2)));
    assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a1, a2]));
}

#[test]
fn create_with_unknown_author_rolls_back_everything() {
    let fx = setup();
    let missing_author = 9_999;

    let err = fx
        .titles
        .create(&intro(1), &[fx.author_ids[0], missing_author])
        .unwrap_err();

    assert_eq!(
        err.persistence_kind(),
        Some(PersistenceErrorKind::ForeignKeyViolation)
    );
    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), None);
    assert_eq!(link_rows(&fx.pool, ISBN), 0);
}

#[test]
fn duplicate_author_ids_fail_closed() {
    let fx = setup();
    let a1 = fx.author_ids[0];

    let err = fx.titles.create(&intro(1), &[a1, a1]).unwrap_err();

    assert_eq!(err.persistence_kind(), Some(PersistenceErrorKind::DuplicateKey));
    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), None);
    assert_eq!(link_rows(&fx.pool, ISBN), 0);
}

#[test]
fn failed_update_keeps_previous_fields_and_links() {
    let fx = setup();
    let (a1, a2) = (fx.author_ids[0], fx.author_ids[1]);
    fx.titles.create(&intro(2), &[a1, a2]).unwrap();

    let err = fx.titles.update(&intro(5), &[a2, 4_242]).unwrap_err();

    assert_eq!(
        err.persistence_kind(),
        Some(PersistenceErrorKind::ForeignKeyViolation)
    );
    assert_eq!(fx.titles.get_by_isbn(ISBN).unwrap(), Some(intro(2)));
    assert_eq!(linked_ids(&fx.titles, ISBN), BTreeSet::from([a1, a2]));
}

#[test]
fn update_of_unknown_isbn_is_not_found_and_writes_nothing() {
    let fx = setup();

    let err = fx.titles.update(&intro(1), &[fx.author_ids[0]]).unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(link_rows(&fx.pool, ISBN), 0);
}

#[test]
fn failed_units_of_work_release_their_connection() {
    // The in-memory pool holds a single connection; a leak would make every
    // later call time out.
    let fx = setup();
    let a1 = fx.author_ids[0];

    for _ in 0..5 {
        assert!(fx.titles.create(&intro(1), &[a1, a1]).is_err());
        assert!(fx.titles.update(&intro(1), &[a1]).is_err());
        assert!(fx.titles.delete(ISBN).is_err());
    }

    let status = fx.pool.status();
    assert_eq!(status.idle, 1);
    let conn = fx.pool.acquire().unwrap();
    assert!(conn.is_autocommit());
}

#[test]
fn operations_after_shutdown_report_connectivity_failure() {
    let fx = setup();
    fx.pool.shutdown();

    let err = fx.titles.create(&intro(1), &[fx.author_ids[0]]).unwrap_err();
    assert_eq!(err, StoreError::Connectivity(ConnectivityError::Closed));
    assert!(matches!(
        fx.titles.list_all(),
        Err(StoreError::Connectivity(ConnectivityError::Closed))
    ));
}

#[test]
fn list_all_returns_titles_ordered_by_isbn() {
    let fx = setup();
    let a1 = fx.author_ids[0];
    for isbn in ["0-13-3", "0-13-1", "0-13-2"] {
        fx.titles
            .create(&Title::new(isbn, "Title", 1, "2001"), &[a1])
            .unwrap();
    }

    let listed: Vec<_> = fx
        .titles
        .list_all()
        .unwrap()
        .into_iter()
        .map(|title| title.isbn)
        .collect();
    assert_eq!(listed, vec!["0-13-1", "0-13-2", "0-13-3"]);
}
