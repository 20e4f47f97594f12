mod common;

use common::{book_with, memory_repo};
use quotesync_core::{
    derive_categories, MemoryKeyValueStore, Quote, QuoteBook, QuoteBookError, QuoteRepository,
    SqliteKeyValueStore, ALL_CATEGORIES,
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[test]
fn add_quote_grows_collection_by_exactly_one_unsynced_record() {
    let (_, mut book) = book_with(vec![Quote::new(1, "a", "X"), Quote::from_remote(99, "s")]);
    for text in ["first", "  padded  ", "x"] {
        let before = book.len();
        let added = book.add_quote(text, Some("Zen")).unwrap();
        assert_eq!(book.len(), before + 1);
        assert!(!added.synced);
        assert_eq!(book.get(added.id), Some(&added));
    }
    let ids: BTreeSet<_> = book.quotes().iter().map(|quote| quote.id).collect();
    assert_eq!(ids.len(), book.len());
    assert_eq!(book.quotes().last().unwrap().id, 102);
}

#[test]
fn category_set_is_all_plus_sorted_distinct_categories() {
    let (_, mut book) = book_with(Vec::new());
    assert_eq!(book.categories(), vec![ALL_CATEGORIES]);

    book.add_quote("a", Some("Wisdom")).unwrap();
    book.add_quote("b", Some("Art")).unwrap();
    book.add_quote("c", Some("Wisdom")).unwrap();
    book.add_quote("d", None).unwrap();

    assert_eq!(
        book.categories(),
        vec![ALL_CATEGORIES, "Art", "General", "Wisdom"]
    );
    assert_eq!(book.categories(), derive_categories(book.quotes()));
}

#[test]
fn filter_all_returns_every_quote() {
    let (_, book) = book_with(vec![Quote::new(1, "a", "X"), Quote::new(2, "b", "Y")]);
    assert_eq!(book.filtered(ALL_CATEGORIES).len(), 2);
    assert_eq!(book.filtered("Y").len(), 1);
    assert!(book.filtered("Z").is_empty());
}

#[test]
fn remove_quote_persists_and_updates_categories() {
    let (_, repo) = memory_repo();
    let mut book = QuoteBook::with_quotes(
        repo.clone(),
        vec![Quote::new(1, "a", "X"), Quote::new(2, "b", "Y")],
    );
    let removed = book.remove_quote(2).unwrap();
    assert_eq!(removed.id, 2);
    assert_eq!(book.categories(), vec![ALL_CATEGORIES, "X"]);

    let reloaded = QuoteBook::load(repo).unwrap();
    assert_eq!(reloaded.quotes(), book.quotes());
}

#[test]
fn failed_write_leaves_collection_unchanged() {
    let durable = Arc::new(common::FlakyStore::default());
    let repo = QuoteRepository::new(durable.clone(), Arc::new(MemoryKeyValueStore::new()));
    let mut book = QuoteBook::with_quotes(repo, vec![Quote::new(1, "a", "X")]);
    durable.set_fail_writes(true);

    let err = book.add_quote("new", None).unwrap_err();
    assert!(matches!(err, QuoteBookError::Repo(_)));
    assert_eq!(book.len(), 1);
}

#[test]
fn collection_and_selection_survive_reopening_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("quotes.sqlite3");

    {
        let durable = Arc::new(SqliteKeyValueStore::open(&db_path).unwrap());
        let repo = QuoteRepository::new(durable, Arc::new(MemoryKeyValueStore::new()));
        let mut book = QuoteBook::load(repo).unwrap();
        assert_eq!(book.len(), 3);
        book.add_quote("kept across restarts", Some("Memory")).unwrap();
        book.select_category("Memory").unwrap();
    }

    let durable = Arc::new(SqliteKeyValueStore::open(&db_path).unwrap());
    let repo = QuoteRepository::new(durable, Arc::new(MemoryKeyValueStore::new()));
    let book = QuoteBook::load(repo).unwrap();
    assert_eq!(book.len(), 4);
    assert_eq!(book.quotes().last().unwrap().text, "kept across restarts");
    assert_eq!(book.selected_category().unwrap(), "Memory");
    assert!(book.last_shown().unwrap().is_none());
}
