use docsearch_core::{
    build_index, IndexReader, PostingsSource, SearchConfig, SearchError, SearchStatus, Searcher, Strategy,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_corpus(dir: &Path, docs: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in docs {
        fs::write(dir.join(name), text).unwrap();
    }
}

fn sample_corpus(dir: &Path) {
    write_corpus(
        dir,
        &[
            ("hitchhikers.txt", "Don't Panic. The Hitchhiker's Guide says: don't panic!\nTowels matter."),
            ("warp_drive.txt", "A warp drive bends space. Such drives need exotic matter; the warp drive is theoretical."),
            ("french_armed_forces.txt", "The French Armed Forces include the army, the navy and the air force."),
            ("notes.md", "warp drive warp drive warp drive"),
        ],
    );
}

fn searcher(root: &Path) -> Searcher {
    let mut cfg = SearchConfig::new(root.join("corpus"), root.join("index"));
    cfg.workers = 2;
    Searcher::new(cfg)
}

fn counts(outcome: &docsearch_core::SearchOutcome) -> Vec<(String, u32)> {
    outcome.results.iter().map(|r| (r.name.clone(), r.count)).collect()
}

#[test]
fn all_strategies_rank_the_same_corpus() {
    let dir = tempdir().unwrap();
    sample_corpus(&dir.path().join("corpus"));
    let mut s = searcher(dir.path());

    for strategy in Strategy::ALL {
        let out = s.search("warp drive", strategy).unwrap();
        assert_eq!(out.status, SearchStatus::Ranked);
        assert_eq!(
            counts(&out),
            vec![
                ("warp_drive.txt".to_string(), 2),
                ("french_armed_forces.txt".to_string(), 0),
                ("hitchhikers.txt".to_string(), 0),
            ],
            "strategy {strategy}"
        );
        assert!(out.diagnostics.is_empty());
    }
}

#[test]
fn substring_and_pattern_differ_on_word_boundaries() {
    let dir = tempdir().unwrap();
    sample_corpus(&dir.path().join("corpus"));
    let mut s = searcher(dir.path());

    let sub = s.search("warp drive", Strategy::Substring).unwrap();
    assert_eq!(sub.results[0].count, 2);
    // "drives" contains "drive" as a substring.
    let sub = s.search("drive", Strategy::Substring).unwrap();
    assert_eq!(sub.results[0], docsearch_core::RankedDoc { name: "warp_drive.txt".into(), count: 3 });
    let pat = s.search("drive", Strategy::Pattern).unwrap();
    assert_eq!(pat.results[0].count, 2);
    let idx = s.search("drive", Strategy::Indexed).unwrap();
    assert_eq!(idx.results[0].count, 2);
}

#[test]
fn single_token_index_query_matches_whole_word_scan() {
    let dir = tempdir().unwrap();
    sample_corpus(&dir.path().join("corpus"));
    let mut s = searcher(dir.path());
    for term in ["the", "panic", "matter", "towels", "absent"] {
        let pat = s.search(term, Strategy::Pattern).unwrap();
        let idx = s.search(term, Strategy::Indexed).unwrap();
        assert_eq!(counts(&pat), counts(&idx), "term {term}");
    }
}

#[test]
fn ties_are_broken_by_name_and_stable() {
    let dir = tempdir().unwrap();
    write_corpus(&dir.path().join("corpus"), &[("c.txt", "x"), ("a.txt", "x"), ("b.txt", "x x")]);
    let mut s = searcher(dir.path());
    let first = s.search("x", Strategy::Substring).unwrap();
    let names: Vec<&str> = first.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["b.txt", "a.txt", "c.txt"]);
    for _ in 0..5 {
        assert_eq!(s.search("x", Strategy::Substring).unwrap().results, first.results);
    }
}

#[test]
fn blank_term_is_rejected_before_touching_files() {
    let dir = tempdir().unwrap();
    let mut s = searcher(dir.path());
    for term in ["", "   ", "\t\n"] {
        let err = s.search(term, Strategy::Substring).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }
    assert!(!dir.path().join("index").exists());
}

#[test]
fn punctuation_only_term_gives_zero_everywhere() {
    let dir = tempdir().unwrap();
    sample_corpus(&dir.path().join("corpus"));
    let mut s = searcher(dir.path());
    for strategy in Strategy::ALL {
        let out = s.search("?!", strategy).unwrap();
        assert_eq!(out.results.len(), 3);
        assert_eq!(out.total_matches(), 0);
    }
}

#[test]
fn punctuation_only_indexed_query_builds_nothing() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus, &[("a.txt", "alpha")]);
    fs::write(corpus.join("bad.txt"), [0xffu8, 0xfe]).unwrap();
    let mut s = searcher(dir.path());

    let out = s.search("!!!", Strategy::Indexed).unwrap();
    assert_eq!(out.status, SearchStatus::Ranked);
    assert_eq!(counts(&out), vec![("a.txt".to_string(), 0), ("bad.txt".to_string(), 0)]);
    assert!(out.diagnostics.is_empty(), "diagnostics: {:?}", out.diagnostics);
    assert!(!dir.path().join("index").exists());

    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("corpus")).unwrap();
    let mut s = searcher(dir.path());
    let out = s.search("...", Strategy::Indexed).unwrap();
    assert_eq!(out.status, SearchStatus::CorpusEmpty);
    assert!(!dir.path().join("index").exists());
}

#[test]
fn empty_corpus_is_distinct_from_zero_matches() {
    let dir = tempdir().unwrap();
    write_corpus(&dir.path().join("corpus"), &[("readme.md", "not a text file")]);
    let mut s = searcher(dir.path());
    for strategy in Strategy::ALL {
        let out = s.search("anything", strategy).unwrap();
        assert_eq!(out.status, SearchStatus::CorpusEmpty, "strategy {strategy}");
        assert!(out.results.is_empty());
        assert!(!out.diagnostics.is_empty());
    }

    let dir = tempdir().unwrap();
    write_corpus(&dir.path().join("corpus"), &[("a.txt", "nothing here")]);
    let mut s = searcher(dir.path());
    let out = s.search("anything", Strategy::Indexed).unwrap();
    assert_eq!(out.status, SearchStatus::Ranked);
    assert_eq!(counts(&out), vec![("a.txt".to_string(), 0)]);
}

#[test]
fn missing_corpus_directory_reports_empty() {
    let dir = tempdir().unwrap();
    let mut s = searcher(dir.path());
    let out = s.search("x", Strategy::Pattern).unwrap();
    assert_eq!(out.status, SearchStatus::CorpusEmpty);
    assert!(out.diagnostics.iter().any(|d| d.contains("cannot read corpus directory")));
}

#[test]
fn unreadable_documents_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus, &[("good.txt", "towel towel"), ("other.txt", "no")]);
    fs::write(corpus.join("binary.txt"), [0xc3u8, 0x28, 0xa0, 0xa1]).unwrap();
    let mut s = searcher(dir.path());

    for strategy in Strategy::ALL {
        let out = s.search("towel", strategy).unwrap();
        assert_eq!(out.status, SearchStatus::Ranked);
        assert_eq!(counts(&out), vec![("good.txt".to_string(), 2), ("other.txt".to_string(), 0)]);
        assert!(out.diagnostics.iter().any(|d| d.contains("binary.txt")), "strategy {strategy}");
    }
}

#[test]
fn phrase_requires_consecutive_tokens() {
    let dir = tempdir().unwrap();
    write_corpus(&dir.path().join("corpus"), &[("d.txt", "the cat sat the dog cat"), ("e.txt", "The Cat! the... cat")]);
    let mut s = searcher(dir.path());
    let out = s.search("the cat", Strategy::Indexed).unwrap();
    assert_eq!(counts(&out), vec![("e.txt".to_string(), 2), ("d.txt".to_string(), 1)]);

    let out = s.search("the cat zebra", Strategy::Indexed).unwrap();
    assert_eq!(out.total_matches(), 0);
    assert_eq!(out.results.len(), 2);
}

#[test]
fn rebuild_replaces_old_store() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    let index = dir.path().join("index");
    write_corpus(&corpus, &[("old.txt", "ancient scrolls"), ("kept.txt", "fresh words")]);

    let report = build_index(&corpus, &index).unwrap();
    assert_eq!(report.documents, vec!["kept.txt".to_string(), "old.txt".to_string()]);

    fs::remove_file(corpus.join("old.txt")).unwrap();
    write_corpus(&corpus, &[("new.txt", "fresh scrolls")]);
    let report = build_index(&corpus, &index).unwrap();
    assert_eq!(report.documents, vec!["kept.txt".to_string(), "new.txt".to_string()]);

    let reader = IndexReader::open(&index).unwrap();
    assert_eq!(reader.document_names(), vec!["kept.txt".to_string(), "new.txt".to_string()]);
    assert!(reader.postings("ancient").unwrap().is_empty());
    assert_eq!(reader.docs_for_term("scrolls").unwrap(), vec![1]);
    assert_eq!(reader.meta().num_docs, 2);
}

#[test]
fn rebuild_over_emptied_corpus_leaves_empty_store() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    let index = dir.path().join("index");
    write_corpus(&corpus, &[("a.txt", "ancient scrolls"), ("b.txt", "more scrolls")]);
    build_index(&corpus, &index).unwrap();
    assert_eq!(IndexReader::open(&index).unwrap().documents().len(), 2);

    fs::remove_file(corpus.join("a.txt")).unwrap();
    fs::remove_file(corpus.join("b.txt")).unwrap();
    let report = build_index(&corpus, &index).unwrap();
    assert!(report.is_empty());
    assert!(!report.diagnostics.is_empty());

    let reader = IndexReader::open(&index).unwrap();
    assert!(reader.documents().is_empty());
    assert!(reader.postings("scrolls").unwrap().is_empty());
    assert_eq!(reader.meta().num_docs, 0);

    // A corpus directory that vanished entirely behaves the same way.
    write_corpus(&corpus, &[("c.txt", "scrolls")]);
    build_index(&corpus, &index).unwrap();
    fs::remove_dir_all(&corpus).unwrap();
    build_index(&corpus, &index).unwrap();
    assert!(IndexReader::open(&index).unwrap().documents().is_empty());
}

#[test]
fn searcher_reuses_index_until_rebuilt() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus, &[("a.txt", "alpha beta")]);
    let mut s = searcher(dir.path());
    assert_eq!(s.search("gamma", Strategy::Indexed).unwrap().total_matches(), 0);

    write_corpus(&corpus, &[("b.txt", "gamma gamma")]);
    // Built once per session: the new file is invisible until a rebuild.
    assert_eq!(s.search("gamma", Strategy::Indexed).unwrap().results.len(), 1);
    let report = s.rebuild_index().unwrap();
    assert_eq!(report.documents.len(), 2);
    assert_eq!(s.search("gamma", Strategy::Indexed).unwrap().total_matches(), 2);
}

#[test]
fn reuse_existing_index_skips_the_build() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    let index = dir.path().join("index");
    write_corpus(&corpus, &[("a.txt", "alpha")]);
    build_index(&corpus, &index).unwrap();
    write_corpus(&corpus, &[("b.txt", "alpha")]);

    let mut cfg = SearchConfig::new(&corpus, &index);
    cfg.reuse_existing_index = true;
    let mut s = Searcher::new(cfg);
    let out = s.search("alpha", Strategy::Indexed).unwrap();
    assert_eq!(counts(&out), vec![("a.txt".to_string(), 1)]);
}

#[test]
fn index_that_cannot_be_written_degrades() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus, &[("a.txt", "alpha")]);
    // The index location is an ordinary file, so the store cannot be created.
    let blocker = dir.path().join("index");
    fs::write(&blocker, "not a directory").unwrap();

    let mut s = Searcher::new(SearchConfig::new(&corpus, &blocker));
    let out = s.search("alpha", Strategy::Indexed).unwrap();
    assert_eq!(out.status, SearchStatus::IndexUnavailable);
    assert!(out.results.is_empty());
    assert!(out.diagnostics.iter().any(|d| d.contains("index build failed")));

    // Scans are unaffected.
    assert_eq!(s.search("alpha", Strategy::Substring).unwrap().total_matches(), 1);
}
