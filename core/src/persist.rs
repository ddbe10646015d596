use crate::error::{Result as SearchResult, SearchError};
use crate::index::{DocMeta, PositionalIndex, Posting, PostingsSource, TermId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn postings_file(&self, term_id: TermId) -> PathBuf {
        self.postings_dir().join(format!("{term_id:08}.postings.bin"))
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(bytes)?;
    Ok(())
}

pub fn save_dictionary(paths: &IndexPaths, dict: &(HashMap<String, TermId>, Vec<u32>)) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(&paths.dictionary(), &bincode::serialize(dict)?)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<(HashMap<String, TermId>, Vec<u32>)> {
    Ok(bincode::deserialize(&read_bytes(&paths.dictionary())?)?)
}

pub fn save_docs(paths: &IndexPaths, docs: &[DocMeta]) -> Result<()> {
    write_bytes(&paths.docs(), &bincode::serialize(docs)?)
}

pub fn load_docs(paths: &IndexPaths) -> Result<Vec<DocMeta>> {
    Ok(bincode::deserialize(&read_bytes(&paths.docs())?)?)
}

pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    create_dir_all(paths.postings_dir())?;
    write_bytes(&paths.postings_file(term_id), &bincode::serialize(postings)?)
}

pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    Ok(bincode::deserialize(&read_bytes(&paths.postings_file(term_id))?)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(&paths.meta(), serde_json::to_string_pretty(meta)?.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut buf = String::new();
    File::open(paths.meta())?.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load only the header structures required to search: dictionary, df, docs, meta.
pub fn load_index_header(paths: &IndexPaths) -> Result<(HashMap<String, TermId>, Vec<u32>, Vec<DocMeta>, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        bail!("unsupported index version {} (expected {FORMAT_VERSION})", meta.version);
    }
    let (dict, df) = load_dictionary(paths)?;
    let docs = load_docs(paths)?;
    Ok((dict, df, docs, meta))
}

/// Entries `write_index` may leave behind, complete or not.
const STORE_ENTRIES: [&str; 4] = ["meta.json", "dictionary.bin", "docs.bin", "postings"];

/// True when every entry under `root` is one of ours, so a half-written
/// store from a failed build is still recognised.
fn holds_only_store_entries(root: &Path) -> Result<bool> {
    for entry in fs::read_dir(root)? {
        let name = entry?.file_name();
        if !STORE_ENTRIES.iter().any(|e| name.to_str() == Some(e)) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Remove whatever store already lives at `paths.root`.
///
/// Only a directory that is empty, carries our `meta.json`, or holds nothing
/// but store files is wiped.
fn clear_store(paths: &IndexPaths) -> Result<()> {
    if !paths.root.exists() {
        return Ok(());
    }
    if !paths.root.is_dir() {
        bail!("{} exists and is not a directory", paths.root.display());
    }
    let is_empty = fs::read_dir(&paths.root)?.next().is_none();
    if is_empty {
        return Ok(());
    }
    if !paths.meta().is_file() && !holds_only_store_entries(&paths.root)? {
        bail!("refusing to overwrite {}: not an index directory", paths.root.display());
    }
    fs::remove_dir_all(&paths.root).with_context(|| format!("remove old index at {}", paths.root.display()))?;
    Ok(())
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Recreate the store at `paths.root` from `index`. Any previous index there is discarded.
pub fn write_index(paths: &IndexPaths, index: &PositionalIndex) -> Result<MetaFile> {
    clear_store(paths)?;
    create_dir_all(paths.postings_dir())?;
    for (term_id, postings) in index.postings.iter().enumerate() {
        save_postings_for_term(paths, term_id as TermId, postings)?;
    }
    save_dictionary(paths, &(index.dictionary.clone(), index.df()))?;
    save_docs(paths, &index.docs)?;
    let meta = MetaFile {
        num_docs: index.num_docs(),
        num_terms: index.num_terms() as u32,
        created_at: now_rfc3339(),
        version: FORMAT_VERSION,
    };
    // meta.json last: its presence marks a complete store.
    save_meta(paths, &meta)?;
    Ok(meta)
}

/// A persisted index opened for querying. Postings are read from disk per term.
pub struct IndexReader {
    paths: IndexPaths,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    docs: Vec<DocMeta>,
    meta: MetaFile,
}

impl IndexReader {
    pub fn open<P: AsRef<Path>>(root: P) -> SearchResult<Self> {
        let paths = IndexPaths::new(root);
        let (dictionary, df, docs, meta) = load_index_header(&paths)
            .map_err(|e| SearchError::IndexQuery(format!("cannot open index at {}: {e:#}", paths.root.display())))?;
        tracing::debug!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "opened index");
        Ok(Self { paths, dictionary, df, docs, meta })
    }

    pub fn meta(&self) -> &MetaFile { &self.meta }

    /// Number of documents containing `term`, without touching its postings file.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.dictionary
            .get(term)
            .and_then(|&tid| self.df.get(tid as usize).copied())
            .unwrap_or(0)
    }
}

impl PostingsSource for IndexReader {
    fn documents(&self) -> &[DocMeta] { &self.docs }

    fn postings(&self, term: &str) -> SearchResult<Vec<Posting>> {
        let Some(&tid) = self.dictionary.get(term) else { return Ok(Vec::new()) };
        load_postings_for_term(&self.paths, tid)
            .map_err(|e| SearchError::IndexQuery(format!("postings for `{term}`: {e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PositionalIndex {
        let mut idx = PositionalIndex::new();
        idx.add_document("a.txt", "so long and thanks for all the fish");
        idx.add_document("b.txt", "the fish the fish");
        idx
    }

    #[test]
    fn written_index_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));
        let meta = write_index(&paths, &sample()).unwrap();
        assert_eq!(meta.num_docs, 2);

        let reader = IndexReader::open(&paths.root).unwrap();
        assert_eq!(reader.document_names(), vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert_eq!(reader.docs_for_term("fish").unwrap(), vec![0, 1]);
        assert_eq!(reader.positions("fish", 1).unwrap(), vec![1, 3]);
        assert_eq!(reader.doc_freq("the"), 2);
        assert_eq!(reader.doc_freq("towel"), 0);
        assert!(reader.postings("towel").unwrap().is_empty());
    }

    #[test]
    fn refuses_to_wipe_foreign_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("precious.txt"), "keep me").unwrap();
        let paths = IndexPaths::new(dir.path());
        assert!(write_index(&paths, &sample()).is_err());
        assert!(dir.path().join("precious.txt").exists());
    }

    #[test]
    fn half_written_store_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));
        fs::create_dir_all(paths.postings_dir()).unwrap();
        fs::write(paths.postings_file(0), b"\x01").unwrap();
        fs::write(paths.dictionary(), b"").unwrap();

        let meta = write_index(&paths, &sample()).unwrap();
        assert_eq!(meta.num_docs, 2);
        let reader = IndexReader::open(&paths.root).unwrap();
        assert_eq!(reader.positions("fish", 0).unwrap(), vec![7]);
    }

    #[test]
    fn open_missing_store_is_query_error() {
        let dir = tempfile::tempdir().unwrap();
        match IndexReader::open(dir.path().join("missing")) {
            Err(SearchError::IndexQuery(_)) => {}
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("opened a missing store"),
        }
    }

    #[test]
    fn corrupt_postings_surface_as_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));
        write_index(&paths, &sample()).unwrap();
        let tid = sample().dictionary["fish"];
        fs::write(paths.postings_file(tid), b"\x01").unwrap();
        let reader = IndexReader::open(&paths.root).unwrap();
        assert!(matches!(reader.postings("fish"), Err(SearchError::IndexQuery(_))));
    }
}
