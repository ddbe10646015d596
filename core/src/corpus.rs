use crate::error::{Result, SearchError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An eligible text file in the corpus. Its file name is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
}

fn is_text_file(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".txt")
}

/// List the `.txt` files directly inside `dir`, sorted by name.
///
/// Subdirectories and other files are skipped without comment.
pub fn list_documents(dir: &Path) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            // The root itself failing means the corpus is unreadable; a single
            // entry failing only costs that entry.
            Err(err) if err.depth() == 0 => {
                return Err(SearchError::CorpusUnreadable { path: dir.to_path_buf(), source: err })
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable corpus entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else { continue };
        if is_text_file(name) {
            docs.push(Document { name: name.to_string(), path: entry.path().to_path_buf() });
        }
    }
    Ok(docs)
}

/// Read a whole document as UTF-8. The handle is dropped on every path out.
pub fn read_document(doc: &Document) -> Result<String> {
    let read = || -> std::io::Result<String> {
        let f = File::open(&doc.path)?;
        let mut reader = BufReader::new(f);
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(buf)
    };
    read().map_err(|source| SearchError::DocumentRead { name: doc.name.clone(), source })
}
