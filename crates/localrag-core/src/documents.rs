//! Plain-text document source: walks a directory for `.txt` files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::SourceDocument;

/// Load every `.txt` file under `root`, sorted by path.
///
/// The source id is the path relative to `root` with `/` separators, so two
/// files with the same stem in different folders never collide.
pub fn load_text_documents(root: &Path) -> Result<Vec<SourceDocument>> {
    let files = list_txt_files(root);
    if files.is_empty() {
        warn!(root = %root.display(), "no .txt files found");
        return Ok(vec![]);
    }
    let mut docs = Vec::with_capacity(files.len());
    for path in &files {
        let text = read_file_content(path)?;
        let source_id = source_id_for(root, path);
        debug!(source_id = %source_id, bytes = text.len(), "loaded document");
        docs.push(SourceDocument { source_id, text });
    }
    info!(root = %root.display(), documents = docs.len(), "loaded text documents");
    Ok(docs)
}

fn read_file_content(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io { path: path.display().to_string(), source })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

fn source_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    txt_files.sort();
    txt_files
}
