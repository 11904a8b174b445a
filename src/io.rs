//! Reading and writing clusterings and annotated documents.
//!
//! # Flat clustering format
//!
//! One mention per line, `<mention_id> <cluster_id>`, separated by
//! whitespace:
//!
//! ```text
//! # doc 17
//! 1 0
//! 2 0
//! 3 1
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Any other line that
//! is not exactly two integers is a [`Error::MalformedInput`]. A mention
//! listed twice keeps its first cluster.
//!
//! # Annotated documents
//!
//! [`AnnotatedDocument`] values as a JSON array, or one JSON object per line
//! (JSON Lines).

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use coref_scorer_core::{ClusterId, DocumentPair, MentionId, MentionPartition, Role};

use crate::align::AnnotatedDocument;
use crate::error::{Error, Result};

static LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+)\s+(-?\d+)\s*$").unwrap());

/// Parse one clustering line. `None` for blank and comment lines.
fn parse_line(line_no: usize, line: &str) -> Result<Option<(MentionId, ClusterId)>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let caps = LINE
        .captures(line)
        .ok_or_else(|| Error::malformed(line_no, line))?;
    let mention = caps[1]
        .parse::<MentionId>()
        .map_err(|_| Error::malformed(line_no, line))?;
    let cluster = caps[2]
        .parse::<ClusterId>()
        .map_err(|_| Error::malformed(line_no, line))?;
    Ok(Some((mention, cluster)))
}

/// Read a flat clustering into a partition playing `role`.
///
/// # Errors
///
/// [`Error::MalformedInput`] with the 1-based line number, or [`Error::Io`].
pub fn read_clustering<R: BufRead>(reader: R, role: Role) -> Result<MentionPartition> {
    let mut partition = MentionPartition::new(role);
    let mut duplicates = 0_usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some((mention, cluster)) = parse_line(idx + 1, &line)? {
            if !partition.add(mention, cluster) {
                duplicates += 1;
            }
        }
    }
    if duplicates > 0 {
        log::debug!(
            "{} clustering: {} duplicate mention lines ignored",
            role,
            duplicates
        );
    }
    Ok(partition)
}

/// Read a flat clustering file.
///
/// # Errors
///
/// As [`read_clustering`]; the path is prepended to the message.
pub fn read_clustering_file(path: impl AsRef<Path>, role: Role) -> Result<MentionPartition> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_clustering(BufReader::new(file), role)
        .map_err(|e| e.in_document(path.display().to_string()))
}

/// Write `partition` in the flat format, ordered by cluster then mention.
///
/// # Errors
///
/// [`Error::Io`] from the writer.
pub fn write_clustering<W: Write>(partition: &MentionPartition, mut writer: W) -> Result<()> {
    let mut chains: Vec<(ClusterId, &[MentionId])> = partition.chains().collect();
    chains.sort_unstable_by_key(|&(cluster, _)| cluster);
    for (cluster, chain) in chains {
        for mention in chain {
            writeln!(writer, "{} {}", mention, cluster)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read a key and a response clustering and align them by shared ID.
///
/// # Errors
///
/// As [`read_clustering_file`].
pub fn load_pair(key: impl AsRef<Path>, response: impl AsRef<Path>) -> Result<DocumentPair> {
    let key_path = key.as_ref();
    let mut pair = DocumentPair::new(
        read_clustering_file(key_path, Role::Key)?,
        read_clustering_file(response, Role::Response)?,
    );
    if let Some(name) = key_path.file_name() {
        pair = pair.with_doc_id(name.to_string_lossy());
    }
    let linked = pair.align_by_id();
    log::debug!(
        "{}: {} of {} key mentions share an ID with the response",
        key_path.display(),
        linked,
        pair.key.num_mentions()
    );
    Ok(pair)
}

/// Parse annotated documents from a JSON array or JSON Lines text.
///
/// # Errors
///
/// [`Error::Json`] for an array, [`Error::Parse`] naming the line for JSON
/// Lines.
pub fn parse_documents(text: &str) -> Result<Vec<AnnotatedDocument>> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::parse(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

/// Read annotated documents from a file.
///
/// Documents without an ID are named `<file stem>#<index>`.
///
/// # Errors
///
/// [`Error::Io`], or as [`parse_documents`].
pub fn read_documents(path: impl AsRef<Path>) -> Result<Vec<AnnotatedDocument>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let mut documents = parse_documents(&text)
        .map_err(|e| Error::parse(format!("{}: {}", path.display(), e)))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for (idx, doc) in documents.iter_mut().enumerate() {
        if doc.doc_id.is_none() {
            doc.doc_id = Some(format!("{}#{}", stem, idx));
        }
    }
    log::info!("read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Same-named key and response files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Shared file name.
    pub name: String,
    /// Key clustering.
    pub key: PathBuf,
    /// Response clustering.
    pub response: PathBuf,
}

impl FilePair {
    /// Load and align by ID.
    ///
    /// # Errors
    ///
    /// As [`load_pair`].
    pub fn load(&self) -> Result<DocumentPair> {
        Ok(load_pair(&self.key, &self.response)?.with_doc_id(self.name.clone()))
    }
}

/// Pair every file in `key_dir` with the same-named file in `response_dir`.
///
/// Key files without a response counterpart are logged and left out.
/// The result is sorted by name.
///
/// # Errors
///
/// [`Error::Io`] if either directory cannot be listed.
pub fn pair_directories(key_dir: impl AsRef<Path>, response_dir: impl AsRef<Path>) -> Result<Vec<FilePair>> {
    let key_dir = key_dir.as_ref();
    let response_dir = response_dir.as_ref();
    if !response_dir.is_dir() {
        return Err(Error::invalid_input(format!(
            "{} is not a directory",
            response_dir.display()
        )));
    }

    let mut pairs = Vec::new();
    for entry in fs::read_dir(key_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let response = response_dir.join(&name);
        if response.is_file() {
            pairs.push(FilePair {
                name,
                key: entry.path(),
                response,
            });
        } else {
            log::warn!("no response file for key {}", entry.path().display());
        }
    }
    pairs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(pairs)
}
