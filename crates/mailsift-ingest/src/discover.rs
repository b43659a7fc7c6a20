use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Whether `path` names a PDF by file name (`.pdf`, any case).
pub fn is_pdf_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
}

/// Recursively find PDF files beneath each root.
///
/// Roots that are missing or not directories are skipped with a warning, as
/// are unreadable entries. Results are sorted within each root and roots keep
/// their given order.
pub fn discover_documents<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    for root in roots {
        let root = root.as_ref();
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "skipping input root: not a directory");
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_pdf_path(entry.path()) {
                        found.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("error accessing entry: {}", e);
                }
            }
        }
        found.sort();
        tracing::debug!(root = %root.display(), count = found.len(), "discovered documents");
        documents.extend(found);
    }
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_pdf_path() {
        assert!(is_pdf_path(Path::new("/a/paper.pdf")));
        assert!(is_pdf_path(Path::new("/a/PAPER.PDF")));
        assert!(!is_pdf_path(Path::new("/a/paper.pdf.txt")));
        assert!(!is_pdf_path(Path::new("/a/notes.txt")));
    }

    #[test]
    fn test_discover_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("session2/track")).unwrap();
        fs::write(root.join("b.pdf"), b"").unwrap();
        fs::write(root.join("a.PDF"), b"").unwrap();
        fs::write(root.join("readme.txt"), b"").unwrap();
        fs::write(root.join("session2/track/c.pdf"), b"").unwrap();
        fs::create_dir(root.join("folder.pdf")).unwrap();

        let found = discover_documents(&[root]);
        assert_eq!(
            found,
            vec![
                root.join("a.PDF"),
                root.join("b.pdf"),
                root.join("session2/track/c.pdf"),
            ]
        );
    }

    #[test]
    fn test_discover_skips_bad_roots() {
        let dir = tempfile::tempdir().unwrap();
        let file_root = dir.path().join("file.pdf");
        fs::write(&file_root, b"").unwrap();
        fs::write(dir.path().join("x.pdf"), b"").unwrap();

        let roots = vec![
            PathBuf::from("/no/such/root"),
            file_root,
            dir.path().to_path_buf(),
        ];
        let found = discover_documents(&roots);
        assert_eq!(found.len(), 2);
    }
}
