use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// One Markdown source and the HTML file it converts to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConversionEntry {
    pub markdown: PathBuf,
    pub html: PathBuf,
}

/// Walks `md_root` recursively and appends an entry for every Markdown file,
/// mirroring its relative location under `html_root` with an `.html`
/// extension. Siblings are visited in name order. Symbolic links are not
/// followed, and a link is never itself treated as a Markdown file.
pub fn scan_markdown(
    md_root: &Path,
    html_root: &Path,
    entries: &mut Vec<ConversionEntry>,
) -> Result<(), walkdir::Error> {
    let walker = WalkDir::new(md_root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(md_root) else {
            continue;
        };
        entries.push(ConversionEntry {
            html: html_root.join(relative).with_extension("html"),
            markdown: entry.into_path(),
        });
    }
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}
