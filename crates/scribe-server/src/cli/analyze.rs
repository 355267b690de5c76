// cli/analyze.rs
// One-shot significance analysis of a file, printed as JSON

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::analysis::{FileMeta, analyze_change};
use scribe_types::EditedRange;

/// Map a file extension to a language label for capture metadata
fn language_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let language = match ext {
        "rs" => "rust",
        "py" => "python",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        _ => return None,
    };
    Some(language.to_string())
}

pub fn run(path: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let meta = FileMeta::new(path.to_string_lossy(), language_for(&path));
    let whole_file = vec![EditedRange::new(1, text.lines().count().max(1) as u32)];

    // One-shot: no prior state, so the complexity delta is zero
    let analysis = analyze_change(&meta, &text, &whole_file, 0);

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
