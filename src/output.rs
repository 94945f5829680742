//! Writing exported lines to a file or standard output.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::Result;

/// Writes each line followed by a newline.
pub fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_stdout(lines: &[String]) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_lines(&mut writer, lines)
}

/// Replaces `path` atomically: the lines go to a temporary file in the same
/// folder, which is then renamed over the target.
pub fn write_file(path: &Path, lines: &[String]) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write_lines(&mut writer, lines)?;
    }
    temp_file.persist(path)?;
    info!(path = %path.display(), lines = lines.len(), "output written");
    Ok(())
}
