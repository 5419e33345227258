// Primitives for acquiring and saving files.

use std::fs;
use std::path::Path;

use crate::desk::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Reads a whole text file, as handed over by a file picker.
pub fn read_text(path: &str) -> DeskResult<String> {
    fs::read_to_string(path).context(OpeningFileSnafu { path })
}

/// Saves exported text to a path, or prints it when the destination is `stdout`.
pub fn write_export(dest: &str, contents: &str) -> DeskResult<()> {
    if dest == "stdout" {
        println!("{}", contents);
        return Ok(());
    }
    fs::write(dest, contents).context(WritingFileSnafu { path: dest })?;
    info!(
        "Exported {} bytes to {}",
        contents.len(),
        simplify_file_name(dest)
    );
    Ok(())
}
