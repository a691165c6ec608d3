use std::{
    fmt,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum LinkSourceError {
    NotFound(PathBuf),
    IoError(PathBuf, io::Error),
}

impl fmt::Display for LinkSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSourceError::NotFound(path) => {
                write!(f, "link source not found: {}", path.display())
            }
            LinkSourceError::IoError(path, e) => {
                write!(f, "cannot read link source {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for LinkSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkSourceError::NotFound(_) => None,
            LinkSourceError::IoError(_, e) => Some(e),
        }
    }
}

/// Reads the link source file and returns the cleaned links in file order.
///
/// # Errors
///
/// [`LinkSourceError::NotFound`] when the file does not exist, naming the
/// path; [`LinkSourceError::IoError`] for any other read failure.
pub async fn load_links(path: &Path) -> Result<Vec<String>, LinkSourceError> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => LinkSourceError::NotFound(path.to_path_buf()),
            _ => LinkSourceError::IoError(path.to_path_buf(), e),
        })?;

    Ok(parse_links(&content))
}

/// Cleans every line of a link list, keeping order and duplicates.
///
/// Blank lines and `#` comment lines are dropped. On the remaining lines an
/// inline `# comment`, one trailing comma and one layer of matching straight
/// quotes are removed, so both of these yield `https://youtu.be/abc123`:
///
/// ```text
/// https://youtu.be/abc123
///   "https://youtu.be/abc123" ,  # comment
/// ```
pub fn parse_links(content: &str) -> Vec<String> {
    content.lines().filter_map(clean_line).collect()
}

fn clean_line(line: &str) -> Option<String> {
    let mut line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    if let Some(pos) = line.find('#') {
        line = line[..pos].trim();
    }

    if let Some(stripped) = line.strip_suffix(',') {
        line = stripped.trim();
    }

    line = strip_quotes(line);

    if line.is_empty() {
        return None;
    }
    Some(line.to_string())
}

fn strip_quotes(line: &str) -> &str {
    for quote in ['"', '\''] {
        if line.len() >= 2 && line.starts_with(quote) && line.ends_with(quote) {
            return &line[1..line.len() - 1];
        }
    }
    line
}
