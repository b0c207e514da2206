//! Access token file.

use std::path::{Path, PathBuf};

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The token on the first line, if any.
    ///
    /// Older files carried a `<user id>:` prefix and cache rows separated by
    /// `;;`. Those are rewritten to hold just the token.
    pub fn load(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read token file");
                return None;
            }
        };

        let lines: Vec<&str> = content.lines().collect();
        let header = *lines.first()?;
        let has_cache_rows = lines.iter().any(|line| line.contains(";;"));
        let user_id_token = header
            .split_once(':')
            .filter(|(prefix, _)| !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()))
            .map(|(_, token)| token);

        let token = user_id_token.unwrap_or(header).trim().to_string();
        if has_cache_rows || user_id_token.is_some() {
            self.rewrite(&token, user_id_token.is_some(), has_cache_rows);
        }
        (!token.is_empty()).then_some(token)
    }

    fn rewrite(&self, token: &str, had_user_id: bool, had_cache_rows: bool) {
        let content = if token.is_empty() {
            String::new()
        } else {
            format!("{token}\n")
        };
        match std::fs::write(&self.path, content) {
            Ok(()) => tracing::info!(
                path = %self.path.display(),
                had_user_id,
                had_cache_rows,
                "cleaned up legacy token file"
            ),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "legacy token cleanup failed")
            }
        }
    }
}
