//! Currency alias resolution.
//!
//! Aliases map user-typed tokens (`$`, `dollar`, `€`) to canonical currency
//! codes. The table is loaded from a JSON object file supplied by the host.
//! A missing or corrupt file must never break currency resolution, so
//! loading degrades silently to the identity mapping; [`AliasTable::validate`]
//! is the separate health check that surfaces the problem to the user.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::{ConvertError, ConvertResult};

/// A lookup table from alias token to canonical currency code.
///
/// Keys and values are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// An empty table: every token resolves to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from alias/code pairs. Used by hosts that keep aliases
    /// somewhere other than a file, and by tests.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(alias, code)| {
                    (
                        alias.as_ref().to_lowercase(),
                        code.as_ref().to_lowercase(),
                    )
                })
                .collect(),
        }
    }

    /// Load the table from a JSON object file. Any failure falls back to the
    /// identity mapping.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load alias file, using identity mapping");
                Self::empty()
            }
        }
    }

    fn try_load(path: &Path) -> ConvertResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|_| ConvertError::AliasFileNotFound)?;
        let aliases: HashMap<String, String> =
            serde_json::from_str(&data).map_err(|_| ConvertError::AliasFileInvalidJson)?;
        Ok(Self::from_pairs(aliases))
    }

    /// Resolve a token to its canonical code, or pass it through unchanged
    /// (lowercased) when there is no alias for it.
    pub fn resolve(&self, token: &str) -> String {
        let token = token.to_lowercase();
        self.aliases.get(&token).cloned().unwrap_or(token)
    }

    /// Health check for the configured alias file, distinguishing a missing
    /// file from malformed JSON.
    pub fn validate(path: &Path) -> ConvertResult<()> {
        if !path.exists() {
            return Err(ConvertError::AliasFileNotFound);
        }
        let data = std::fs::read_to_string(path).map_err(|_| ConvertError::AliasFileNotFound)?;
        serde_json::from_str::<serde_json::Value>(&data)
            .map_err(|_| ConvertError::AliasFileInvalidJson)?;
        Ok(())
    }

    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
