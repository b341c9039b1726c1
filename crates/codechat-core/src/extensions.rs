//! Extension classifier: maps a file extension to the language label
//! returned by the fetch endpoint and used in system prompts.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::error::{GatewayError, Result};

const BUILTIN: &[(&str, &str)] = &[
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("svelte", "svelte"),
    ("vue", "vue"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("json", "json"),
    ("md", "markdown"),
    ("py", "python"),
    ("rs", "rust"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("rb", "ruby"),
    ("php", "php"),
    ("swift", "swift"),
    ("sh", "shell"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("sql", "sql"),
    ("txt", "plaintext"),
];

/// Result of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub extension: String,
    pub language: String,
}

/// Read-only extension → language table, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: BTreeMap<String, String>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }
}

impl ExtensionTable {
    /// Build a table from `(extension, label)` pairs. Extensions are
    /// normalized: leading dot stripped, lowercased.
    pub fn from_pairs<I, E, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (E, L)>,
        E: AsRef<str>,
        L: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (ext, label) in pairs {
            entries.insert(normalize(ext.as_ref()), label.into());
        }
        Self { entries }
    }

    /// Add or override entries from an `ext=label,ext=label` list.
    ///
    /// Malformed entries are skipped with a warning.
    pub fn with_overrides(mut self, mappings: &str) -> Self {
        for item in mappings.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item.split_once('=') {
                Some((ext, label)) if !normalize(ext).is_empty() && !label.trim().is_empty() => {
                    self.entries.insert(normalize(ext), label.trim().to_owned());
                }
                _ => warn!(entry = item, "ignoring malformed extension mapping"),
            }
        }
        self
    }

    /// Language label for an already-normalized extension.
    pub fn label(&self, extension: &str) -> Option<&str> {
        self.entries.get(extension).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify `path` by its extension.
    pub fn classify(&self, path: &Path) -> Result<Classification> {
        let extension = path
            .extension()
            .map(|e| normalize(&e.to_string_lossy()))
            .unwrap_or_default();

        match self.label(&extension) {
            Some(language) => Ok(Classification {
                language: language.to_owned(),
                extension,
            }),
            None => Err(GatewayError::UnsupportedExtension { extension }),
        }
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn classifies_typescript() {
        let table = ExtensionTable::default();
        let c = table.classify(Path::new("/project/src/main.ts")).unwrap();
        assert_eq!(c.extension, "ts");
        assert_eq!(c.language, "typescript");
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        let table = ExtensionTable::default();
        let c = table.classify(Path::new("README.MD")).unwrap();
        assert_eq!(c.extension, "md");
        assert_eq!(c.language, "markdown");
    }

    #[test]
    fn every_builtin_entry_returns_its_label() {
        let table = ExtensionTable::default();
        for (ext, label) in BUILTIN {
            let path = format!("file.{ext}");
            let c = table.classify(Path::new(&path)).unwrap();
            assert_eq!(c.language, *label, "label for .{ext}");
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let table = ExtensionTable::default();
        let err = table.classify(Path::new("image.png")).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UnsupportedExtension { ref extension } if extension == "png"
        ));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let table = ExtensionTable::default();
        assert!(matches!(
            table.classify(Path::new("Makefile")),
            Err(GatewayError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    #[traced_test]
    fn overrides_add_and_replace_entries() {
        let table = ExtensionTable::default().with_overrides(".Zig=zig, txt = text ,bogus,=x");
        assert_eq!(table.label("zig"), Some("zig"));
        assert_eq!(table.label("txt"), Some("text"));
        assert_eq!(table.label("bogus"), None);
        assert_eq!(table.len(), BUILTIN.len() + 1);
        assert!(logs_contain("ignoring malformed extension mapping"));
    }
}
