//! Compiled library manifest.
//!
//! A library's root holds a `manifest` file in Java properties format. The
//! pipeline needs one key from it, `unique_name`, which names the library's
//! resource bundle.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{collections::BTreeMap, path::Path};

/// File name of the manifest at the library root.
pub const MANIFEST_FILE_NAME: &str = "manifest";

/// Manifest key holding the library's unique logical name.
pub const UNIQUE_NAME_KEY: &str = "unique_name";

/// Parsed library manifest properties.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LibraryManifest {
    properties: BTreeMap<String, String>,
}

impl LibraryManifest {
    /// Parses properties text.
    ///
    /// Supports `key=value`, `key: value` and `key value` forms, `#`/`!`
    /// comments, trailing-backslash continuations and the usual escapes.
    pub fn parse(text: &str) -> Self {
        let mut properties = BTreeMap::new();
        let mut logical = String::new();

        for raw in text.lines() {
            let line = raw.trim_start();
            if logical.is_empty()
                && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
            {
                continue;
            }

            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                continue;
            }
            logical.push_str(line);

            let (key, value) = split_entry(&logical);
            properties.insert(key, value);
            logical.clear();
        }

        if !logical.is_empty() {
            let (key, value) = split_entry(&logical);
            properties.insert(key, value);
        }

        Self { properties }
    }

    /// Reads `<library_dir>/manifest`.
    pub async fn read(library_dir: &Path) -> Result<Self> {
        let path = library_dir.join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Err(Error::Manifest {
                path,
                reason: "manifest file is missing".to_string(),
            });
        }

        let text = tokio::fs::read_to_string(&path)
            .await
            .fs_context("reading library manifest", &path)?;
        Ok(Self::parse(&text))
    }

    /// Returns a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the library's unique name.
    ///
    /// `manifest_path` is only used for the error message.
    pub fn unique_name(&self, manifest_path: &Path) -> Result<&str> {
        match self.get(UNIQUE_NAME_KEY) {
            Some(name) if !name.trim().is_empty() => Ok(name),
            Some(_) => Err(Error::Manifest {
                path: manifest_path.to_path_buf(),
                reason: format!("`{UNIQUE_NAME_KEY}` is empty"),
            }),
            None => Err(Error::Manifest {
                path: manifest_path.to_path_buf(),
                reason: format!("missing `{UNIQUE_NAME_KEY}` key"),
            }),
        }
    }
}

/// Reads the unique name from an unpacked library directory.
pub async fn read_unique_name(library_dir: &Path) -> Result<String> {
    let manifest = LibraryManifest::read(library_dir).await?;
    manifest
        .unique_name(&library_dir.join(MANIFEST_FILE_NAME))
        .map(str::to_string)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_escaped(&mut key, escaped, &mut chars);
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.peek().is_some_and(|&c| c == '=' || c == ':') {
                    chars.next();
                }
                break;
            }
            c => key.push(c),
        }
    }

    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }

    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                push_escaped(&mut value, escaped, &mut chars);
            }
        } else {
            value.push(c);
        }
    }

    (key, value)
}

fn push_escaped(
    out: &mut String,
    escaped: char,
    rest: &mut std::iter::Peekable<std::str::Chars<'_>>,
) {
    match escaped {
        't' => out.push('\t'),
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        'f' => out.push('\u{c}'),
        'u' => {
            let hex: String = rest.by_ref().take(4).collect();
            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                Some(c) => out.push(c),
                None => {
                    out.push('u');
                    out.push_str(&hex);
                }
            }
        }
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_compiler_written_manifest() {
        let manifest = LibraryManifest::parse(
            "abi_version=1.4.1\n\
             builtins_platform=NATIVE\n\
             compiler_version=1.4.31\n\
             depends=stdlib org.jetbrains.kotlin.native.platform.Foundation\n\
             unique_name=com.example\\:shared\n",
        );

        assert_eq!(manifest.get("abi_version"), Some("1.4.1"));
        assert_eq!(
            manifest.get("depends"),
            Some("stdlib org.jetbrains.kotlin.native.platform.Foundation")
        );
        assert_eq!(manifest.get(UNIQUE_NAME_KEY), Some("com.example:shared"));
    }

    #[test]
    fn accepts_colon_and_whitespace_separators() {
        let manifest = LibraryManifest::parse("unique_name: shared\nother   value here\n");
        assert_eq!(manifest.get("unique_name"), Some("shared"));
        assert_eq!(manifest.get("other"), Some("value here"));
    }

    #[test]
    fn skips_comments_and_joins_continuations() {
        let manifest = LibraryManifest::parse(
            "# generated\n! also a comment\ndepends=a \\\n    b\nunique_name=x\n",
        );
        assert_eq!(manifest.get("depends"), Some("a b"));
        assert_eq!(manifest.get("unique_name"), Some("x"));
        assert_eq!(manifest.get("# generated"), None);
    }

    #[test]
    fn decodes_unicode_escapes() {
        let manifest = LibraryManifest::parse("unique_name=caf\\u00e9\n");
        assert_eq!(manifest.get("unique_name"), Some("café"));
    }

    #[test]
    fn missing_unique_name_is_malformed() {
        let manifest = LibraryManifest::parse("abi_version=1\n");
        let err = manifest.unique_name(Path::new("lib/manifest")).unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
        assert!(err.to_string().contains("unique_name"));
    }

    #[test]
    fn empty_unique_name_is_malformed() {
        let manifest = LibraryManifest::parse("unique_name=\n");
        assert!(manifest.unique_name(Path::new("manifest")).is_err());
    }

    #[tokio::test]
    async fn read_unique_name_from_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("manifest"), "unique_name=shared\n").unwrap();
        assert_eq!(read_unique_name(temp.path()).await.unwrap(), "shared");
    }

    #[tokio::test]
    async fn missing_manifest_file_is_malformed() {
        let temp = TempDir::new().unwrap();
        let err = read_unique_name(temp.path()).await.unwrap_err();
        assert!(matches!(err, Error::Manifest { .. }));
    }
}
