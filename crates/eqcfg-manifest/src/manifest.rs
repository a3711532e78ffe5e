//! JAR manifest parsing
//!
//! Only the main section is read: headers up to the first empty line. Named
//! per-entry sections that follow are never consulted for bundle identity.

use ahash::AHashMap;

/// Fixed location of the manifest inside a bundle archive
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const FRAGMENT_HOST: &str = "Fragment-Host";

/// Position and cause of a manifest syntax error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    pub reason: &'static str,
}

/// Main attributes of a JAR manifest
#[derive(Debug, Clone, Default)]
pub struct JarManifest {
    main_attributes: AHashMap<String, String>,
}

impl JarManifest {
    /// Parse raw manifest bytes.
    ///
    /// Lines may end in LF, CRLF or CR. A line starting with one space
    /// continues the value of the header above it. Values are decoded as
    /// UTF-8 (invalid sequences are replaced) and kept verbatim.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = String::from_utf8_lossy(bytes).replace("\r\n", "\n");
        let mut main_attributes = AHashMap::new();
        let mut current: Option<(String, String)> = None;

        for (index, line) in text.split(['\n', '\r']).enumerate() {
            let line_number = index + 1;
            if line.is_empty() {
                break;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let Some((_, value)) = current.as_mut() else {
                    return Err(ParseError {
                        line: line_number,
                        reason: "continuation line without a header",
                    });
                };
                value.push_str(continuation);
                continue;
            }

            if let Some((name, value)) = current.take() {
                main_attributes.insert(name, value);
            }

            let (name, value) = line.split_once(": ").ok_or(ParseError {
                line: line_number,
                reason: "invalid header field",
            })?;
            if name.is_empty() {
                return Err(ParseError {
                    line: line_number,
                    reason: "empty header name",
                });
            }
            current = Some((name.to_string(), value.to_string()));
        }

        if let Some((name, value)) = current {
            main_attributes.insert(name, value);
        }

        Ok(JarManifest { main_attributes })
    }

    /// Look up a main attribute by exact (case-sensitive) name
    pub fn main_attribute(&self, name: &str) -> Option<&str> {
        self.main_attributes.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.main_attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main_attributes.is_empty()
    }
}

/// Drop the `;key:=value` directive part of a header value and trim it.
///
/// `"com.acme.core; singleton:=true"` becomes `"com.acme.core"`.
pub fn strip_directives(value: &str) -> &str {
    value
        .split_once(';')
        .map_or(value, |(head, _)| head)
        .trim()
}
