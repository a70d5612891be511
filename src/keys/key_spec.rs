//! One normalized lookup key.

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '/';

/// A requested lookup key with its namespace and optional output rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    /// The key name inside its namespace.
    pub key: String,
    /// Namespace the key is queried in.
    pub namespace: String,
    /// Name the result is stored under, when different from `key`.
    pub remap: Option<String>,
}

impl KeySpec {
    /// Create a key spec without remap.
    pub fn new(key: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.into(),
            remap: None,
        }
    }

    /// Set the output name.
    pub fn with_remap(mut self, remap: impl Into<String>) -> Self {
        self.remap = Some(remap.into());
        self
    }

    /// `namespace<sep>key`, the form the backend is queried with.
    pub fn qualified(&self, separator: char) -> String {
        format!("{}{}{}", self.namespace, separator, self.key)
    }

    /// Render with the default separator. Parsers configured with another
    /// separator render through [`Self::qualified`].
    pub fn show(&self) -> String {
        self.qualified(DEFAULT_SEPARATOR)
    }

    /// The remap target, if it actually renames the key.
    pub fn rename(&self) -> Option<&str> {
        self.remap.as_deref().filter(|remap| *remap != self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show() {
        assert_eq!(KeySpec::new("k", "n").show(), "n/k");
        assert_eq!(KeySpec::new("role", "ansible").qualified(':'), "ansible:role");
    }

    #[test]
    fn test_rename_ignores_identity_remap() {
        assert_eq!(KeySpec::new("role", "default").with_remap("role").rename(), None);
        assert_eq!(
            KeySpec::new("role", "default").with_remap("server_role").rename(),
            Some("server_role")
        );
    }
}
