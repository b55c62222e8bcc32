//! Config field path used in diagnostics.

/// Dotted path of a `weld.toml` field, e.g. `minify.command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Top-level table the field lives in, e.g. `minify`.
    pub fn section(&self) -> &'static str {
        self.0.split_once('.').map_or(self.0, |(head, _)| head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section() {
        assert_eq!(FieldPath::new("minify.command").section(), "minify");
        assert_eq!(FieldPath::new("root").section(), "root");
    }
}
