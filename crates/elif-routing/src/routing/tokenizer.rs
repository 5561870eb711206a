//! Request path tokenization

/// A request path split into `/`-delimited tokens.
///
/// One leading and one trailing `/` are ignored, so `/`, the empty path and
/// `/a/` tokenize to `[]`, `[]` and `["a"]`. Interior empty tokens are kept:
/// `/a//b` tokenizes to `["a", "", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokens<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> PathTokens<'a> {
    pub fn new(path: &'a str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let tokens = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }

    /// Tokens from `index` on, joined back with `/`
    pub fn remainder(&self, index: usize) -> String {
        self.tokens.get(index..).map(|rest| rest.join("/")).unwrap_or_default()
    }
}
