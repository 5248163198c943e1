//! Path pattern matching.
//!
//! CloudFront patterns are case-sensitive globs: `*` matches any run of
//! characters (including `/`), `?` matches exactly one character.

/// A compiled CloudFront path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    pattern: Vec<char>,
    raw: String,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        Self {
            pattern: raw.chars().collect(),
            raw,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Glob match with single-star backtracking; linear in practice.
    pub fn matches(&self, path: &str) -> bool {
        let text: Vec<char> = path.chars().collect();
        let pattern = &self.pattern;

        let (mut p, mut t) = (0usize, 0usize);
        let mut star: Option<usize> = None;
        let mut resume = 0usize;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == '*' {
                star = Some(p);
                resume = t;
                p += 1;
            } else if let Some(star_at) = star {
                p = star_at + 1;
                resume += 1;
                t = resume;
            } else {
                return false;
            }
        }

        while p < pattern.len() && pattern[p] == '*' {
            p += 1;
        }
        p == pattern.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_prefix() {
        let pattern = PathPattern::new("/prod/*");
        assert!(pattern.matches("/prod/rest/Events"));
        assert!(pattern.matches("/prod/"));
        assert!(!pattern.matches("/prod"));
        assert!(!pattern.matches("/staging/rest"));
    }

    #[test]
    fn test_case_sensitive() {
        let pattern = PathPattern::new("/images/*.jpg");
        assert!(pattern.matches("/images/a/b.jpg"));
        assert!(!pattern.matches("/images/b.JPG"));
        assert!(!pattern.matches("/Images/b.jpg"));
    }

    #[test]
    fn test_single_character_wildcard() {
        let pattern = PathPattern::new("/v?/*");
        assert!(pattern.matches("/v1/users"));
        assert!(!pattern.matches("/v10/users"));
    }

    #[test]
    fn test_star_alone_matches_everything() {
        let pattern = PathPattern::new("*");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_backtracking() {
        let pattern = PathPattern::new("*/api/*/x");
        assert!(pattern.matches("/a/api/b/api/c/x"));
        assert!(!pattern.matches("/a/api/b/y"));
    }
}
