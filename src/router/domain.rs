use super::pattern::Pattern;

#[derive(Default, Debug)]
/// The set of compiled domain patterns known to the router.
///
/// The resolver consults this before scanning the route table: when the
/// incoming host matches any registered domain pattern, the host is glued in
/// front of the request path, so that domain-bound routes (whose patterns
/// are compiled from `domain + template`) can match and extract any domain
/// parameters.
pub struct DomainMatcher {
    patterns: Vec<Pattern>,
}

impl DomainMatcher {
    /// Registers a compiled domain pattern.  Re-adding a pattern with the
    /// same template is a no-op.
    pub fn add(&mut self, pattern: Pattern) {
        let present = self
            .patterns
            .iter()
            .any(|existing| existing.template() == pattern.template());
        if !present {
            self.patterns.push(pattern);
        }
    }

    /// Whether any registered domain pattern matches the given host.
    pub fn matches(&self, host: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(host))
    }

    /// The number of registered domain patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no domain patterns are registered.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_literal_domain() {
        let mut matcher = DomainMatcher::default();
        matcher.add(Pattern::compile("admin.example.com").unwrap());
        assert!(matcher.matches("admin.example.com"));
        assert!(!matcher.matches("example.com"));
        assert!(!matcher.matches("admin.example.com.evil"));
    }

    #[test]
    fn test_parameterized_domain() {
        let mut matcher = DomainMatcher::default();
        matcher.add(Pattern::compile(":tenant.example.com").unwrap());
        assert!(matcher.matches("acme.example.com"));
        assert!(!matcher.matches("example.com"));
    }

    #[test]
    fn test_add_dedups() {
        let mut matcher = DomainMatcher::default();
        matcher.add(Pattern::compile("admin.example.com").unwrap());
        matcher.add(Pattern::compile("admin.example.com").unwrap());
        assert_eq!(matcher.len(), 1);
    }
}
