use url::Url;

/// Decides which discovered links count as edges and crawl candidates.
///
/// The policy runs after URL resolution and fragment stripping, so it only
/// ever sees absolute, canonical URLs.
#[derive(Debug, Clone, Default)]
pub struct LinkPolicy {
    /// Only accept links on the same host as the page they were found on.
    pub same_host_only: bool,
    /// Require the link path to start with this prefix, e.g. "/wiki/".
    pub path_prefix: Option<String>,
    /// Drop links whose path contains ':' — namespace pages like
    /// "Special:Random" or "File:Photo.jpg" on wiki-style sites.
    pub exclude_colon_paths: bool,
}

impl LinkPolicy {
    /// The configuration for wiki-style article graphs: same host, article
    /// namespace only.
    pub fn wiki() -> Self {
        Self {
            same_host_only: true,
            path_prefix: Some("/wiki/".to_string()),
            exclude_colon_paths: true,
        }
    }

    pub fn accepts(&self, link: &Url, page: &Url) -> bool {
        if self.same_host_only && link.host_str() != page.host_str() {
            return false;
        }
        if let Some(ref prefix) = self.path_prefix
            && !link.path().starts_with(prefix.as_str())
        {
            return false;
        }
        if self.exclude_colon_paths && link.path().contains(':') {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn wiki_policy_keeps_article_links_only() {
        let policy = LinkPolicy::wiki();
        let page = url("https://en.wikipedia.org/wiki/Rust");

        assert!(policy.accepts(&url("https://en.wikipedia.org/wiki/Ferris"), &page));
        assert!(!policy.accepts(&url("https://en.wikipedia.org/wiki/File:Logo.svg"), &page));
        assert!(!policy.accepts(&url("https://en.wikipedia.org/w/index.php"), &page));
        assert!(!policy.accepts(&url("https://fr.wikipedia.org/wiki/Rouille"), &page));
    }

    #[test]
    fn default_policy_accepts_everything() {
        let policy = LinkPolicy::default();
        let page = url("https://a.test/");
        assert!(policy.accepts(&url("https://b.test/anywhere"), &page));
        assert!(policy.accepts(&url("https://a.test/x:y"), &page));
    }
}
