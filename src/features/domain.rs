//! Host decomposition with Public Suffix List integration.
//!
//! Splits the host of a URL into `subdomain`, `domain` and `suffix` the way a
//! registrar sees it:
//! - forums.news.example.co.uk -> ("forums.news", "example", "co.uk")
//! - example.com -> ("", "example", "com")
//! - myapp.github.io -> ("", "myapp", "github.io") (github.io is a public suffix)
//! - intranet.corp -> ("intranet", "corp", "") (unknown TLD)
//! - 192.168.0.1 -> ("", "192.168.0.1", "")

use std::net::{Ipv4Addr, Ipv6Addr};

/// Host parts extracted from a URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainParts {
    /// Labels left of the registrable domain, dot-joined (may be empty)
    pub subdomain: String,
    /// The registrable label without its suffix (may be empty)
    pub domain: String,
    /// Public suffix (effective TLD), empty when unknown
    pub suffix: String,
}

impl DomainParts {
    /// Decompose the host of `url`. Never fails; unparseable input yields
    /// empty parts.
    pub fn parse(url: &str) -> Self {
        let host = extract_host(url);
        if host.is_empty() {
            return Self::default();
        }
        if is_ip_literal(host) {
            return Self {
                domain: host.to_string(),
                ..Default::default()
            };
        }
        Self::split_with_psl(host)
    }

    fn split_with_psl(host: &str) -> Self {
        let suffix = psl::suffix(host.as_bytes())
            .filter(|s| s.is_known())
            .and_then(|s| std::str::from_utf8(s.as_bytes()).ok())
            .unwrap_or("");

        let rest = if suffix.is_empty() {
            host
        } else {
            host[..host.len() - suffix.len()].trim_end_matches('.')
        };

        let (subdomain, domain) = match rest.rsplit_once('.') {
            Some((sub, dom)) => (sub, dom),
            None => ("", rest),
        };

        Self {
            subdomain: subdomain.to_string(),
            domain: domain.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Number of dot-separated labels in the subdomain, 0 when absent
    pub fn subdomain_count(&self) -> usize {
        if self.subdomain.is_empty() {
            0
        } else {
            self.subdomain.split('.').count()
        }
    }
}

/// Pull the host out of a URL string, tolerating a missing scheme.
///
/// Strips scheme, userinfo, port, path, query and fragment.
pub fn extract_host(url: &str) -> &str {
    let s = url.trim();
    let s = match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s.strip_prefix("//").unwrap_or(s),
    };

    let end = s.find(['/', '?', '#', '\\']).unwrap_or(s.len());
    let authority = &s[..end];

    let host_port = match authority.rsplit_once('@') {
        Some((_, hp)) => hp,
        None => authority,
    };

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or("")
    } else {
        host_port.split(':').next().unwrap_or("")
    };

    host.trim_end_matches('.')
}

fn is_ip_literal(host: &str) -> bool {
    host.parse::<Ipv4Addr>().is_ok() || host.parse::<Ipv6Addr>().is_ok()
}
