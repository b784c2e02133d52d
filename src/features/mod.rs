//! Lexical and structural URL features
//!
//! Each URL becomes a fixed 9-field [`FeatureVector`]:
//!
//! | # | name                  | kind      |
//! |---|-----------------------|-----------|
//! | 0 | `length`              | count     |
//! | 1 | `num_special_chars`   | count     |
//! | 2 | `contains_login`      | indicator |
//! | 3 | `contains_free`       | indicator |
//! | 4 | `contains_click_here` | indicator |
//! | 5 | `is_https`            | indicator |
//! | 6 | `domain_hash`         | category  |
//! | 7 | `tld_hash`            | category  |
//! | 8 | `num_subdomains`      | count     |
//!
//! Extraction never fails: empty or malformed URLs still produce a fully
//! populated vector.

pub mod domain;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

pub use domain::DomainParts;

/// Number of features per URL
pub const NUM_FEATURES: usize = 9;

/// Version of the feature layout. Bump when names, order or semantics change.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Feature names in column order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "length",
    "num_special_chars",
    "contains_login",
    "contains_free",
    "contains_click_here",
    "is_https",
    "domain_hash",
    "tld_hash",
    "num_subdomains",
];

/// Columns holding hashed categorical values (excluded from scaling)
pub const CATEGORICAL_COLUMNS: [usize; 2] = [6, 7];

/// Literal marker terms checked by substring membership
const MARKER_LOGIN: &str = "login";
const MARKER_FREE: &str = "free";
const MARKER_CLICK_HERE: &str = "click here";

/// Whether column `idx` is a hashed categorical column
pub fn is_categorical(idx: usize) -> bool {
    CATEGORICAL_COLUMNS.contains(&idx)
}

/// Feature vector for a single URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub length: usize,
    pub num_special_chars: usize,
    pub contains_login: u8,
    pub contains_free: u8,
    pub contains_click_here: u8,
    pub is_https: u8,
    /// Stable hash of the registrable domain label, in `[0, 1)`
    pub domain_hash: f64,
    /// Stable hash of the public suffix, in `[0, 1)`
    pub tld_hash: f64,
    pub num_subdomains: usize,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_row(&self) -> [f64; NUM_FEATURES] {
        [
            self.length as f64,
            self.num_special_chars as f64,
            f64::from(self.contains_login),
            f64::from(self.contains_free),
            f64::from(self.contains_click_here),
            f64::from(self.is_https),
            self.domain_hash,
            self.tld_hash,
            self.num_subdomains as f64,
        ]
    }

    /// Fixed-key mapping view, always exactly [`NUM_FEATURES`] entries
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_NAMES.iter().copied().zip(self.to_row()).collect()
    }
}

/// Lower-case the URL and drop a leading `www.` (after an optional scheme).
pub fn normalize_url(url: &str) -> String {
    let lower = url.to_lowercase();
    match lower.find("://") {
        Some(idx) => {
            let (scheme, rest) = lower.split_at(idx + 3);
            match rest.strip_prefix("www.") {
                Some(stripped) => format!("{scheme}{stripped}"),
                None => lower,
            }
        }
        None => match lower.strip_prefix("www.") {
            Some(stripped) => stripped.to_string(),
            None => lower,
        },
    }
}

/// Map a string to a stable value in `[0, 1)`.
///
/// Uses the top 53 bits of xxh3 so the result is exact in an `f64` and the
/// same on every run and platform.
pub fn stable_hash(s: &str) -> f64 {
    (xxh3_64(s.as_bytes()) >> 11) as f64 / (1u64 << 53) as f64
}

/// Extracts feature vectors from URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from one raw URL (normalization included)
    pub fn extract(&self, url: &str) -> FeatureVector {
        let url = normalize_url(url);
        let parts = DomainParts::parse(&url);

        FeatureVector {
            length: url.chars().count(),
            num_special_chars: url.chars().filter(|c| !c.is_alphanumeric()).count(),
            contains_login: url.contains(MARKER_LOGIN) as u8,
            contains_free: url.contains(MARKER_FREE) as u8,
            contains_click_here: url.contains(MARKER_CLICK_HERE) as u8,
            is_https: url.starts_with("https") as u8,
            domain_hash: stable_hash(&parts.domain),
            tld_hash: stable_hash(&parts.suffix),
            num_subdomains: parts.subdomain_count(),
        }
    }

    /// Extract features for many URLs in parallel.
    ///
    /// Output position `i` always corresponds to input position `i`.
    pub fn extract_batch<S: AsRef<str> + Sync>(&self, urls: &[S]) -> Vec<FeatureVector> {
        urls.par_iter().map(|u| self.extract(u.as_ref())).collect()
    }
}
