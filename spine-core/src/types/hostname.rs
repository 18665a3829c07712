//! Hostname value object

use std::fmt;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// 子域名单个 label 的最大长度
const MAX_LABEL_LEN: usize = 63;
/// 清洗时最多扫描的字节数
const SANITIZE_SCAN_LIMIT: usize = 200;

/// A parsed `sub.root` hostname.
///
/// Only single-level subdomains of two-label roots are supported, so
/// `i.sharify.me` parses as `("i", "sharify.me")` and a bare `sharify.me` as
/// `("", "sharify.me")`. Input is trimmed and lower-cased once here; the
/// parts are never re-derived afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hostname {
    full: String,
    sub: String,
    root: String,
}

impl Hostname {
    /// Parse a full hostname.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let labels: Vec<&str> = normalized.split('.').collect();

        if !labels.iter().all(|l| is_valid_label(l)) {
            return Err(CoreError::InvalidFormat(raw.to_string()));
        }

        match labels.as_slice() {
            [_, _] => Ok(Self {
                sub: String::new(),
                root: normalized.clone(),
                full: normalized,
            }),
            [sub, domain, tld] => Ok(Self {
                sub: (*sub).to_string(),
                root: format!("{domain}.{tld}"),
                full: normalized.clone(),
            }),
            _ => Err(CoreError::InvalidFormat(raw.to_string())),
        }
    }

    /// Build a hostname from a user-supplied subdomain and a root domain.
    ///
    /// The subdomain is sanitised (see [`sanitize_subdomain`]); an empty `sub`
    /// means the bare root. A non-empty `sub` that sanitises to nothing is
    /// rejected.
    pub fn from_parts(sub: &str, root: &str) -> CoreResult<Self> {
        let root_host = Self::parse(root)?;
        if !root_host.is_root_only() {
            return Err(CoreError::InvalidFormat(root.to_string()));
        }
        if sub.trim().is_empty() {
            return Ok(root_host);
        }

        let clean = sanitize_subdomain(sub);
        if clean.is_empty() {
            return Err(CoreError::InvalidFormat(sub.to_string()));
        }

        Ok(Self {
            full: format!("{clean}.{}", root_host.root),
            sub: clean,
            root: root_host.root,
        })
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn sub(&self) -> &str {
        &self.sub
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `true` for a bare root domain, which never has a provider record.
    pub fn is_root_only(&self) -> bool {
        self.sub.is_empty()
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// LDH label: `[a-z0-9-]`, 1..=63 chars, no hyphen at either end.
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Clean up a user-supplied subdomain label.
///
/// Trims and lower-cases, turns periods into hyphens (one level only), keeps
/// `[a-z0-9-]` from the first 200 bytes, strips leading/trailing hyphens and
/// caps the result at 63 characters.
pub fn sanitize_subdomain(sub: &str) -> String {
    let lowered = sub.trim().to_lowercase().replace('.', "-");

    let kept: String = lowered
        .char_indices()
        .take_while(|(i, _)| *i < SANITIZE_SCAN_LIMIT)
        .map(|(_, c)| c)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let capped: String = kept.trim_matches('-').chars().take(MAX_LABEL_LEN).collect();
    capped.trim_end_matches('-').to_string()
}
