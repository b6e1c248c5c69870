//! Host-to-Tenant Resolution
//!
//! Derives the tenant id for a request from its host. The same resolver backs
//! the server interception stage and any code that needs the active tenant
//! before a round-trip, so the two can never disagree.
//!
//! - Tenant subdomains: publisher1.example.com -> "publisher1"
//! - Reserved and unknown hosts: www.example.com, localhost, other.org -> "main"

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::types::TenantId;

/// Labels that can never be used as a tenant id
pub const RESERVED_SUBDOMAINS: &[&str] = &[
    "www",
    "api",
    "admin",
    "auth",
    "app",
    "dashboard",
    "mail",
    "cdn",
    "static",
    "assets",
];

/// How to treat hosts with more than one label in front of the main domain
/// (e.g. `sub.publisher1.example.com`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiLevelHostPolicy {
    /// Use the first label ("sub"); matches the long-standing routing behavior
    #[default]
    FirstLabel,
    /// Refuse nested subdomains and fall back to the main tenant
    DefaultTenant,
    /// Use the label directly in front of the main domain ("publisher1")
    NearestLabel,
}

impl MultiLevelHostPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultiLevelHostPolicy::FirstLabel => "first-label",
            MultiLevelHostPolicy::DefaultTenant => "default-tenant",
            MultiLevelHostPolicy::NearestLabel => "nearest-label",
        }
    }
}

impl fmt::Display for MultiLevelHostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultiLevelHostPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-label" | "first_label" => Ok(MultiLevelHostPolicy::FirstLabel),
            "default-tenant" | "default_tenant" | "main" => Ok(MultiLevelHostPolicy::DefaultTenant),
            "nearest-label" | "nearest_label" => Ok(MultiLevelHostPolicy::NearestLabel),
            other => Err(format!("unknown multi-level host policy: {}", other)),
        }
    }
}

/// Pure host resolver
#[derive(Debug, Clone)]
pub struct TenantResolver {
    main_domain: String,
    reserved: HashSet<String>,
    policy: MultiLevelHostPolicy,
}

impl TenantResolver {
    /// Create a resolver for `main_domain` with the default reserved labels
    pub fn new(main_domain: &str) -> Self {
        Self {
            main_domain: normalize_domain(main_domain),
            reserved: RESERVED_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            policy: MultiLevelHostPolicy::default(),
        }
    }

    /// Add extra reserved labels on top of the defaults
    pub fn with_reserved<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            let label = label.as_ref().trim().to_ascii_lowercase();
            if !label.is_empty() {
                self.reserved.insert(label);
            }
        }
        self
    }

    pub fn with_policy(mut self, policy: MultiLevelHostPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn main_domain(&self) -> &str {
        &self.main_domain
    }

    pub fn policy(&self) -> MultiLevelHostPolicy {
        self.policy
    }

    pub fn is_reserved(&self, label: &str) -> bool {
        self.reserved.contains(label)
    }

    /// Resolve a raw host header value to a tenant
    ///
    /// Never fails: anything that is not a tenant subdomain of the main domain
    /// resolves to the main tenant.
    pub fn resolve(&self, host: Option<&str>) -> TenantId {
        let tenant = match host {
            Some(raw) if !raw.trim().is_empty() => self.resolve_normalized(&normalize_host(raw)),
            _ => TenantId::main(),
        };

        tracing::debug!(host = ?host, tenant = %tenant, "Resolved tenant");
        tenant
    }

    fn resolve_normalized(&self, host: &str) -> TenantId {
        let labels: Vec<&str> = host.split('.').collect();
        let first = labels[0];

        if host == "localhost"
            || first.is_empty()
            || self.is_reserved(first)
            || labels.len() < 2
            || (labels.len() == 3 && self.is_reserved(first))
        {
            return TenantId::main();
        }

        let base_suffix = format!(".{}", self.main_domain);
        if !host.ends_with(&base_suffix) {
            return TenantId::main();
        }

        let domain_labels = self.main_domain.split('.').count();
        let sub_labels = labels.len().saturating_sub(domain_labels);
        if sub_labels <= 1 {
            return TenantId::new(first);
        }

        match self.policy {
            MultiLevelHostPolicy::FirstLabel => TenantId::new(first),
            MultiLevelHostPolicy::DefaultTenant => TenantId::main(),
            MultiLevelHostPolicy::NearestLabel => {
                let nearest = labels[sub_labels - 1];
                if nearest.is_empty() || self.is_reserved(nearest) {
                    TenantId::main()
                } else {
                    TenantId::new(nearest)
                }
            }
        }
    }
}

/// Normalize a host header value
pub fn normalize_host(host: &str) -> String {
    // Remove port if present
    let host = host.split(':').next().unwrap_or(host);
    host.trim().trim_end_matches('.').to_lowercase()
}

fn normalize_domain(domain: &str) -> String {
    normalize_host(domain).trim_start_matches('.').to_string()
}
