//! Row-lock scopes passed into record store calls

use std::fmt;

/// Table a lock applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockResource {
    DnsRecords,
    Hosts,
}

/// Lock strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStrength {
    /// `FOR SHARE`: blocks concurrent deletes of the rows read
    Shared,
    /// `FOR UPDATE`: serialises writers on the rows read
    Exclusive,
}

/// Which table to lock and how strongly.
///
/// Every store method that reads under a lock takes one of these explicitly;
/// the coordinator picks the scope per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockScope {
    pub resource: LockResource,
    pub strength: LockStrength,
}

impl LockScope {
    pub const fn shared(resource: LockResource) -> Self {
        Self {
            resource,
            strength: LockStrength::Shared,
        }
    }

    pub const fn exclusive(resource: LockResource) -> Self {
        Self {
            resource,
            strength: LockStrength::Exclusive,
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = match self.resource {
            LockResource::DnsRecords => "dns_records",
            LockResource::Hosts => "hosts",
        };
        let strength = match self.strength {
            LockStrength::Shared => "shared",
            LockStrength::Exclusive => "exclusive",
        };
        write!(f, "{strength}({table})")
    }
}
