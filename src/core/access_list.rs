//! The infohash access list and the per-IP permission map.
//!
//! The access list is a plain set of infohashes loaded from a text file:
//! one hex infohash per line, `#` starts a comment, blank lines are
//! ignored. Whether the set acts as a whitelist or a blacklist is decided
//! by the tracker mode, not here.
//!
//! Lines that fail to parse are skipped, kept compatible with hand-edited
//! files, but they are counted and logged so operators can detect a
//! misconfigured list.
//!
//! Reloading builds a complete new set and swaps it in under the writer
//! lock, so readers always see either the old or the new list, never a
//! partially loaded one.
use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;

use parking_lot::RwLock;
use swarm_tracker_configuration::Access;
use swarm_tracker_primitives::info_hash::InfoHash;
use tracing::warn;

/// The in-memory infohash set. Readers take the shared lock for a single
/// hash lookup; the only writer is the reload path.
#[derive(Debug, Default)]
pub struct AccessList {
    infohashes: RwLock<HashSet<InfoHash>>,
}

impl AccessList {
    #[must_use]
    pub fn contains(&self, info_hash: &InfoHash) -> bool {
        self.infohashes.read().contains(info_hash)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.infohashes.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infohashes.read().is_empty()
    }

    /// Atomically replaces the whole set.
    pub fn replace(&self, entries: HashSet<InfoHash>) {
        *self.infohashes.write() = entries;
    }
}

/// The outcome of parsing an access list file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedAccessList {
    pub entries: HashSet<InfoHash>,
    /// Lines that were neither parseable, comments nor blank.
    pub skipped_lines: u64,
}

/// Parses access list file content: one hex infohash per line, `#`
/// comments, blank lines ignored. Malformed lines are skipped and counted.
#[must_use]
pub fn parse_access_list(content: &str) -> ParsedAccessList {
    let mut parsed = ParsedAccessList::default();

    for line in content.lines() {
        let line = match line.find('#') {
            Some(position) => &line[..position],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        match line.parse::<InfoHash>() {
            Ok(info_hash) => {
                let _: bool = parsed.entries.insert(info_hash);
            }
            Err(_) => {
                warn!("skipping unparsable access list line: {line}");
                parsed.skipped_lines += 1;
            }
        }
    }

    parsed
}

/// Reads and parses an access list file.
///
/// # Errors
///
/// Will return `Err` if the file cannot be read.
pub fn load_access_list_file(path: &str) -> Result<ParsedAccessList, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_access_list(&content))
}

/// A bitmask of per-IP grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions(u8);

impl Permissions {
    /// May query `/stats` and the full scrape.
    pub const MAY_STAT: Permissions = Permissions(0b0000_0001);
    /// The `X-Forwarded-For` header of this IP is trusted.
    pub const MAY_PROXY: Permissions = Permissions(0b0000_0010);
    /// Packets from this IP are accepted by the live-sync receiver.
    pub const MAY_LIVESYNC: Permissions = Permissions(0b0000_0100);
    /// Implies every other permission.
    pub const ADMIN: Permissions = Permissions(0b1000_0000);

    #[must_use]
    pub fn grants(&self, wanted: Permissions) -> bool {
        self.0 & Self::ADMIN.0 != 0 || self.0 & wanted.0 != 0
    }

    pub fn grant(&mut self, permission: Permissions) {
        self.0 |= permission.0;
    }
}

/// Per-IP permissions. Built once from the configuration lists; an IP
/// appearing in more than one list accumulates the bits.
#[derive(Debug, Default)]
pub struct IpPermissions {
    permissions: BTreeMap<IpAddr, Permissions>,
}

impl IpPermissions {
    #[must_use]
    pub fn from_config(access: &Access) -> Self {
        let mut permissions: BTreeMap<IpAddr, Permissions> = BTreeMap::new();

        let lists = [
            (&access.stats, Permissions::MAY_STAT),
            (&access.proxy, Permissions::MAY_PROXY),
            (&access.livesync, Permissions::MAY_LIVESYNC),
            (&access.admin, Permissions::ADMIN),
        ];

        for (ips, permission) in lists {
            for ip in ips {
                permissions.entry(*ip).or_default().grant(permission);
            }
        }

        Self { permissions }
    }

    #[must_use]
    pub fn allows(&self, ip: &IpAddr, wanted: Permissions) -> bool {
        self.permissions.get(ip).is_some_and(|granted| granted.grants(wanted))
    }
}
