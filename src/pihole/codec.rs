// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Line codecs for Pi-hole's local DNS collections.
//!
//! Pi-hole stores local records as plain strings inside JSON arrays, with a
//! different layout per collection:
//!
//! | Collection | Layout | Example |
//! |------------|--------|---------|
//! | `hosts` | `<address> <domain>` | `192.168.178.1 foobar4.com` |
//! | `cnameRecords` | `<domain>,<target>[,<ttl>]` | `foobar.de,homelab,500` |
//!
//! The same encoded line is used as the resource key when creating and
//! deleting a record, so encoding must be stable.

use super::types::DnsSection;
use crate::constants::{PIHOLE_CNAME_COLLECTION, PIHOLE_HOSTS_COLLECTION};
use crate::errors::PiHoleError;
use crate::record::{Record, RecordKind};

/// Separator between address and domain in a `hosts` line.
pub const HOSTS_DELIMITER: char = ' ';

/// Separator between fields in a `cnameRecords` line.
pub const CNAME_DELIMITER: char = ',';

/// Encoding of one record kind in one Pi-hole collection.
pub trait RecordCodec {
    /// Collection name under `/config/dns/`
    const COLLECTION: &'static str;

    /// Encode a record into its line (and resource key) form.
    fn encode(record: &Record) -> String;

    /// Decode a single line reported by Pi-hole.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::Decode`] when the line does not follow the layout.
    fn decode(line: &str) -> Result<Record, PiHoleError>;

    /// Pick this codec's lines out of a `config.dns` response section.
    fn lines(section: DnsSection) -> Vec<String>;

    /// Decode every line of a collection, failing on the first malformed one.
    ///
    /// # Errors
    ///
    /// Returns [`PiHoleError::Decode`] for the first line that does not decode.
    fn decode_all(section: DnsSection) -> Result<Vec<Record>, PiHoleError> {
        Self::lines(section)
            .iter()
            .map(|line| Self::decode(line))
            .collect()
    }
}

/// Address records: `<address> <domain>`
pub struct HostsCodec;

impl RecordCodec for HostsCodec {
    const COLLECTION: &'static str = PIHOLE_HOSTS_COLLECTION;

    fn encode(record: &Record) -> String {
        format!("{}{HOSTS_DELIMITER}{}", record.target, record.domain)
    }

    fn decode(line: &str) -> Result<Record, PiHoleError> {
        let (address, domain) = line
            .split_once(HOSTS_DELIMITER)
            .filter(|(address, domain)| !address.is_empty() && !domain.is_empty())
            .ok_or_else(|| PiHoleError::decode(format!("malformed hosts entry '{line}'")))?;

        Ok(Record::a(domain, address))
    }

    fn lines(section: DnsSection) -> Vec<String> {
        section.hosts
    }
}

/// CNAME records: `<domain>,<target>[,<ttl>]`
pub struct CnameCodec;

impl RecordCodec for CnameCodec {
    const COLLECTION: &'static str = PIHOLE_CNAME_COLLECTION;

    fn encode(record: &Record) -> String {
        match record.ttl {
            Some(ttl) => format!(
                "{}{CNAME_DELIMITER}{}{CNAME_DELIMITER}{ttl}",
                record.domain, record.target
            ),
            None => format!("{}{CNAME_DELIMITER}{}", record.domain, record.target),
        }
    }

    fn decode(line: &str) -> Result<Record, PiHoleError> {
        let parts: Vec<&str> = line.split(CNAME_DELIMITER).collect();

        match parts.as_slice() {
            [domain, target] => Ok(Record::cname(*domain, *target, None)),
            [domain, target, ttl] => {
                let ttl = ttl.parse::<i32>().map_err(|e| {
                    PiHoleError::decode(format!("invalid TTL '{ttl}' in CNAME entry '{line}': {e}"))
                })?;
                Ok(Record::cname(*domain, *target, Some(ttl)))
            }
            _ => Err(PiHoleError::decode(format!(
                "malformed CNAME entry '{line}'"
            ))),
        }
    }

    fn lines(section: DnsSection) -> Vec<String> {
        section.cname_records
    }
}

/// Collection and resource key for a record, shared by create and delete.
#[must_use]
pub fn encode_key(record: &Record) -> (&'static str, String) {
    match record.kind {
        RecordKind::A => (HostsCodec::COLLECTION, HostsCodec::encode(record)),
        RecordKind::Cname => (CnameCodec::COLLECTION, CnameCodec::encode(record)),
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
