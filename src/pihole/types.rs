// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types for the Pi-hole configuration API.

use serde::{Deserialize, Serialize};

/// Body of `POST /auth`
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub password: &'a str,
}

/// Response of `POST /auth`
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub session: SessionInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionInfo {
    pub valid: bool,
    #[serde(default)]
    pub sid: Option<String>,
}

/// Response of `GET /config/dns/<collection>`
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigResponse {
    pub config: ConfigSection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigSection {
    pub dns: DnsSection,
}

/// The `config.dns` section. Pi-hole only returns the requested collection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSection {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub cname_records: Vec<String>,
}
