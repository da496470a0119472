// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration for the operator.
//!
//! Every flag falls back to an environment variable so the operator can be
//! configured from a Kubernetes `Deployment` without a command line. The log
//! level itself is read from `RUST_LOG` by the tracing subscriber.

use crate::constants::{
    CONTROLLER_NAME, DEFAULT_MAX_CONCURRENT_RECONCILES, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_REQUEUE_INTERVAL_SECS,
};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Output format of the log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Operator configuration.
#[derive(Clone, Debug, Parser)]
#[command(name = CONTROLLER_NAME)]
#[command(version, about = "Keeps DNSName resources converged into Pi-hole local DNS")]
pub struct Config {
    /// Base URL of the Pi-hole API, e.g. `http://pi.hole/api`.
    #[arg(long, env = "PIHOLE_URL")]
    pub pihole_url: String,

    /// Pi-hole application password.
    #[arg(long, env = "PIHOLE_PASSWORD", hide_env_values = true)]
    pub pihole_password: String,

    /// Maximum number of `DNSName` resources reconciled in parallel.
    #[arg(
        long,
        env = "MAX_CONCURRENT_RECONCILES",
        default_value_t = DEFAULT_MAX_CONCURRENT_RECONCILES,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub max_concurrent_reconciles: u16,

    /// Seconds between drift-repair passes of a converged `DNSName`.
    #[arg(
        long,
        env = "REQUEUE_INTERVAL_SECS",
        default_value_t = DEFAULT_REQUEUE_INTERVAL_SECS
    )]
    pub requeue_interval_secs: u64,

    /// Address the `/metrics` endpoint listens on.
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Log output format.
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Name of this replica, reported in Kubernetes events.
    #[arg(long, env = "POD_NAME")]
    pub pod_name: Option<String>,
}

impl Config {
    /// Delay before a converged `DNSName` is reconciled again.
    #[must_use]
    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
