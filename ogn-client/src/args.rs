//! Command-line argument parsing for APRS client applications.
//!
//! This module is only available when the `cli` feature is enabled.
//! It provides a structured way to parse command-line arguments and
//! convert them into a `Config` object.
//!
//! # Examples
//!
//! ```no_run
//! use ogn_client::args::Args;
//! use ogn_client::Config;
//!
//! let args = Args::parse();
//! let config = Config::from_args(&args)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::{Config, ConfigBuilder};
use crate::errors::OgnClientError;
use clap::Parser;
use std::time::Duration;

/// APRS client command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// APRS server hostname [default: aprs.glidernet.org]
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// APRS server port [default: 10152]
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Call sign used for the login [default: N0CALL]
    #[arg(short = 'u', long, value_name = "CALLSIGN")]
    pub user: Option<String>,

    /// APRS passcode; omit for a read-only login
    #[arg(short = 'P', long, value_name = "PASSCODE", env = "OGN_PASSWORD")]
    pub password: Option<String>,

    /// Server-side filter, e.g. "filter r/48.0/11.0/100"
    #[arg(short = 'f', long, value_name = "FILTER")]
    pub filter: Option<String>,

    /// Exit on the first connection loss instead of reconnecting
    #[arg(long)]
    pub no_reconnect: bool,

    /// Read timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub read_timeout: Option<u64>,

    /// Configuration file path (TOML format)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<String>,

    /// Log every line sent and received
    #[arg(long)]
    pub trace: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse command-line arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse arguments from an iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }
}

impl Config {
    /// Create a configuration from command-line arguments.
    ///
    /// If a config file is specified in the arguments, it is loaded first,
    /// then overridden by explicit command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The configuration validation fails
    pub fn from_args(args: &Args) -> Result<Self, OgnClientError> {
        let mut builder = match &args.config {
            Some(path) => ConfigBuilder::from_config(Config::from_file(path)?),
            None => Config::builder(),
        };

        if let Some(host) = &args.host {
            builder = builder.host(host);
        }
        if let Some(port) = args.port {
            builder = builder.port(port);
        }
        if let Some(user) = &args.user {
            builder = builder.username(user);
        }
        if let Some(password) = &args.password {
            builder = builder.password(password);
        }
        if let Some(filter) = &args.filter {
            builder = builder.filter(filter);
        }
        if args.no_reconnect {
            builder = builder.reconnect(false);
        }
        if let Some(secs) = args.read_timeout {
            builder = builder.read_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}
