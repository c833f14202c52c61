use anyhow::{Context, Result};
use bucket_tree::MountContext;
use clap::{Parser, Subcommand};
use std::{env, path::PathBuf};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mount_prefix: String,
    pub pretty: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Directory view over flat object-store listings")]
pub struct Args {
    /// Path prefix prepended to every filesystem path (overrides BUCKET_TREE_MOUNT_PREFIX)
    #[arg(long, global = true)]
    pub mount_prefix: Option<String>,

    /// Pretty-print JSON output (overrides BUCKET_TREE_PRETTY)
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List a directory from a raw listing, implicit directories included
    Ls {
        /// JSON array of `{ "key", "etag", "is_dir" }` hits, or `-` for stdin
        #[arg(long)]
        listing: PathBuf,

        /// Directory to list (default: the whole mount)
        #[arg(long)]
        dir: Option<String>,

        /// Include alias keys, not just canonical names
        #[arg(long)]
        all: bool,

        /// Keep the trailing `/` on directory names
        #[arg(long)]
        slash: bool,
    },

    /// Translate object response headers into stat attributes
    Stat {
        /// JSON object of header name to value, or `-` for stdin
        #[arg(long)]
        headers: PathBuf,

        /// Path the headers belong to
        #[arg(long, default_value = "")]
        path: String,

        /// Report the object as a directory regardless of its content type
        #[arg(long)]
        force_dir: bool,
    },

    /// Plan a recursive directory rename
    PlanRename {
        #[arg(long)]
        listing: PathBuf,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Plan a recursive directory delete
    PlanDelete {
        #[arg(long)]
        listing: PathBuf,

        #[arg(long)]
        dir: String,
    },

    /// Check whether a user is listed in a group
    Member {
        #[arg(long)]
        uid: u32,

        #[arg(long)]
        gid: u32,
    },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command to run.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        // Parse CLI once
        let args = Args::parse();
        Self::merge(args, |key| env::var(key))
    }

    /// Merge parsed arguments with an environment lookup; arguments win.
    pub fn merge<F>(args: Args, lookup: F) -> Result<(Self, Command)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_prefix = lookup("BUCKET_TREE_MOUNT_PREFIX").unwrap_or_default();
        let env_pretty = match lookup("BUCKET_TREE_PRETTY") {
            Ok(value) => parse_flag(&value)
                .with_context(|| format!("parsing BUCKET_TREE_PRETTY value `{}`", value))?,
            Err(env::VarError::NotPresent) => false,
            Err(err) => return Err(err).context("reading BUCKET_TREE_PRETTY"),
        };

        // --- Merge ---
        let cfg = Self {
            mount_prefix: args.mount_prefix.unwrap_or(env_prefix),
            pretty: args.pretty || env_pretty,
        };

        Ok((cfg, args.command))
    }

    pub fn mount_context(&self) -> MountContext {
        MountContext::new(self.mount_prefix.clone())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got `{}`", other),
    }
}
