use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DOWNLOAD_URL, LICENSE_KEY_ENV};
use crate::database::Database;

#[derive(Parser, Debug)]
#[command(name = "geolite-convert")]
#[command(version)]
#[command(about = "Download GeoLite2 CSV databases and convert them to JSON", long_about = None)]
#[command(after_help = "Examples:\n  \
  geolite-convert download asn --last-file-name GeoLite2-ASN-CSV_20240102.zip\n  \
  geolite-convert convert country --file GeoLite2-Country-CSV.zip --asn-file GeoLite2-ASN-CSV.zip\n  \
  geolite-convert convert asn -o asn.json\n\n\
Exit status is 10 when --last-file-name names the currently published archive.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a database archive if it changed
    Download(DownloadArgs),
    /// Convert a database archive to a JSON array of ranges
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct Remote {
    /// MaxMind licence key
    #[arg(long = "licence-key", env = LICENSE_KEY_ENV, hide_env_values = true)]
    pub licence_key: Option<String>,

    /// Download endpoint
    #[arg(long, default_value = DOWNLOAD_URL, hide = true)]
    pub endpoint: String,

    /// Name of the last archive downloaded; skip the download if unchanged
    #[arg(long, value_name = "NAME")]
    pub last_file_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Database to retrieve
    #[arg(value_enum)]
    pub database: Database,

    #[command(flatten)]
    pub remote: Remote,

    /// Where to write the archive (default: the name given by the server)
    #[arg(short = 'o', long = "out-file", value_name = "PATH")]
    pub out_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Database to convert
    #[arg(value_enum)]
    pub database: Database,

    #[command(flatten)]
    pub remote: Remote,

    /// Read the archive from a local file instead of downloading it
    #[arg(short = 'f', long, value_name = "PATH", conflicts_with = "last_file_name")]
    pub file: Option<PathBuf>,

    /// Merge AS data from a local ASN archive (country only)
    #[arg(long, value_name = "PATH")]
    pub asn_file: Option<PathBuf>,

    /// Download the ASN database and merge its AS data (country only)
    #[arg(long, conflicts_with = "asn_file")]
    pub with_asn: bool,

    /// Where to write the JSON (default: stdout)
    #[arg(short = 'o', long = "out-file", value_name = "PATH")]
    pub out_file: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

impl Remote {
    /// The licence key, required whenever something is downloaded.
    pub fn require_licence_key(&self) -> anyhow::Result<&str> {
        self.licence_key.as_deref().ok_or_else(|| {
            anyhow::anyhow!("a licence key is required: pass --licence-key or set {LICENSE_KEY_ENV}")
        })
    }
}

impl ConvertArgs {
    pub fn merges_asn(&self) -> bool {
        self.asn_file.is_some() || self.with_asn
    }

    /// Whether anything has to be downloaded.
    pub fn needs_download(&self) -> bool {
        self.file.is_none() || self.with_asn
    }
}
