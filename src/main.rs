//! Main entry point for the geolite-convert CLI application.
//!
//! `download` fetches a database archive when it changed since the last
//! run; `convert` turns an archive (downloaded or local) into JSON.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use geolite_convert::cli::{Command, ConvertArgs, DownloadArgs, Remote};
use geolite_convert::config::EXIT_CODE_UNCHANGED;
use geolite_convert::parse::{convert_asn_database, convert_country_database};
use geolite_convert::{
    ArchiveReader, Cli, ConvertError, Database, Downloader, LocalFileReader, MemoryReader,
    Retrieval, SourceReader, merge, output,
};

/// How a successful run ended.
enum Outcome {
    Done,
    /// The remote archive matches `--last-file-name`.
    Unchanged,
}

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and dispatches to the
/// subcommand handler. The handler's outcome becomes the exit status:
/// 0 when work was done, 10 when the remote archive is unchanged, 1 on
/// any error (reported on stderr).
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level());

    let result = match cli.command {
        Command::Download(args) => download(args).await,
        Command::Convert(args) => convert(args).await,
    };

    match result {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Unchanged) => ExitCode::from(EXIT_CODE_UNCHANGED),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<ConvertError>() {
                log::debug!("Failed with a {} error", err.category());
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` is honoured and the CLI level applies to this crate.
fn init_logger(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_module("geolite_convert", level)
        .format_timestamp(None)
        .init();
}

fn downloader(remote: &Remote) -> Result<Downloader> {
    let key = remote.require_licence_key()?;
    Ok(Downloader::new(key)?.with_endpoint(remote.endpoint.as_str()))
}

/// Fetch the archive if it changed and store it.
///
/// The archive is written to `--out-file`, or to the server-provided name in
/// the working directory. The published name is printed on stdout in both the
/// fetched and the unchanged case.
///
/// # Arguments
///
/// * `args` - Parsed `download` arguments
///
/// # Returns
///
/// [`Outcome::Unchanged`] when `--last-file-name` is still current, otherwise
/// [`Outcome::Done`].
///
/// # Errors
///
/// Fails without a licence key, on any download error, or when the archive
/// cannot be written.
async fn download(args: DownloadArgs) -> Result<Outcome> {
    let downloader = downloader(&args.remote)?;
    let last_file_name = args.remote.last_file_name.as_deref();

    match downloader.retrieve(args.database, last_file_name).await? {
        Retrieval::Unchanged => {
            println!("{}", last_file_name.unwrap_or_default());
            Ok(Outcome::Unchanged)
        }
        Retrieval::Fetched(data) => {
            let path = match args.out_file {
                Some(path) => path,
                None => server_file_path(&data.file_name)?,
            };
            tokio::fs::write(&path, &data.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());

            println!("{}", data.file_name);
            Ok(Outcome::Done)
        }
    }
}

/// Server-provided names are used as a bare file name in the working directory.
fn server_file_path(file_name: &str) -> Result<PathBuf> {
    match Path::new(file_name).file_name() {
        Some(name) => Ok(PathBuf::from(name)),
        None => bail!("Server provided an unusable file name: {file_name:?}"),
    }
}

/// Convert a database archive to JSON.
///
/// The archive comes from `--file` or is downloaded (conditionally when
/// `--last-file-name` is given). Country data can be merged with AS data from
/// `--asn-file` or a second, unconditional download (`--with-asn`).
///
/// # Arguments
///
/// * `args` - Parsed `convert` arguments
///
/// # Returns
///
/// [`Outcome::Unchanged`] when the download was skipped, in which case nothing
/// is written; otherwise [`Outcome::Done`].
///
/// # Errors
///
/// Fails when the merge flags are used with the ASN database, when no source
/// is available, or on any download, archive, parse or output error.
async fn convert(args: ConvertArgs) -> Result<Outcome> {
    if args.merges_asn() && args.database != Database::Country {
        bail!("--asn-file and --with-asn only apply to the country database");
    }

    let downloader = if args.needs_download() {
        Some(downloader(&args.remote)?)
    } else {
        None
    };

    let source = match (&args.file, &downloader) {
        (Some(path), _) => local_source(path)?,
        (None, Some(downloader)) => {
            let last_file_name = args.remote.last_file_name.as_deref();
            match downloader.retrieve(args.database, last_file_name).await? {
                Retrieval::Unchanged => return Ok(Outcome::Unchanged),
                Retrieval::Fetched(data) => {
                    log::info!("Converting {}", data.file_name);
                    SourceReader::Memory(MemoryReader::new(data.content))
                }
            }
        }
        (None, None) => bail!("Nothing to convert: pass --file or a licence key"),
    };
    let archive = ArchiveReader::open(Arc::new(source))
        .await
        .context("Failed to open the database archive")?;

    match args.database {
        Database::Asn => {
            let entries = convert_asn_database(&archive).await?;
            write_output(&args, &entries)?;
        }
        Database::Country if args.merges_asn() => {
            let countries = convert_country_database(&archive).await?;

            let asn_source = match (&args.asn_file, &downloader) {
                (Some(path), _) => local_source(path)?,
                (None, Some(downloader)) => match downloader.retrieve(Database::Asn, None).await? {
                    Retrieval::Fetched(data) => {
                        log::info!("Merging {}", data.file_name);
                        SourceReader::Memory(MemoryReader::new(data.content))
                    }
                    Retrieval::Unchanged => {
                        bail!("ASN download reported no change without a previous name")
                    }
                },
                (None, None) => bail!("--with-asn requires a licence key"),
            };
            let asn_archive = ArchiveReader::open(Arc::new(asn_source))
                .await
                .context("Failed to open the ASN archive")?;
            let asns = convert_asn_database(&asn_archive).await?;

            write_output(&args, &merge(countries, &asns))?;
        }
        Database::Country => {
            let entries = convert_country_database(&archive).await?;
            write_output(&args, &entries)?;
        }
    }

    Ok(Outcome::Done)
}

fn local_source(path: &Path) -> Result<SourceReader> {
    let reader = LocalFileReader::new(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(SourceReader::Local(reader))
}

/// Write `entries` as JSON to `--out-file`, or to stdout when none is given.
fn write_output<T: serde::Serialize>(args: &ConvertArgs, entries: &[T]) -> Result<()> {
    match &args.out_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            output::write_json(BufWriter::new(file), entries, args.pretty)?;
            log::info!("Wrote {} entries to {}", entries.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            output::write_json(&mut writer, entries, args.pretty)?;
            writer.flush()?;
        }
    }
    Ok(())
}
