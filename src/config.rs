//! Fixed values of the GeoLite2 download service and the command line.

/// MaxMind download endpoint shared by every edition.
pub const DOWNLOAD_URL: &str = "https://download.maxmind.com/app/geoip_download";

/// Archive format requested through the `suffix` query parameter.
pub const ARCHIVE_SUFFIX: &str = "zip";

/// Environment variable consulted when `--licence-key` is not given.
pub const LICENSE_KEY_ENV: &str = "MAXMIND_LICENSE_KEY";

/// Exit status reported when the remote database has not changed.
pub const EXIT_CODE_UNCHANGED: u8 = 10;

/// Overall timeout for a single HTTP request, body included.
pub const HTTP_TIMEOUT_SECS: u64 = 300;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
