use clap::ValueEnum;

/// GeoLite2 CSV database kinds that can be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Database {
    Asn,
    Country,
}

pub const COUNTRY_BLOCKS_IPV4: &str = "GeoLite2-Country-Blocks-IPv4.csv";
pub const COUNTRY_BLOCKS_IPV6: &str = "GeoLite2-Country-Blocks-IPv6.csv";
pub const COUNTRY_LOCATIONS: &str = "GeoLite2-Country-Locations-en.csv";
pub const ASN_BLOCKS_IPV4: &str = "GeoLite2-ASN-Blocks-IPv4.csv";
pub const ASN_BLOCKS_IPV6: &str = "GeoLite2-ASN-Blocks-IPv6.csv";

impl Database {
    /// Value of the `edition_id` query parameter.
    pub fn edition_id(&self) -> &'static str {
        match self {
            Database::Asn => "GeoLite2-ASN-CSV",
            Database::Country => "GeoLite2-Country-CSV",
        }
    }

    /// CSV members of the archive, relative to its top-level directory.
    ///
    /// Country archives list the locations file first; both kinds then list
    /// the IPv4 and IPv6 blocks, in that order.
    pub fn members(&self) -> &'static [&'static str] {
        match self {
            Database::Asn => &[ASN_BLOCKS_IPV4, ASN_BLOCKS_IPV6],
            Database::Country => &[COUNTRY_LOCATIONS, COUNTRY_BLOCKS_IPV4, COUNTRY_BLOCKS_IPV6],
        }
    }
}

impl std::fmt::Display for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Database::Asn => "asn",
            Database::Country => "country",
        })
    }
}
