//! Shared fixtures: GeoLite2-shaped CSV files packed into zip archives.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const COUNTRY_DIR: &str = "GeoLite2-Country-CSV_20240102";
pub const ASN_DIR: &str = "GeoLite2-ASN-CSV_20240102";

pub const LOCATIONS_HEADER: &str = "geoname_id,locale_code,continent_code,continent_name,country_iso_code,country_name,is_in_european_union\n";
pub const COUNTRY_BLOCKS_HEADER: &str = "network,geoname_id,registered_country_geoname_id,represented_country_geoname_id,is_anonymous_proxy,is_satellite_provider,is_anycast\n";
pub const ASN_BLOCKS_HEADER: &str =
    "network,autonomous_system_number,autonomous_system_organization\n";

/// Build a zip with one top-level directory holding `members`.
pub fn build_zip(dir: &str, members: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    writer.add_directory(format!("{dir}/"), options).unwrap();
    for (name, data) in members {
        writer.start_file(format!("{dir}/{name}"), options).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Build a zip whose entries are given with their full names.
pub fn build_raw_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

pub fn csv(header: &str, rows: &[&str]) -> Vec<u8> {
    let mut out = header.to_string();
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn country_archive(locations: &[&str], ipv4: &[&str], ipv6: &[&str]) -> Vec<u8> {
    build_zip(
        COUNTRY_DIR,
        &[
            ("COPYRIGHT.txt", b"Database and Contents Copyright (c) MaxMind, Inc."),
            (
                "GeoLite2-Country-Locations-en.csv",
                &csv(LOCATIONS_HEADER, locations),
            ),
            (
                "GeoLite2-Country-Blocks-IPv4.csv",
                &csv(COUNTRY_BLOCKS_HEADER, ipv4),
            ),
            (
                "GeoLite2-Country-Blocks-IPv6.csv",
                &csv(COUNTRY_BLOCKS_HEADER, ipv6),
            ),
        ],
        CompressionMethod::Deflated,
    )
}

pub fn asn_archive(ipv4: &[&str], ipv6: &[&str]) -> Vec<u8> {
    build_zip(
        ASN_DIR,
        &[
            ("GeoLite2-ASN-Blocks-IPv4.csv", &csv(ASN_BLOCKS_HEADER, ipv4)),
            ("GeoLite2-ASN-Blocks-IPv6.csv", &csv(ASN_BLOCKS_HEADER, ipv6)),
        ],
        CompressionMethod::Deflated,
    )
}

/// Scenario A data: Rwanda and one IPv4 block.
pub fn rwanda_country_archive() -> Vec<u8> {
    country_archive(
        &["49518,en,AF,Africa,RW,Rwanda,0"],
        &["1.2.3.0/24,49518,49518,,0,0,"],
        &[],
    )
}

pub fn example_asn_archive() -> Vec<u8> {
    asn_archive(&["1.2.3.0/24,64512,EXAMPLE-AS"], &[])
}
