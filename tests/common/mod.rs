//! Test fixtures: images with hand-built EXIF GPS blocks, and a throwaway
//! HTTP server for outbound request tests.

#![allow(dead_code, clippy::unwrap_used)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;

/// A GPS coordinate as EXIF stores it.
pub struct GpsFix {
    pub lat_ref: u8,
    pub lat: [(u32, u32); 3],
    pub lon_ref: u8,
    pub lon: [(u32, u32); 3],
}

/// Eiffel Tower: 48°51'29.6" N, 2°17'40.2" E.
pub const PARIS: GpsFix = GpsFix {
    lat_ref: b'N',
    lat: [(48, 1), (51, 1), (296, 10)],
    lon_ref: b'E',
    lon: [(2, 1), (17, 1), (402, 10)],
};

/// Sydney Opera House: 33°51'24.0" S, 151°12'54.0" E.
pub const SYDNEY: GpsFix = GpsFix {
    lat_ref: b'S',
    lat: [(33, 1), (51, 1), (24, 1)],
    lon_ref: b'E',
    lon: [(151, 1), (12, 1), (54, 1)],
};

fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value);
}

/// Little-endian TIFF holding only an IFD0 with a GPS IFD pointer.
pub fn tiff_with_gps(fix: &GpsFix) -> Vec<u8> {
    const ASCII: u16 = 2;
    const LONG: u16 = 4;
    const RATIONAL: u16 = 5;
    const GPS_IFD: u32 = 26;
    const LAT_DATA: u32 = 80;
    const LON_DATA: u32 = 104;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    // IFD0
    out.extend_from_slice(&1u16.to_le_bytes());
    entry(&mut out, 0x8825, LONG, 1, GPS_IFD.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(out.len(), GPS_IFD as usize);

    // GPS IFD
    out.extend_from_slice(&4u16.to_le_bytes());
    entry(&mut out, 1, ASCII, 2, [fix.lat_ref, 0, 0, 0]);
    entry(&mut out, 2, RATIONAL, 3, LAT_DATA.to_le_bytes());
    entry(&mut out, 3, ASCII, 2, [fix.lon_ref, 0, 0, 0]);
    entry(&mut out, 4, RATIONAL, 3, LON_DATA.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    assert_eq!(out.len(), LAT_DATA as usize);

    for (num, den) in fix.lat.iter().chain(fix.lon.iter()) {
        out.extend_from_slice(&num.to_le_bytes());
        out.extend_from_slice(&den.to_le_bytes());
    }
    assert_eq!(out.len(), LON_DATA as usize + 24);

    out
}

/// A small solid-color PNG.
pub fn plain_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 180, 40])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// A PNG carrying `fix` in an `eXIf` chunk right after `IHDR`.
pub fn png_with_gps(fix: &GpsFix) -> Vec<u8> {
    // Signature (8) + IHDR chunk (4 + 4 + 13 + 4).
    const AFTER_IHDR: usize = 33;

    let png = plain_png();
    let exif = tiff_with_gps(fix);

    let mut chunk = Vec::new();
    chunk.extend_from_slice(&u32::try_from(exif.len()).unwrap().to_be_bytes());
    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(&exif);
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc32(&body).to_be_bytes());

    let mut out = png[..AFTER_IHDR].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[AFTER_IHDR..]);
    out
}

/// A small solid-color JPEG with `fix` in an APP1 `Exif` segment after SOI.
pub fn jpeg_with_gps(fix: &GpsFix) -> Vec<u8> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([60, 140, 60])))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let tiff = tiff_with_gps(fix);
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Serve `router` on an ephemeral local port for the rest of the test.
pub async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
