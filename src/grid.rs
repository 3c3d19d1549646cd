//! Hierarchical grid schemes backing the cell codec.
//!
//! Each scheme maps a coordinate to the body of a cell identifier at a given
//! resolution. S2 and geohash bodies get a fixed-width resolution header from
//! the codec. H3 indexes carry their own mode and resolution digits in the
//! same two leading characters; see [`crate::codec`].

use crate::codec::HEADER_LEN;
use crate::error::{Result, RewriteError};
use h3o::{CellIndex, LatLng as H3LatLng, Resolution};
use s2::cellid::CellID;
use s2::latlng::LatLng;
use serde::{Deserialize, Serialize};
use spatio_rewrite_types::coordinate::Coordinate;
use std::fmt;
use std::ops::RangeInclusive;

/// Finest S2 level.
pub const S2_MAX_LEVEL: u8 = 30;

/// Longest geohash supported by the `geohash` crate.
pub const GEOHASH_MAX_PRECISION: u8 = 12;

/// Finest H3 resolution.
pub const H3_MAX_RESOLUTION: u8 = 15;

/// Hex digits of an H3 cell index.
const H3_INDEX_LEN: usize = 15;

/// Leading digit of every H3 cell index (mode 1).
const H3_MODE_DIGIT: char = '8';

/// Hex digits of a 64-bit S2 cell id.
const S2_BODY_LEN: usize = 16;

/// Hierarchical tiling of the sphere used to derive cell identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridScheme {
    /// Uber H3 hexagons. Resolution is the H3 resolution. Identifiers are
    /// plain lowercase H3 index strings.
    #[default]
    H3,
    /// S2 cube-face quadtree. Resolution is the S2 level.
    S2,
    /// Base-32 geohash. Resolution is the geohash length.
    Geohash,
}

impl GridScheme {
    /// Resolutions this scheme can encode at.
    pub fn resolution_range(self) -> RangeInclusive<u8> {
        match self {
            Self::H3 => 0..=H3_MAX_RESOLUTION,
            Self::S2 => 0..=S2_MAX_LEVEL,
            Self::Geohash => 1..=GEOHASH_MAX_PRECISION,
        }
    }

    pub fn validate_resolution(self, resolution: u8) -> Result<()> {
        let range = self.resolution_range();
        if range.contains(&resolution) {
            Ok(())
        } else {
            Err(RewriteError::InvalidResolution {
                scheme: self,
                resolution,
                min: *range.start(),
                max: *range.end(),
            })
        }
    }

    /// Length of the identifier body at `resolution`.
    pub fn body_len(self, resolution: u8) -> usize {
        match self {
            Self::H3 => H3_INDEX_LEN - HEADER_LEN,
            Self::S2 => S2_BODY_LEN,
            Self::Geohash => resolution as usize,
        }
    }

    /// Two-character header written in front of a body at `resolution`.
    pub(crate) fn header(self, resolution: u8) -> String {
        match self {
            Self::H3 => format!("{}{:x}", H3_MODE_DIGIT, resolution),
            Self::S2 | Self::Geohash => format!("{:02x}", resolution),
        }
    }

    /// Resolution named by a header, if it is well formed for this scheme.
    pub(crate) fn header_resolution(self, header: &str) -> Option<u8> {
        if header.len() != HEADER_LEN || !header.bytes().all(is_lower_hex_digit) {
            return None;
        }
        match self {
            Self::H3 => header
                .strip_prefix(H3_MODE_DIGIT)
                .and_then(|digit| u8::from_str_radix(digit, 16).ok()),
            Self::S2 | Self::Geohash => u8::from_str_radix(header, 16).ok(),
        }
    }

    /// Encode a validated coordinate into the scheme-specific body.
    pub(crate) fn encode_body(self, coordinate: &Coordinate, resolution: u8) -> Result<String> {
        match self {
            Self::H3 => {
                let resolution = Resolution::try_from(resolution).map_err(|_| {
                    RewriteError::InvalidResolution {
                        scheme: self,
                        resolution,
                        min: 0,
                        max: H3_MAX_RESOLUTION,
                    }
                })?;
                let cell = H3LatLng::new(coordinate.latitude(), coordinate.longitude())
                    .map_err(|e| RewriteError::InvalidCoordinate {
                        latitude: coordinate.latitude(),
                        longitude: coordinate.longitude(),
                        reason: e.to_string(),
                    })?
                    .to_cell(resolution);
                Ok(h3_index_string(cell)[HEADER_LEN..].to_string())
            }
            Self::S2 => {
                let leaf = CellID::from(LatLng::from_degrees(
                    coordinate.latitude(),
                    coordinate.longitude(),
                ));
                let cell = leaf.parent(resolution as u64);
                Ok(format!("{:016x}", cell.0))
            }
            Self::Geohash => geohash::encode(coordinate.point().into(), resolution as usize)
                .map_err(|e| RewriteError::InvalidCoordinate {
                    latitude: coordinate.latitude(),
                    longitude: coordinate.longitude(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Body of the ancestor at `parent`; the caller guarantees it is not finer
    /// than `resolution`, the resolution of `body`.
    pub(crate) fn parent_body(self, resolution: u8, body: &str, parent: u8) -> Option<String> {
        match self {
            Self::H3 => {
                let cell = h3_cell(resolution, body)?;
                let ancestor = cell.parent(Resolution::try_from(parent).ok()?)?;
                Some(h3_index_string(ancestor)[HEADER_LEN..].to_string())
            }
            Self::S2 => {
                let id = u64::from_str_radix(body, 16).ok()?;
                let ancestor = CellID(id).parent(parent as u64);
                Some(format!("{:016x}", ancestor.0))
            }
            Self::Geohash => body.get(..parent as usize).map(str::to_string),
        }
    }

    /// Whether `body` is a well-formed cell of this scheme at `resolution`.
    pub(crate) fn body_matches(self, resolution: u8, body: &str) -> bool {
        match self {
            Self::H3 => h3_cell(resolution, body).is_some(),
            Self::S2 => {
                if body.len() != S2_BODY_LEN || !body.bytes().all(is_lower_hex_digit) {
                    return false;
                }
                u64::from_str_radix(body, 16)
                    .map(CellID)
                    .is_ok_and(|cell| cell.is_valid() && cell.level() == resolution as u64)
            }
            Self::Geohash => {
                body.len() == resolution as usize
                    && body.len() <= GEOHASH_MAX_PRECISION as usize
                    && body.bytes().all(is_geohash_digit)
            }
        }
    }
}

fn h3_index_string(cell: CellIndex) -> String {
    format!("{:015x}", u64::from(cell))
}

/// Reassemble an H3 index from its resolution and the digits after the header.
fn h3_cell(resolution: u8, body: &str) -> Option<CellIndex> {
    if body.len() != H3_INDEX_LEN - HEADER_LEN || !body.bytes().all(is_lower_hex_digit) {
        return None;
    }
    let index = format!("{}{}", GridScheme::H3.header(resolution), body);
    let raw = u64::from_str_radix(&index, 16).ok()?;
    CellIndex::try_from(raw).ok()
}

fn is_lower_hex_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}

fn is_geohash_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'b'..=b'h' | b'j' | b'k' | b'm' | b'n' | b'p'..=b'z')
}

impl fmt::Display for GridScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H3 => f.write_str("h3"),
            Self::S2 => f.write_str("s2"),
            Self::Geohash => f.write_str("geohash"),
        }
    }
}
