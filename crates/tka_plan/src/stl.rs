//! STL loading for bone surfaces
//!
//! Handles both encodings. Binary files may also start with `solid`, so the
//! binary layout is trusted whenever the declared facet count matches the
//! file size exactly.

use std::path::Path;

use tka_math::Vec3;

use crate::mesh::{MeshError, PickTarget, SurfaceMesh};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Read an STL file into triangle soup
pub fn load_stl(path: impl AsRef<Path>) -> Result<Vec<[Vec3; 3]>, MeshError> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_stl(&bytes)
}

/// Read an STL file straight into a pickable surface
pub fn load_stl_surface(
    name: impl Into<String>,
    path: impl AsRef<Path>,
) -> Result<SurfaceMesh, MeshError> {
    let path = path.as_ref();
    let name = name.into();
    let facets = load_stl(path)?;
    let mesh = SurfaceMesh::from_triangle_soup(name, &facets)?;
    log::info!(
        "Loaded surface '{}' from {}: {} triangles",
        mesh.name(),
        path.display(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Decode STL bytes, detecting the encoding
pub fn parse_stl(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, MeshError> {
    if is_binary(bytes) {
        parse_binary(bytes)
    } else if starts_with_solid(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"solid")
}

fn declared_facets(bytes: &[u8]) -> Option<usize> {
    let count = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize)
}

fn is_binary(bytes: &[u8]) -> bool {
    declared_facets(bytes)
        .map(|n| bytes.len() == HEADER_LEN + 4 + n * FACET_LEN)
        .unwrap_or(false)
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, MeshError> {
    let count = declared_facets(bytes).ok_or(MeshError::Truncated {
        expected: HEADER_LEN + 4,
        actual: bytes.len(),
    })?;
    let expected = HEADER_LEN + 4 + count * FACET_LEN;
    if bytes.len() < expected {
        return Err(MeshError::Truncated { expected, actual: bytes.len() });
    }
    if count == 0 {
        return Err(MeshError::Empty);
    }

    let body = &bytes[HEADER_LEN + 4..expected];
    let facets = body
        .chunks_exact(FACET_LEN)
        .map(|facet| {
            // normal (ignored), three vertices, then a u16 attribute count
            let words: [u32; 12] = bytemuck::pod_read_unaligned(&facet[..48]);
            let f = |i: usize| f32::from_bits(u32::from_le(words[i]));
            [
                Vec3::new(f(3), f(4), f(5)),
                Vec3::new(f(6), f(7), f(8)),
                Vec3::new(f(9), f(10), f(11)),
            ]
        })
        .collect();
    Ok(facets)
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, MeshError> {
    let text = String::from_utf8_lossy(bytes);
    let mut facets = Vec::new();
    let mut pending: Vec<Vec3> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let mut coord = || -> Result<f32, MeshError> {
                    let token = parts.next().unwrap_or("");
                    token.parse().map_err(|_| MeshError::InvalidNumber {
                        line: line_no + 1,
                        text: token.to_string(),
                    })
                };
                let (x, y, z) = (coord()?, coord()?, coord()?);
                pending.push(Vec3::new(x, y, z));
            }
            Some("endfacet") => {
                if let [a, b, c] = pending[..] {
                    facets.push([a, b, c]);
                } else {
                    log::debug!(
                        "Skipping facet ending on line {} with {} vertices",
                        line_no + 1,
                        pending.len()
                    );
                }
                pending.clear();
            }
            _ => {}
        }
    }

    if facets.is_empty() {
        return Err(MeshError::Empty);
    }
    Ok(facets)
}
