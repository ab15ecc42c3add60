//! Wavefront (.obj) text parser.
//!
//! The whole document is parsed in one synchronous pass. Malformed
//! structural lines (`v`, `vt`, `vn`) abort the load because later face
//! references depend on correct element counts; malformed face lines only
//! cost the offending face (or one attribute channel) and are logged.

use log::warn;
use thiserror::Error;

use super::{Mesh, Polygon};
use crate::math::{Vec2, Vec3};

/// Fatal load failures. Line numbers are 1-based.
#[derive(Debug, Error, PartialEq)]
pub enum ObjParseError {
    #[error("mesh description is empty")]
    EmptyInput,
    #[error("line {line}: too few arguments for `{element}`")]
    TooFewArguments { line: usize, element: &'static str },
    #[error("line {line}: `{value}` is not a valid number")]
    BadNumber { line: usize, value: String },
}

/// Parses an entire .obj document into a [`Mesh`].
///
/// Comment lines, object/group markers, material statements and unknown
/// keywords are ignored without error.
pub fn parse(input: &str) -> Result<Mesh, ObjParseError> {
    if input.trim().is_empty() {
        return Err(ObjParseError::EmptyInput);
    }

    let mut mesh = Mesh::default();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut words = trimmed.split_whitespace();
        match words.next() {
            Some("v") => {
                let v = parse_vec3(line, "v", &mut words)?;
                mesh.positions.push(v);
            }
            Some("vt") => {
                let vt = parse_vec2(line, "vt", &mut words)?;
                mesh.tex_coords.push(vt);
            }
            Some("vn") => {
                let vn = parse_vec3(line, "vn", &mut words)?;
                mesh.normals.push(vn);
            }
            Some("f") => {
                if let Some(polygon) = parse_face(&mesh, line, words) {
                    mesh.polygons.push(polygon);
                }
            }
            // `o`, `g`, `s`, `mtllib`, `usemtl` and anything unrecognized
            _ => {}
        }
    }
    Ok(mesh)
}

fn parse_float(line: usize, word: &str) -> Result<f32, ObjParseError> {
    word.parse().map_err(|_| ObjParseError::BadNumber {
        line,
        value: word.to_string(),
    })
}

fn parse_vec3<'a>(
    line: usize,
    element: &'static str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Vec3, ObjParseError> {
    match (words.next(), words.next(), words.next()) {
        (Some(a), Some(b), Some(c)) => Ok(Vec3::new(
            parse_float(line, a)?,
            parse_float(line, b)?,
            parse_float(line, c)?,
        )),
        _ => Err(ObjParseError::TooFewArguments { line, element }),
    }
}

fn parse_vec2<'a>(
    line: usize,
    element: &'static str,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Vec2, ObjParseError> {
    match (words.next(), words.next()) {
        (Some(a), Some(b)) => Ok(Vec2::new(parse_float(line, a)?, parse_float(line, b)?)),
        _ => Err(ObjParseError::TooFewArguments { line, element }),
    }
}

/// Parses one `f` line. Bad vertex tokens are skipped with a warning; a
/// face left with fewer than 3 valid references is dropped entirely, and a
/// texture/normal channel that does not cover every vertex is cleared.
fn parse_face<'a>(
    mesh: &Mesh,
    line: usize,
    words: impl Iterator<Item = &'a str>,
) -> Option<Polygon> {
    let mut polygon = Polygon::default();
    for token in words {
        if let Err(reason) = parse_face_vertex(mesh, token, &mut polygon) {
            warn!("line {line}: skipping face vertex `{token}`: {reason}");
        }
    }

    if polygon.vertex_indices.len() < 3 {
        warn!("line {line}: dropping face with fewer than 3 valid vertex references");
        return None;
    }
    if !polygon.texture_indices.is_empty() && !polygon.has_texture() {
        warn!(
            "line {line}: texture indices cover {} of {} vertices, dropping the channel",
            polygon.texture_indices.len(),
            polygon.vertex_indices.len()
        );
        polygon.texture_indices.clear();
    }
    if !polygon.normal_indices.is_empty() && !polygon.has_normals() {
        warn!(
            "line {line}: normal indices cover {} of {} vertices, dropping the channel",
            polygon.normal_indices.len(),
            polygon.vertex_indices.len()
        );
        polygon.normal_indices.clear();
    }
    Some(polygon)
}

/// Parses one `v`, `v/t`, `v/t/n` or `v//n` reference token. Indices are
/// committed to the polygon only if the whole token is valid.
fn parse_face_vertex(mesh: &Mesh, token: &str, polygon: &mut Polygon) -> Result<(), String> {
    let mut parts = token.split('/');
    // split always yields at least one part
    let vertex = resolve_index(parts.next().unwrap_or(""), mesh.positions.len())?;
    let texture = match parts.next() {
        Some("") | None => None,
        Some(t) => Some(resolve_index(t, mesh.tex_coords.len())?),
    };
    let normal = match parts.next() {
        Some("") | None => None,
        Some(n) => Some(resolve_index(n, mesh.normals.len())?),
    };

    polygon.vertex_indices.push(vertex);
    if let Some(t) = texture {
        polygon.texture_indices.push(t);
    }
    if let Some(n) = normal {
        polygon.normal_indices.push(n);
    }
    Ok(())
}

/// Converts a 1-based .obj reference into a 0-based index.
///
/// A reference of 0 is invalid. Negative references are relative to the
/// most recently defined element of the channel, so they resolve against
/// the count parsed so far.
fn resolve_index(raw: &str, len: usize) -> Result<usize, String> {
    let idx: isize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not an integer"))?;
    if idx == 0 {
        return Err("reference 0 is invalid, obj indices start at 1".to_string());
    }
    if idx < 0 {
        let resolved = len as isize + idx;
        if resolved < 0 {
            return Err(format!("relative reference {idx} points before the list start"));
        }
        return Ok(resolved as usize);
    }
    Ok(idx as usize - 1)
}
