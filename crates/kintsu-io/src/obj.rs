//! OBJ (Wavefront) triangle-soup support.
//!
//! Only geometry is handled: `v` lines become vertices and `f` lines become
//! triangles. Normals, texture coordinates, materials, groups and every
//! other tag are ignored on load and never written out, consistent with the
//! pipeline's geometry-only scope.
//!
//! # Accepted input
//!
//! - `v x y z [extra...]` — first 3 numeric tokens are the position; extra
//!   tokens (e.g. vertex color) are ignored.
//! - `f a b c [d...]` — tokens may be bare indices or `index/uv/normal`
//!   composites; only the first slash-delimited component is used. Indices
//!   are 1-based; negative indices count back from the current vertex count.
//!   Faces with more than 3 vertices are fan-triangulated from the first.
//! - Lines with any other tag, comments (`#`) and blank lines are ignored.
//! - Whitespace runs of arbitrary length between tokens are tolerated.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use kintsu_types::{Point3, TriangleMesh, Vertex};
use tracing::debug;

use crate::error::{IoResult, ParseError};

/// Counts returned alongside a successfully loaded mesh, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of vertices parsed.
    pub vertices: usize,
    /// Number of triangles after fan triangulation.
    pub triangles: usize,
}

/// One classified input line.
///
/// The tokenizer produces exactly one tagged variant per line; anything it
/// does not recognize is `Ignored`, never an error, while recognized lines
/// with bad numeric content fail the whole parse.
#[derive(Debug, Clone, PartialEq)]
enum ObjLine {
    /// A `v` line: vertex position.
    Vertex(Point3<f64>),
    /// An `f` line: raw (still 1-based, possibly negative) vertex indices.
    Face(Vec<i64>),
    /// Comment, blank line, or unrecognized tag.
    Ignored,
}

/// Classify a single line of OBJ text.
fn tokenize_line(line: &str, line_no: usize) -> IoResult<ObjLine> {
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("v") => {
            let coords: Vec<&str> = tokens.collect();
            if coords.len() < 3 {
                return Err(ParseError::VertexTooShort {
                    line: line_no,
                    got: coords.len(),
                });
            }

            let mut xyz = [0.0f64; 3];
            for (slot, token) in xyz.iter_mut().zip(&coords) {
                *slot = token
                    .parse::<f64>()
                    .map_err(|_| ParseError::MalformedNumber {
                        line: line_no,
                        token: (*token).to_string(),
                    })?;
            }
            // Extra tokens (vertex color etc.) are deliberately ignored.

            Ok(ObjLine::Vertex(Point3::new(xyz[0], xyz[1], xyz[2])))
        }
        Some("f") => {
            let mut indices = Vec::with_capacity(3);
            for token in tokens {
                // Only the index component of `index/uv/normal` is used.
                let head = token.split('/').next().unwrap_or("");
                let index = head
                    .parse::<i64>()
                    .map_err(|_| ParseError::MalformedNumber {
                        line: line_no,
                        token: token.to_string(),
                    })?;
                indices.push(index);
            }

            if indices.len() < 3 {
                return Err(ParseError::FaceTooShort {
                    line: line_no,
                    got: indices.len(),
                });
            }

            Ok(ObjLine::Face(indices))
        }
        _ => Ok(ObjLine::Ignored),
    }
}

/// Resolve a raw OBJ index against the vertices seen so far.
///
/// OBJ indices are 1-based; negative indices are relative to the end of the
/// current vertex list (`-1` is the most recently read vertex). Zero is
/// never valid.
fn resolve_index(raw: i64, vertex_count: usize, line_no: usize) -> IoResult<u32> {
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        vertex_count as i64 + raw
    } else {
        -1 // index 0 is malformed, fall through to the range check
    };

    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(ParseError::FaceIndexOutOfRange {
            line: line_no,
            index: raw,
            vertex_count,
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Range-checked above; mesh indices are u32 by design
    Ok(resolved as u32)
}

/// Parse an OBJ stream into a mesh.
///
/// # Errors
///
/// Returns a [`ParseError`] on malformed numeric tokens, face indices out
/// of range, faces or vertices with too few components, or input containing
/// no vertex data. No partial mesh is returned on failure.
///
/// # Example
///
/// ```
/// use kintsu_io::parse_obj;
///
/// let src = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
/// let (mesh, stats) = parse_obj(&src[..]).unwrap();
/// assert_eq!(stats.vertices, 3);
/// assert_eq!(stats.triangles, 1);
/// assert_eq!(mesh.faces[0], [0, 1, 2]);
/// ```
pub fn parse_obj<R: BufRead>(reader: R) -> IoResult<(TriangleMesh, LoadStats)> {
    let mut mesh = TriangleMesh::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;

        match tokenize_line(&line, line_no)? {
            ObjLine::Vertex(position) => mesh.vertices.push(Vertex::new(position)),
            ObjLine::Face(raw_indices) => {
                let mut resolved = Vec::with_capacity(raw_indices.len());
                for raw in raw_indices {
                    resolved.push(resolve_index(raw, mesh.vertices.len(), line_no)?);
                }

                // Fan triangulation anchored at the first vertex.
                for w in 1..resolved.len() - 1 {
                    mesh.faces.push([resolved[0], resolved[w], resolved[w + 1]]);
                }
            }
            ObjLine::Ignored => {}
        }
    }

    if mesh.vertices.is_empty() {
        return Err(ParseError::Empty);
    }

    let stats = LoadStats {
        vertices: mesh.vertex_count(),
        triangles: mesh.face_count(),
    };
    debug!(
        vertices = stats.vertices,
        triangles = stats.triangles,
        "parsed OBJ stream"
    );

    Ok((mesh, stats))
}

/// Parse an OBJ byte slice into a mesh.
///
/// Convenience wrapper over [`parse_obj`].
///
/// # Errors
///
/// Same as [`parse_obj`].
pub fn load_obj_bytes(bytes: &[u8]) -> IoResult<(TriangleMesh, LoadStats)> {
    parse_obj(bytes)
}

/// Load a mesh from an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content is not valid
/// OBJ geometry.
///
/// # Example
///
/// ```no_run
/// use kintsu_io::load_obj;
///
/// let (mesh, stats) = load_obj("scan.obj").unwrap();
/// println!("loaded {} triangles", stats.triangles);
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<(TriangleMesh, LoadStats)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ParseError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ParseError::Io(e)
        }
    })?;

    parse_obj(BufReader::new(file))
}

/// Serialize a mesh to OBJ text.
///
/// One `v x y z` line per vertex in buffer order, one `f i j k` line per
/// triangle with 1-based indices. Vertex order is preserved exactly, so
/// repair-appended vertices always follow the original ones. No normals or
/// texture coordinates are written.
///
/// # Example
///
/// ```
/// use kintsu_io::{parse_obj, write_obj};
///
/// let src = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
/// let (mesh, _) = parse_obj(&src[..]).unwrap();
/// let out = write_obj(&mesh);
/// assert_eq!(out, src);
/// ```
#[must_use]
pub fn write_obj(mesh: &TriangleMesh) -> Vec<u8> {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(mesh.vertex_count() * 24 + mesh.face_count() * 12);

    for vertex in &mesh.vertices {
        let p = vertex.position;
        // f64 Display is shortest round-trip, so parse(write(m)) is exact.
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for face in &mesh.faces {
        let _ = writeln!(out, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1);
    }

    out.into_bytes()
}

/// Save a mesh to an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&write_obj(mesh))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(src: &str) -> (TriangleMesh, LoadStats) {
        match parse_obj(src.as_bytes()) {
            Ok(result) => result,
            Err(e) => panic!("parse failed: {e}"),
        }
    }

    #[test]
    fn parses_triangle() {
        let (mesh, stats) = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.triangles, 1);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn tolerates_comments_unknown_tags_and_whitespace() {
        let src = "# a scan\n\nvn 0 0 1\no pot\nv   0.0\t0.0  0.0\nusemtl clay\nv 1 0 0\nv 0 1 0\n  f  1   2  3\n";
        let (mesh, stats) = parse(src);
        assert_eq!(stats.vertices, 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn ignores_extra_vertex_tokens() {
        // Vertex color after the position, as some photogrammetry exports emit
        let (mesh, _) = parse("v 0 0 0 0.8 0.2 0.1\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_relative_eq!(mesh.vertices[0].position.x, 0.0);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn slash_composites_use_first_component() {
        let (mesh, _) = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/4/2 2//3 3/5\n");
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn negative_indices_resolve_against_current_count() {
        let (mesh, _) = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n");
        assert_eq!(mesh.faces[0], [0, 1, 2]);
    }

    #[test]
    fn quad_fan_triangulates() {
        let (mesh, stats) = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert_eq!(stats.triangles, 2);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
        assert_eq!(mesh.faces[1], [0, 2, 3]);
    }

    #[test]
    fn pentagon_fan_triangulates() {
        let src = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let (mesh, stats) = parse(src);
        assert_eq!(stats.triangles, 3);
        assert_eq!(mesh.faces[2], [0, 3, 4]);
    }

    #[test]
    fn malformed_number_fails() {
        let err = parse_obj(&b"v 0 zero 0\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::MalformedNumber { line: 1, .. }));
    }

    #[test]
    fn malformed_face_token_fails() {
        let err = parse_obj(&b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::MalformedNumber { line: 4, .. }));
    }

    #[test]
    fn out_of_range_index_fails() {
        let err = parse_obj(&b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FaceIndexOutOfRange {
                line: 4,
                index: 4,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn zero_index_fails() {
        let err = parse_obj(&b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::FaceIndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn forward_reference_fails() {
        // Face appears before its vertices exist; OBJ resolves at parse time
        let err = parse_obj(&b"f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::FaceIndexOutOfRange { line: 1, .. }));
    }

    #[test]
    fn short_face_fails() {
        let err = parse_obj(&b"v 0 0 0\nv 1 0 0\nf 1 2\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::FaceTooShort { got: 2, .. }));
    }

    #[test]
    fn short_vertex_fails() {
        let err = parse_obj(&b"v 1 2\n"[..]).unwrap_err();
        assert!(matches!(err, ParseError::VertexTooShort { got: 2, .. }));
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(parse_obj(&b""[..]).unwrap_err(), ParseError::Empty));
        assert!(matches!(
            parse_obj(&b"# just a comment\n"[..]).unwrap_err(),
            ParseError::Empty
        ));
    }

    #[test]
    fn vertices_without_faces_load() {
        // A point cloud export is a valid (empty-topology) mesh
        let (mesh, stats) = parse("v 0 0 0\nv 1 1 1\n");
        assert_eq!(stats.vertices, 2);
        assert_eq!(stats.triangles, 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn round_trip_preserves_buffers() {
        let src = "v 0.125 -3.5 10\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 2 3\nf 2 4 3\n";
        let (mesh, _) = parse(src);
        let out = write_obj(&mesh);
        let (again, _) = match parse_obj(&out[..]) {
            Ok(result) => result,
            Err(e) => panic!("reparse failed: {e}"),
        };

        assert_eq!(mesh.faces, again.faces);
        assert_eq!(mesh.vertices.len(), again.vertices.len());
        for (a, b) in mesh.vertices.iter().zip(&again.vertices) {
            assert_relative_eq!(a.position.x, b.position.x);
            assert_relative_eq!(a.position.y, b.position.y);
            assert_relative_eq!(a.position.z, b.position.z);
        }
    }

    #[test]
    fn writer_uses_one_based_indices() {
        let (mesh, _) = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let text = String::from_utf8(write_obj(&mesh)).unwrap();
        assert!(text.ends_with("f 1 2 3\n"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pot.obj");

        let (mesh, _) = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        save_obj(&mesh, &path).unwrap();

        let (loaded, stats) = load_obj(&path).unwrap();
        assert_eq!(stats.triangles, 1);
        assert_eq!(loaded.faces, mesh.faces);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_obj("/no/such/scan.obj").unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }
}
