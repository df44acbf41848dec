//! Defect classification: boundary loops and non-manifold sites.
//!
//! Consumes the [`EdgeAdjacency`] index and produces a [`DefectReport`]
//! describing every hole (closed boundary loop) and every non-manifold edge
//! in a mesh. The report drives the repair engine; it is transient and never
//! persisted beyond one repair invocation.

use hashbrown::{HashMap, HashSet};
use kintsu_types::TriangleMesh;
use tracing::{debug, warn};

use crate::adjacency::{normalize_edge, EdgeAdjacency};

/// A closed boundary loop: a hole in the mesh surface.
///
/// Holds the ordered, cyclic sequence of vertex indices visited while
/// walking the loop's boundary edges. Pure topology; the geometry lives in
/// the mesh the indices reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered vertex indices; the last connects back to the first.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (equal to the number of vertex entries) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// A loop needs at least 3 vertices to bound any surface.
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        self.vertices.len() >= 3
    }
}

/// A non-manifold edge recorded verbatim with its incident faces.
///
/// No pairing decision is made at classification time; choosing how to
/// split the incident faces belongs to the repair engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonManifoldEdge {
    /// The edge key (smaller vertex index first).
    pub edge: (u32, u32),
    /// Indices of all incident faces, in ascending order.
    pub faces: Vec<usize>,
}

impl NonManifoldEdge {
    /// Number of faces incident on the edge (always >= 3).
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.faces.len()
    }
}

/// A boundary walk that could not close.
///
/// Indicates a malformed or open surface. Recoverable: repair skips the
/// site and carries it forward in the summary instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclosableBoundary {
    /// The boundary edge the walk started from.
    pub start: (u32, u32),
    /// Number of boundary edges in the unclosed trail when the walk gave
    /// up, not counting any pinch-point loops it closed along the way.
    pub edges_walked: usize,
}

/// Everything the classifier found wrong with a mesh.
#[derive(Debug, Clone, Default)]
pub struct DefectReport {
    /// Closed boundary loops (holes), in deterministic extraction order.
    pub boundary_loops: Vec<BoundaryLoop>,
    /// Non-manifold edges, sorted by edge key.
    pub non_manifold_edges: Vec<NonManifoldEdge>,
    /// Boundary walks that failed to close.
    pub unclosable: Vec<UnclosableBoundary>,
}

impl DefectReport {
    /// True when the mesh has no holes, no non-manifold edges, and no
    /// unclosable boundaries.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.boundary_loops.is_empty()
            && self.non_manifold_edges.is_empty()
            && self.unclosable.is_empty()
    }
}

impl std::fmt::Display for DefectReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hole(s), {} non-manifold edge(s), {} unclosable boundary walk(s)",
            self.boundary_loops.len(),
            self.non_manifold_edges.len(),
            self.unclosable.len()
        )
    }
}

/// Classify all topological defects in a mesh.
///
/// Builds the adjacency index internally; use [`classify_with_adjacency`]
/// when one is already at hand.
///
/// # Example
///
/// ```
/// use kintsu_types::{TriangleMesh, Vertex};
/// use kintsu_repair::classify;
///
/// let mut mesh = TriangleMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// // A lone triangle is one 3-edge boundary loop
/// let report = classify(&mesh);
/// assert_eq!(report.boundary_loops.len(), 1);
/// assert_eq!(report.boundary_loops[0].edge_count(), 3);
/// ```
#[must_use]
pub fn classify(mesh: &TriangleMesh) -> DefectReport {
    let adjacency = EdgeAdjacency::build(&mesh.faces);
    classify_with_adjacency(mesh, &adjacency)
}

/// Classify defects using a pre-built adjacency index.
///
/// The index must have been built from `mesh.faces`; a stale index produces
/// a report about a mesh that no longer exists.
#[must_use]
pub fn classify_with_adjacency(mesh: &TriangleMesh, adjacency: &EdgeAdjacency) -> DefectReport {
    let (boundary_loops, unclosable) = extract_boundary_loops(adjacency, mesh.vertex_count());

    let mut non_manifold_edges: Vec<NonManifoldEdge> = adjacency
        .non_manifold_edges()
        .map(|(edge, faces)| {
            let mut faces = faces.to_vec();
            faces.sort_unstable();
            NonManifoldEdge { edge, faces }
        })
        .collect();
    non_manifold_edges.sort_unstable_by_key(|nm| nm.edge);

    let report = DefectReport {
        boundary_loops,
        non_manifold_edges,
        unclosable,
    };
    debug!(%report, "classified mesh defects");
    report
}

/// Walk all boundary edges into closed loops.
///
/// Deterministic: start edges are visited in sorted order and, at every
/// vertex, the next boundary edge is the unconsumed one with the smallest
/// adjacent vertex index.
///
/// Loops through pinch vertices terminate independently: when the walk
/// reaches a vertex already in the current trail, the cycle walked since
/// the first visit closes there as its own loop and the walk resumes at
/// the pinch. Without this, two holes meeting at a vertex would merge
/// into one figure-eight whose centroid fan is non-manifold.
///
/// Each trail is bounded by `max_steps` (the mesh vertex count); a walk
/// that cannot close within the ceiling, or dead-ends, is returned as an
/// [`UnclosableBoundary`] instead of looping forever on corrupt input.
pub(crate) fn extract_boundary_loops(
    adjacency: &EdgeAdjacency,
    max_steps: usize,
) -> (Vec<BoundaryLoop>, Vec<UnclosableBoundary>) {
    let mut boundary: Vec<(u32, u32)> = adjacency.boundary_edges().collect();
    boundary.sort_unstable();

    if boundary.is_empty() {
        return (Vec::new(), Vec::new());
    }
    debug!("found {} boundary edges", boundary.len());

    let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(a, b) in &boundary {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }
    for adjacent in neighbors.values_mut() {
        adjacent.sort_unstable();
    }

    let mut consumed: HashSet<(u32, u32)> = HashSet::new();
    let mut loops = Vec::new();
    let mut unclosable = Vec::new();

    for &(start_a, start_b) in &boundary {
        if consumed.contains(&(start_a, start_b)) {
            continue;
        }
        consumed.insert((start_a, start_b));

        let mut vertices = vec![start_a];
        let mut position: HashMap<u32, usize> = HashMap::new();
        position.insert(start_a, 0);
        let mut current = start_b;
        let mut steps = 1usize;

        let closed = loop {
            if current == start_a {
                break true;
            }

            // Pinch vertex revisited mid-trail: close the cycle walked
            // since its first visit as its own loop and resume here.
            if let Some(&at) = position.get(&current) {
                let pinched = vertices.split_off(at);
                for v in &pinched {
                    position.remove(v);
                }
                steps -= pinched.len();
                loops.push(BoundaryLoop { vertices: pinched });
            }

            position.insert(current, vertices.len());
            vertices.push(current);

            if steps >= max_steps {
                break false;
            }

            let next = neighbors.get(&current).and_then(|adjacent| {
                adjacent
                    .iter()
                    .copied()
                    .find(|&n| !consumed.contains(&normalize_edge(current, n)))
            });

            match next {
                Some(n) => {
                    consumed.insert(normalize_edge(current, n));
                    current = n;
                    steps += 1;
                }
                None => break false,
            }
        };

        if closed {
            loops.push(BoundaryLoop { vertices });
        } else {
            warn!(
                start = ?(start_a, start_b),
                edges_walked = steps,
                "boundary walk did not close"
            );
            unclosable.push(UnclosableBoundary {
                start: (start_a, start_b),
                edges_walked: steps,
            });
        }
    }

    (loops, unclosable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kintsu_types::{unit_cube, Vertex};

    fn open_cube() -> TriangleMesh {
        // Unit cube with the top face's 2 triangles removed: one square hole
        let mut mesh = unit_cube();
        mesh.faces.retain(|&f| f != [4, 5, 6] && f != [4, 6, 7]);
        assert_eq!(mesh.face_count(), 10);
        mesh
    }

    #[test]
    fn closed_cube_is_clean() {
        let report = classify(&unit_cube());
        assert!(report.is_clean());
    }

    #[test]
    fn open_cube_has_one_square_hole() {
        let report = classify(&open_cube());

        assert_eq!(report.boundary_loops.len(), 1);
        assert_eq!(report.boundary_loops[0].edge_count(), 4);
        assert!(report.non_manifold_edges.is_empty());
        assert!(report.unclosable.is_empty());

        // The loop visits exactly the top-face vertices
        let mut on_loop = report.boundary_loops[0].vertices.clone();
        on_loop.sort_unstable();
        assert_eq!(on_loop, vec![4, 5, 6, 7]);
    }

    #[test]
    fn lone_triangle_is_one_loop() {
        let mut mesh = TriangleMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let report = classify(&mesh);
        assert_eq!(report.boundary_loops.len(), 1);
        assert_eq!(report.boundary_loops[0].edge_count(), 3);
    }

    #[test]
    fn book_reports_non_manifold_edge_verbatim() {
        let mut mesh = TriangleMesh::new();
        for coords in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.5, 1.0, 0.0],
            [0.5, -1.0, 0.0],
            [0.5, 0.0, 1.0],
        ] {
            mesh.vertices
                .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 1, 3]);
        mesh.faces.push([0, 1, 4]);

        let report = classify(&mesh);
        assert_eq!(report.non_manifold_edges.len(), 1);
        let nm = &report.non_manifold_edges[0];
        assert_eq!(nm.edge, (0, 1));
        assert_eq!(nm.faces, vec![0, 1, 2]);
        assert_eq!(nm.incident_count(), 3);
    }

    #[test]
    fn two_separate_holes_are_two_loops() {
        // Two disjoint lone triangles
        let mut mesh = TriangleMesh::new();
        for coords in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 0.0, 0.0],
            [6.0, 0.0, 0.0],
            [5.0, 1.0, 0.0],
        ] {
            mesh.vertices
                .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([3, 4, 5]);

        let report = classify(&mesh);
        assert_eq!(report.boundary_loops.len(), 2);
    }

    #[test]
    fn pinch_vertex_yields_independent_loops() {
        // Two triangles touching only at vertex 0: a figure-eight boundary.
        // The tie-break (smallest unconsumed neighbor) must terminate each
        // loop independently instead of merging them.
        let mut mesh = TriangleMesh::new();
        for coords in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
        ] {
            mesh.vertices
                .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 3, 4]);

        let report = classify(&mesh);
        assert_eq!(report.boundary_loops.len(), 2);
        for boundary_loop in &report.boundary_loops {
            assert_eq!(boundary_loop.edge_count(), 3);
        }
        assert!(report.unclosable.is_empty());
    }

    #[test]
    fn pinch_vertex_mid_walk_splits_loops() {
        // Two triangles touching only at vertex 2, arranged so the walk
        // reaches the pinch mid-trail rather than at its start anchor.
        // The cycle through the pinch must close as its own loop instead
        // of merging both holes into one figure-eight.
        let mut mesh = TriangleMesh::new();
        for coords in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 0.0, 0.0],
            [2.5, 1.0, 0.0],
            [1.5, 1.0, 0.0],
        ] {
            mesh.vertices
                .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
        }
        mesh.faces.push([1, 2, 5]);
        mesh.faces.push([2, 3, 4]);

        let report = classify(&mesh);
        assert_eq!(report.boundary_loops.len(), 2);
        for boundary_loop in &report.boundary_loops {
            assert_eq!(boundary_loop.edge_count(), 3);
        }
        assert!(report.unclosable.is_empty());

        let mut rings: Vec<Vec<u32>> = report
            .boundary_loops
            .iter()
            .map(|l| {
                let mut ring = l.vertices.clone();
                ring.sort_unstable();
                ring
            })
            .collect();
        rings.sort();
        assert_eq!(rings, vec![vec![1, 2, 5], vec![2, 3, 4]]);
    }

    #[test]
    fn classification_is_deterministic() {
        let mesh = open_cube();
        let a = classify(&mesh);
        let b = classify(&mesh);
        assert_eq!(a.boundary_loops, b.boundary_loops);
        assert_eq!(a.non_manifold_edges, b.non_manifold_edges);
    }

    #[test]
    fn empty_mesh_report_is_clean() {
        let report = classify(&TriangleMesh::new());
        assert!(report.is_clean());
    }

    #[test]
    fn report_display() {
        let report = classify(&open_cube());
        let text = format!("{report}");
        assert!(text.contains("1 hole(s)"));
        assert!(text.contains("0 unclosable"));
    }
}
