//! Deterministic mesh repair: non-manifold splitting and hole filling.
//!
//! Repair is a pure function from (mesh, defect report) to a new mesh plus
//! a [`RepairSummary`] of what was done. The input mesh is never mutated.
//! Existing vertices keep their indices; repair only appends.
//!
//! Order matters: non-manifold edges are resolved first, because splitting
//! can open new boundary seams that the hole-filling stage must see. When
//! any split occurs, boundary loops are re-extracted from fresh adjacency
//! before filling.

use hashbrown::HashSet;
use kintsu_types::{Point3, TriangleMesh, Vector3, Vertex};
use tracing::{debug, info, warn};

use crate::adjacency::{normalize_edge, EdgeAdjacency};
use crate::defects::{extract_boundary_loops, BoundaryLoop, DefectReport};
use crate::error::{RepairError, RepairResult};

/// Counters describing one repair invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Boundary loops closed with a centroid fan.
    pub holes_filled: usize,
    /// Non-manifold edges resolved by vertex splitting.
    pub edges_split: usize,
    /// Vertices appended (centroids and duplicated split vertices).
    pub vertices_added: usize,
    /// Triangles appended by hole filling.
    pub triangles_added: usize,
    /// Boundary loops skipped because they had fewer than 3 vertices.
    pub degenerate_loops_dropped: usize,
    /// Unclosable boundary walks carried through without repair.
    pub unclosable_skipped: usize,
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "filled {} hole(s), split {} edge(s), added {} vertex(es) and {} triangle(s)",
            self.holes_filled, self.edges_split, self.vertices_added, self.triangles_added
        )
    }
}

/// Repair the defects described by `report`.
///
/// Returns a new mesh; the input is untouched. The output mesh preserves
/// every input vertex at its original index and every input face (possibly
/// rewired onto duplicated vertices by non-manifold splitting).
///
/// # Errors
///
/// Returns [`RepairError::EmptyMesh`] when the mesh has no triangles, and
/// [`RepairError::InvalidIndex`] when a face references a vertex outside
/// the vertex buffer.
///
/// # Example
///
/// ```
/// use kintsu_repair::{classify, repair};
/// use kintsu_types::unit_cube;
///
/// let mut mesh = unit_cube();
/// mesh.faces.pop(); // open a hole
///
/// let report = classify(&mesh);
/// let (repaired, summary) = repair(&mesh, &report).unwrap();
///
/// assert_eq!(summary.holes_filled, 1);
/// assert!(classify(&repaired).is_clean());
/// ```
pub fn repair(
    mesh: &TriangleMesh,
    report: &DefectReport,
) -> RepairResult<(TriangleMesh, RepairSummary)> {
    if mesh.faces.is_empty() {
        return Err(RepairError::EmptyMesh);
    }
    validate_indices(mesh)?;

    let mut out = mesh.clone();
    let mut summary = RepairSummary {
        unclosable_skipped: report.unclosable.len(),
        ..RepairSummary::default()
    };

    split_non_manifold_edges(&mut out, &mut summary);

    // Splitting can open new seams, so the loops in the incoming report
    // are stale once any split happened; re-walk the boundary in that case.
    let loops: Vec<BoundaryLoop> = if summary.edges_split > 0 {
        let adjacency = EdgeAdjacency::build(&out.faces);
        let (loops, unclosable) = extract_boundary_loops(&adjacency, out.vertex_count());
        summary.unclosable_skipped = unclosable.len();
        loops
    } else {
        report.boundary_loops.clone()
    };

    fill_holes(&mut out, &loops, &mut summary);

    info!(%summary, "repair complete");
    Ok((out, summary))
}

fn validate_indices(mesh: &TriangleMesh) -> RepairResult<()> {
    let vertex_count = mesh.vertex_count();
    for face in &mesh.faces {
        for &index in face {
            if index as usize >= vertex_count {
                return Err(RepairError::InvalidIndex {
                    index,
                    vertex_count,
                });
            }
        }
    }
    Ok(())
}

/// Resolve every non-manifold edge by vertex splitting, iterating until the
/// mesh is manifold.
///
/// Each split keeps two incident faces on the original edge and rewires the
/// rest onto a duplicated vertex pair. When more than four faces share an
/// edge, the rewired group can itself be non-manifold on the duplicated
/// edge, so the stage loops; each pass strictly reduces the worst incident
/// count, bounding the iteration.
fn split_non_manifold_edges(mesh: &mut TriangleMesh, summary: &mut RepairSummary) {
    // Each pass splits at least one edge, and a mesh with F faces has at
    // most 3F edges to split.
    let max_passes = mesh.face_count().saturating_mul(3).max(1);

    for _ in 0..max_passes {
        let adjacency = EdgeAdjacency::build(&mesh.faces);
        let mut edges: Vec<((u32, u32), Vec<usize>)> = adjacency
            .non_manifold_edges()
            .map(|(edge, faces)| {
                let mut faces = faces.to_vec();
                faces.sort_unstable();
                (edge, faces)
            })
            .collect();
        if edges.is_empty() {
            return;
        }
        edges.sort_unstable_by_key(|(edge, _)| *edge);

        for (edge, faces) in edges {
            // An earlier split in this pass may have rewired some of these
            // faces off the edge; keep only the ones still incident. Edges
            // that dropped to manifold are left for the rebuilt adjacency
            // of the next pass to confirm.
            let still_incident: Vec<usize> = faces
                .into_iter()
                .filter(|&f| face_has_edge(mesh.faces[f], edge))
                .collect();
            if still_incident.len() > 2 {
                split_one_edge(mesh, edge, &still_incident, summary);
            }
        }
    }
    warn!("non-manifold splitting did not converge within the pass ceiling");
}

/// Split a single non-manifold edge.
///
/// The incident faces are partitioned into a group that keeps the original
/// edge and a group rewired onto freshly duplicated endpoints. Grouping
/// follows local connectivity: faces that share an edge other than the
/// split edge stay together, so a coherent sheet is never torn apart.
fn split_one_edge(
    mesh: &mut TriangleMesh,
    edge: (u32, u32),
    faces: &[usize],
    summary: &mut RepairSummary,
) {
    let components = connectivity_components(&mesh.faces, edge, faces);

    // The first components (by smallest face index) keep the original
    // edge until they hold at least 2 faces; everything after is rewired.
    let mut keep: Vec<usize> = Vec::new();
    let mut rewire: Vec<usize> = Vec::new();
    for component in components {
        if keep.len() < 2 {
            keep.extend(component);
        } else {
            rewire.extend(component);
        }
    }
    if rewire.is_empty() {
        // One fused sheet: keep the first two faces, peel off the rest.
        rewire = keep.split_off(2);
    }
    if rewire.is_empty() {
        return;
    }

    let (u, v) = edge;
    let new_u = append_duplicate(mesh, u);
    let new_v = append_duplicate(mesh, v);
    summary.vertices_added += 2;
    summary.edges_split += 1;

    for &face_idx in &rewire {
        for slot in &mut mesh.faces[face_idx] {
            if *slot == u {
                *slot = new_u;
            } else if *slot == v {
                *slot = new_v;
            }
        }
    }

    debug!(
        ?edge,
        kept = keep.len(),
        rewired = rewire.len(),
        "split non-manifold edge"
    );
}

/// Group the faces incident on `edge` by shared edges other than `edge`
/// itself. Components come out sorted by their smallest face index, each
/// component's faces in ascending order.
fn connectivity_components(
    all_faces: &[[u32; 3]],
    edge: (u32, u32),
    incident: &[usize],
) -> Vec<Vec<usize>> {
    let mut remaining: Vec<usize> = incident.to_vec();
    remaining.sort_unstable();

    let mut components = Vec::new();
    let mut assigned: HashSet<usize> = HashSet::new();

    for &seed in &remaining {
        if assigned.contains(&seed) {
            continue;
        }
        let mut component = vec![seed];
        assigned.insert(seed);

        let mut frontier = vec![seed];
        while let Some(current) = frontier.pop() {
            for &other in &remaining {
                if assigned.contains(&other) {
                    continue;
                }
                if shares_other_edge(all_faces[current], all_faces[other], edge) {
                    assigned.insert(other);
                    component.push(other);
                    frontier.push(other);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components
}

fn face_has_edge(face: [u32; 3], edge: (u32, u32)) -> bool {
    [
        normalize_edge(face[0], face[1]),
        normalize_edge(face[1], face[2]),
        normalize_edge(face[2], face[0]),
    ]
    .contains(&edge)
}

/// True when two faces share an undirected edge other than `excluded`.
fn shares_other_edge(a: [u32; 3], b: [u32; 3], excluded: (u32, u32)) -> bool {
    let edges_of = |f: [u32; 3]| {
        [
            normalize_edge(f[0], f[1]),
            normalize_edge(f[1], f[2]),
            normalize_edge(f[2], f[0]),
        ]
    };
    let b_edges = edges_of(b);
    edges_of(a)
        .into_iter()
        .any(|e| e != excluded && b_edges.contains(&e))
}

fn append_duplicate(mesh: &mut TriangleMesh, vertex: u32) -> u32 {
    let position = mesh.vertices[vertex as usize].position;
    mesh.vertices.push(Vertex::new(position));
    #[allow(clippy::cast_possible_truncation)]
    let new_index = (mesh.vertex_count() - 1) as u32;
    new_index
}

/// Close every fillable boundary loop with a centroid fan.
///
/// One centroid vertex per loop, one triangle per boundary edge. Fan
/// triangles are wound opposite to the directed boundary edge in the
/// surrounding face, so the patch orientation matches its neighborhood.
fn fill_holes(mesh: &mut TriangleMesh, loops: &[BoundaryLoop], summary: &mut RepairSummary) {
    if loops.is_empty() {
        return;
    }
    // One adjacency lookup table for all loops; the loops' edges are
    // disjoint, so patches for one loop never affect another's lookups.
    let adjacency = EdgeAdjacency::build(&mesh.faces);

    for boundary_loop in loops {
        if !boundary_loop.is_fillable() {
            summary.degenerate_loops_dropped += 1;
            warn!(
                vertices = boundary_loop.vertices.len(),
                "dropped degenerate boundary loop"
            );
            continue;
        }

        let centroid = loop_centroid(mesh, &boundary_loop.vertices);
        mesh.vertices.push(Vertex::new(centroid));
        #[allow(clippy::cast_possible_truncation)]
        let center = (mesh.vertex_count() - 1) as u32;
        summary.vertices_added += 1;

        let ring = &boundary_loop.vertices;
        for i in 0..ring.len() {
            let u = ring[i];
            let w = ring[(i + 1) % ring.len()];
            let face = patch_triangle(mesh, &adjacency, u, w, center);
            mesh.faces.push(face);
            summary.triangles_added += 1;
        }
        summary.holes_filled += 1;
    }

    debug!(holes = summary.holes_filled, "hole filling done");
}

fn loop_centroid(mesh: &TriangleMesh, ring: &[u32]) -> Point3<f64> {
    let mut sum = Vector3::zeros();
    for &index in ring {
        sum += mesh.vertices[index as usize].position.coords;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = ring.len() as f64;
    Point3::from(sum / n)
}

/// Build the patch triangle for boundary edge (u, w), winding it against
/// the edge's direction in the single incident face.
fn patch_triangle(
    mesh: &TriangleMesh,
    adjacency: &EdgeAdjacency,
    u: u32,
    w: u32,
    center: u32,
) -> [u32; 3] {
    let incident = adjacency
        .faces_for_edge(u, w)
        .and_then(|faces| faces.first().copied());

    if let Some(face_idx) = incident {
        let f = mesh.faces[face_idx];
        let directed = [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])];
        if directed.contains(&(u, w)) {
            return [w, u, center];
        }
    }
    [u, w, center]
}
