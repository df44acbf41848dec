//! Edge-to-face adjacency index.
//!
//! The half-edge style lookup every topology query goes through: each
//! undirected edge maps to the faces incident on it, which classifies the
//! edge as boundary, manifold, or non-manifold.

use hashbrown::HashMap;

/// Classification of an edge by incident face count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// Exactly 1 incident face; marks an open hole.
    Boundary,
    /// Exactly 2 incident faces; a valid watertight edge.
    Manifold,
    /// 3 or more incident faces; ambiguous topology for a single surface.
    NonManifold,
}

/// Edge-to-face adjacency for a triangle mesh.
///
/// Built once per mesh in O(faces). The index is keyed by order-independent
/// edges (smaller vertex index first) and must be rebuilt whenever the face
/// buffer changes; the repair engine rebuilds it after vertex splitting.
///
/// Degenerate edges (both endpoints equal, from faces with a repeated
/// vertex) carry no topological meaning and are excluded so they cannot be
/// miscounted as boundary.
///
/// # Example
///
/// ```
/// use kintsu_repair::{EdgeAdjacency, EdgeClass};
///
/// let faces = vec![[0, 1, 2], [1, 3, 2]];
/// let adj = EdgeAdjacency::build(&faces);
///
/// assert_eq!(adj.classify(1, 2), Some(EdgeClass::Manifold));
/// assert_eq!(adj.boundary_edge_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct EdgeAdjacency {
    /// Maps edge (v0, v1) with v0 < v1 to the list of incident face indices.
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
}

impl EdgeAdjacency {
    /// Build the adjacency index from a face buffer.
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            let edges = [
                normalize_edge(face[0], face[1]),
                normalize_edge(face[1], face[2]),
                normalize_edge(face[2], face[0]),
            ];

            for (i, &(a, b)) in edges.iter().enumerate() {
                if a == b {
                    continue; // degenerate, no topological meaning
                }
                // A face with two equal corners yields its one real edge
                // twice; count it once.
                if edges[..i].contains(&(a, b)) {
                    continue;
                }
                edge_to_faces.entry((a, b)).or_default().push(face_idx);
            }
        }

        Self { edge_to_faces }
    }

    /// Get the faces incident on an edge, or `None` if the edge is absent.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&normalize_edge(v0, v1))
            .map(Vec::as_slice)
    }

    /// Number of faces incident on an edge (0 if the edge is absent).
    #[must_use]
    pub fn incident_count(&self, v0: u32, v1: u32) -> usize {
        self.faces_for_edge(v0, v1).map_or(0, <[usize]>::len)
    }

    /// Classify an edge by its incident face count.
    ///
    /// Returns `None` for edges not present in the mesh.
    #[must_use]
    pub fn classify(&self, v0: u32, v1: u32) -> Option<EdgeClass> {
        match self.incident_count(v0, v1) {
            0 => None,
            1 => Some(EdgeClass::Boundary),
            2 => Some(EdgeClass::Manifold),
            _ => Some(EdgeClass::NonManifold),
        }
    }

    /// Iterate over all boundary edges (exactly one incident face).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Count the boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Iterate over all non-manifold edges with their incident faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = ((u32, u32), &[usize])> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, faces)| (edge, faces.as_slice()))
    }

    /// Count the non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// Check that no edge has more than 2 incident faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// Check that no edge has fewer than 2 incident faces.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Total number of distinct (non-degenerate) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }
}

/// Normalize edge direction so v0 < v1.
#[inline]
pub(crate) fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}
