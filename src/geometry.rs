//! Static full-screen quad with selectable UV orientation.
//!
//! Camera frames arrive top-row-first while GL samples bottom-row-first, and
//! front cameras are usually shown mirrored. Rather than patching that up in
//! every shader, each pass draws with a quad whose UVs already point the right
//! way.

use serde::Deserialize;

/// Floats per vertex: `x, y, u, v`.
pub const VERTEX_STRIDE: usize = 4;
pub const QUAD_VERTEX_COUNT: usize = 6;

const POSITIONS: [[f32; 2]; QUAD_VERTEX_COUNT] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvOrientation {
    #[default]
    Identity,
    FlipY,
    /// Horizontal mirror, the usual "selfie" view.
    FlipX,
    Rotate180,
    Rotate90,
    Rotate270,
}

impl UvOrientation {
    /// Maps an identity UV to this orientation's UV.
    pub fn apply(self, [u, v]: [f32; 2]) -> [f32; 2] {
        match self {
            UvOrientation::Identity => [u, v],
            UvOrientation::FlipY => [u, 1.0 - v],
            UvOrientation::FlipX => [1.0 - u, v],
            UvOrientation::Rotate180 => [1.0 - u, 1.0 - v],
            UvOrientation::Rotate90 => [1.0 - v, u],
            UvOrientation::Rotate270 => [v, 1.0 - u],
        }
    }

    /// Whether the sampled image is transposed, i.e. width and height trade
    /// places as far as aspect correction is concerned.
    pub fn swaps_axes(self) -> bool {
        matches!(self, UvOrientation::Rotate90 | UvOrientation::Rotate270)
    }
}

/// Interleaved vertex data for the two triangles of a full-screen quad.
pub fn quad_vertices(orientation: UvOrientation) -> [f32; QUAD_VERTEX_COUNT * VERTEX_STRIDE] {
    let mut out = [0.0; QUAD_VERTEX_COUNT * VERTEX_STRIDE];
    for (i, [x, y]) in POSITIONS.iter().copied().enumerate() {
        // clip space [-1, 1] -> texture space [0, 1]
        let [u, v] = orientation.apply([(x + 1.0) * 0.5, (y + 1.0) * 0.5]);
        out[i * VERTEX_STRIDE..(i + 1) * VERTEX_STRIDE].copy_from_slice(&[x, y, u, v]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv_at(verts: &[f32], i: usize) -> [f32; 2] {
        [verts[i * VERTEX_STRIDE + 2], verts[i * VERTEX_STRIDE + 3]]
    }

    #[test]
    fn identity_maps_corners_to_corners() {
        let v = quad_vertices(UvOrientation::Identity);
        assert_eq!(uv_at(&v, 0), [0.0, 0.0]);
        assert_eq!(uv_at(&v, 5), [1.0, 1.0]);
    }

    #[test]
    fn flip_y_swaps_top_and_bottom() {
        let v = quad_vertices(UvOrientation::FlipY);
        // bottom-left vertex samples the top-left texel
        assert_eq!(uv_at(&v, 0), [0.0, 1.0]);
        assert_eq!(uv_at(&v, 5), [1.0, 0.0]);
    }

    #[test]
    fn quarter_turns_compose_to_half_turn() {
        for uv in [[0.0, 0.0], [0.25, 0.75], [1.0, 0.5]] {
            let twice = UvOrientation::Rotate90.apply(UvOrientation::Rotate90.apply(uv));
            assert_eq!(twice, UvOrientation::Rotate180.apply(uv));
            let back = UvOrientation::Rotate270.apply(UvOrientation::Rotate90.apply(uv));
            assert_eq!(back, uv);
        }
    }

    #[test]
    fn positions_cover_clip_space() {
        let v = quad_vertices(UvOrientation::FlipX);
        let xs: Vec<f32> = (0..QUAD_VERTEX_COUNT).map(|i| v[i * VERTEX_STRIDE]).collect();
        assert!(xs.contains(&-1.0) && xs.contains(&1.0));
        assert!(!UvOrientation::FlipX.swaps_axes());
        assert!(UvOrientation::Rotate270.swaps_axes());
    }
}
