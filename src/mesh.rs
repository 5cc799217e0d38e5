//! # Mesh Generator
//!
//! Procedural meshes for the two scenes this crate draws:
//!
//! - [`generate_sphere`]: a UV-sphere built from latitude and longitude bands, with a line-list
//!   index buffer that draws it as a wireframe grid.
//! - [`generate_height_field`]: a grid of quads whose heights are sampled from a scalar
//!   function of two variables, such as the radial [`hat`] function.
//!
//! Generators are pure functions. They validate their arguments up front and return
//! [`SceneError::InvalidMesh`] instead of producing degenerate or NaN-filled buffers.

use std::f32::consts::PI;

use crate::error::SceneError;
use crate::vertex::Vertex;

/// Vertex and index data for one procedural surface.
///
/// `line_indices` is a line list (pairs of vertex indices). `triangle_indices` is a triangle
/// list and is empty for meshes that are only drawn as wireframes.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub line_indices: Vec<u32>,
    pub triangle_indices: Vec<u32>,
}

impl Mesh {
    /// Positions as one flat `[x, y, z, w, x, y, z, w, ...]` array for the graphics context.
    pub fn flattened_positions(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|vertex| vertex.position)
            .collect()
    }

    /// Whether the mesh can be drawn filled.
    pub fn has_triangles(&self) -> bool {
        !self.triangle_indices.is_empty()
    }
}

/// Builds a UV-sphere of `radius` with `lat_bands` latitude bands and `long_bands` longitude
/// bands.
///
/// Latitude θ runs from 0 (north pole, +Y) to π over `lat_bands + 1` rows; longitude φ runs
/// from 0 to 2π over `long_bands + 1` columns. The last column duplicates the first one at the
/// seam rather than wrapping indices, so the vertex count is
/// `(lat_bands + 1) * (long_bands + 1)`.
///
/// The line indices connect every grid corner to its neighbor along the same latitude and to
/// its neighbor one band further south. No triangles are generated.
pub fn generate_sphere(radius: f32, lat_bands: u32, long_bands: u32) -> Result<Mesh, SceneError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(SceneError::InvalidMesh(format!(
            "sphere radius must be a positive finite number, got {radius}"
        )));
    }
    if lat_bands == 0 || long_bands == 0 {
        return Err(SceneError::InvalidMesh(format!(
            "sphere needs at least one latitude and one longitude band, got {lat_bands}x{long_bands}"
        )));
    }

    let columns = long_bands as u64 + 1;
    let vertex_count = (lat_bands as u64 + 1) * columns;
    if vertex_count > u32::MAX as u64 {
        return Err(SceneError::InvalidMesh(format!(
            "sphere with {lat_bands}x{long_bands} bands has {vertex_count} vertices, more than a u32 index buffer can address"
        )));
    }

    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for lat in 0..=lat_bands {
        let theta = lat as f32 * PI / lat_bands as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for lon in 0..=long_bands {
            let phi = lon as f32 * 2.0 * PI / long_bands as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            vertices.push(Vertex::new(
                radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            ));
        }
    }

    let columns = columns as u32;
    let mut line_indices = Vec::with_capacity(4 * lat_bands as usize * long_bands as usize);
    for lat in 0..lat_bands {
        for lon in 0..long_bands {
            let first = lat * columns + lon;
            let second = first + columns;
            // along the latitude, then down to the next band
            line_indices.extend_from_slice(&[first, first + 1, first, second]);
        }
    }

    Ok(Mesh {
        vertices,
        line_indices,
        triangle_indices: Vec::new(),
    })
}

/// Samples `f(x, y)` on a `rows` × `cols` grid and emits one quad of four vertices per cell.
///
/// Grid index `i` maps to `x = π(4i/rows − 2)` and `j` to `y = π(4j/cols − 2)`, so the
/// function sees the domain `[−2π, 2π)`. The quad for cell `(i, j)` is placed at
/// `(2i/rows − 1, f, 2j/cols − 1)` with the sampled value as height (the Y axis), giving
/// `4 * (rows − 1) * (cols − 1)` vertices.
///
/// Each quad gets two triangles (`q, q+1, q+2` and `q, q+2, q+3`) for the filled surface and
/// a closed outline of four line segments.
pub fn generate_height_field<F>(rows: u32, cols: u32, f: F) -> Result<Mesh, SceneError>
where
    F: Fn(f32, f32) -> f32,
{
    if rows < 2 || cols < 2 {
        return Err(SceneError::InvalidMesh(format!(
            "height field needs at least a 2x2 grid, got {rows}x{cols}"
        )));
    }

    let cells = (rows as u64 - 1) * (cols as u64 - 1);
    if cells * 4 > u32::MAX as u64 {
        return Err(SceneError::InvalidMesh(format!(
            "height field of {rows}x{cols} has too many vertices for a u32 index buffer"
        )));
    }

    let mut heights = Vec::with_capacity(rows as usize * cols as usize);
    for i in 0..rows {
        let x = PI * (4.0 * i as f32 / rows as f32 - 2.0);
        for j in 0..cols {
            let y = PI * (4.0 * j as f32 / cols as f32 - 2.0);
            let z = f(x, y);
            if !z.is_finite() {
                return Err(SceneError::InvalidMesh(format!(
                    "height function returned {z} at ({x}, {y})"
                )));
            }
            heights.push(z);
        }
    }

    let height = |i: u32, j: u32| heights[(i * cols + j) as usize];
    let grid_x = |i: u32| 2.0 * i as f32 / rows as f32 - 1.0;
    let grid_z = |j: u32| 2.0 * j as f32 / cols as f32 - 1.0;

    let cells = cells as usize;
    let mut vertices = Vec::with_capacity(cells * 4);
    let mut triangle_indices = Vec::with_capacity(cells * 6);
    let mut line_indices = Vec::with_capacity(cells * 8);

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let q = vertices.len() as u32;
            vertices.push(Vertex::new(grid_x(i), height(i, j), grid_z(j)));
            vertices.push(Vertex::new(grid_x(i + 1), height(i + 1, j), grid_z(j)));
            vertices.push(Vertex::new(grid_x(i + 1), height(i + 1, j + 1), grid_z(j + 1)));
            vertices.push(Vertex::new(grid_x(i), height(i, j + 1), grid_z(j + 1)));

            triangle_indices.extend_from_slice(&[q, q + 1, q + 2, q, q + 2, q + 3]);
            line_indices.extend_from_slice(&[q, q + 1, q + 1, q + 2, q + 2, q + 3, q + 3, q]);
        }
    }

    Ok(Mesh {
        vertices,
        line_indices,
        triangle_indices,
    })
}

/// The radial hat function `sin(r) / r` with `r = √(x² + y²)`.
///
/// Returns exactly `1.0` at the origin, the limit of the function there.
pub fn hat(x: f32, y: f32) -> f32 {
    let r = (x * x + y * y).sqrt();
    if r == 0.0 {
        1.0
    } else {
        r.sin() / r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn sphere_vertex_count_and_radius() {
        let mesh = generate_sphere(2.5, 7, 11).unwrap();
        assert_eq!(mesh.vertices.len(), 8 * 12);
        for vertex in &mesh.vertices {
            assert!((vertex.xyz().norm() - 2.5).abs() < EPS);
            assert_eq!(vertex.position[3], 1.0);
        }
    }

    #[test]
    fn sphere_north_pole_collapses() {
        let mesh = generate_sphere(1.0, 1, 4).unwrap();
        for vertex in &mesh.vertices[..5] {
            assert_eq!(vertex.position, [0.0, 1.0, 0.0, 1.0]);
        }
        // south pole row
        for vertex in &mesh.vertices[5..] {
            assert!((vertex.position[1] + 1.0).abs() < EPS);
        }
    }

    #[test]
    fn sphere_seam_duplicates_first_column() {
        let mesh = generate_sphere(1.0, 4, 6).unwrap();
        let columns = 7;
        for lat in 0..=4 {
            let first = mesh.vertices[lat * columns].xyz();
            let last = mesh.vertices[lat * columns + 6].xyz();
            assert!((first - last).norm() < EPS);
        }
    }

    #[test]
    fn sphere_line_indices_form_grid() {
        let mesh = generate_sphere(1.0, 2, 3).unwrap();
        assert_eq!(mesh.line_indices.len(), 4 * 2 * 3);
        assert_eq!(&mesh.line_indices[..4], &[0, 1, 0, 4]);
        assert!(mesh
            .line_indices
            .iter()
            .all(|&index| (index as usize) < mesh.vertices.len()));
        assert!(!mesh.has_triangles());
    }

    #[test]
    fn sphere_rejects_bad_parameters() {
        assert!(matches!(generate_sphere(0.0, 4, 4), Err(SceneError::InvalidMesh(_))));
        assert!(matches!(generate_sphere(-1.0, 4, 4), Err(SceneError::InvalidMesh(_))));
        assert!(matches!(generate_sphere(f32::NAN, 4, 4), Err(SceneError::InvalidMesh(_))));
        assert!(matches!(generate_sphere(1.0, 0, 4), Err(SceneError::InvalidMesh(_))));
        assert!(matches!(generate_sphere(1.0, 4, 0), Err(SceneError::InvalidMesh(_))));
    }

    #[test]
    fn hat_is_defined_at_origin() {
        assert_eq!(hat(0.0, 0.0), 1.0);
        assert!((hat(PI, 0.0)).abs() < EPS);
        assert!((hat(0.0, PI / 2.0) - 2.0 / PI).abs() < EPS);
    }

    #[test]
    fn height_field_samples_origin_without_nan() {
        let mesh = generate_height_field(50, 50, hat).unwrap();
        assert_eq!(mesh.vertices.len(), 4 * 49 * 49);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.is_finite())));

        // grid index 25 of 50 maps to both x = 0 in the function domain and 0 in model space
        let origin = mesh
            .vertices
            .iter()
            .find(|v| v.position[0] == 0.0 && v.position[2] == 0.0)
            .expect("grid samples the origin");
        assert_eq!(origin.position[1], 1.0);
    }

    #[test]
    fn height_field_quads_and_indices() {
        let mesh = generate_height_field(3, 4, |x, y| x + y).unwrap();
        let cells = 2 * 3;
        assert_eq!(mesh.vertices.len(), cells * 4);
        assert_eq!(mesh.triangle_indices.len(), cells * 6);
        assert_eq!(mesh.line_indices.len(), cells * 8);
        assert_eq!(&mesh.triangle_indices[6..12], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(&mesh.line_indices[..8], &[0, 1, 1, 2, 2, 3, 3, 0]);

        // first quad corners
        assert_eq!(mesh.vertices[0].position[0], -1.0);
        assert_eq!(mesh.vertices[0].position[2], -1.0);
        assert!((mesh.vertices[1].position[0] - (2.0 / 3.0 - 1.0)).abs() < EPS);
        assert!((mesh.vertices[3].position[2] - (2.0 / 4.0 - 1.0)).abs() < EPS);
        // height at (i, j) = (0, 0) is f(-2π, -2π)
        assert!((mesh.vertices[0].position[1] + 4.0 * PI).abs() < 1e-4);
    }

    #[test]
    fn height_field_rejects_small_grid_and_nan() {
        assert!(matches!(
            generate_height_field(1, 10, hat),
            Err(SceneError::InvalidMesh(_))
        ));
        assert!(matches!(
            generate_height_field(10, 10, |x, y| (x * y).sqrt() / 0.0),
            Err(SceneError::InvalidMesh(_))
        ));
    }

    #[test]
    fn flattened_positions_are_interleaved() {
        let mesh = generate_sphere(1.0, 1, 1).unwrap();
        let flat = mesh.flattened_positions();
        assert_eq!(flat.len(), mesh.vertices.len() * 4);
        assert_eq!(&flat[..4], &mesh.vertices[0].position);
    }
}
