//! # Errors
//!
//! A single error enum covers every failure the scene core and its GPU adapter can report.
//! Mesh, camera, and projection preconditions fail fast with a descriptive message; nothing
//! in this crate retries.

/// Errors produced while building meshes, computing frames, loading configuration, or
/// initializing the graphics context.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A mesh generator was called with parameters that cannot produce a valid mesh.
    #[error("invalid mesh parameters: {0}")]
    InvalidMesh(String),

    /// Projection parameters violate their invariants (e.g. `near >= far`).
    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    /// The look-at basis cannot be built: eye equals target, the up vector is zero, or it is
    /// parallel to the view direction.
    #[error("degenerate camera: {0}")]
    DegenerateCamera(String),

    /// An input hook or frame driver argument was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No adapter, device, or surface could be obtained from the host.
    #[error("graphics context unavailable: {0}")]
    GraphicsUnavailable(String),

    /// More draw calls were submitted than there are uniform slots.
    #[error("uniform capacity exceeded: {requested} draws requested, {capacity} slots available")]
    UniformCapacity { requested: usize, capacity: usize },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unknown scene preset: {0}")]
    UnknownPreset(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
