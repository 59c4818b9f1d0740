use thiserror::Error;

/// Failures that components recover from locally; none of these are allowed
/// to escape into the render loop as a panic.
#[derive(Debug, Error)]
pub enum Error {
    /// A zero-length vector appeared while orthonormalizing a pointing frame.
    /// Callers substitute [`crate::orientation::OrientationFrame::identity`].
    #[error("degenerate orientation: {step} collapsed to a near-zero vector")]
    DegenerateOrientation { step: &'static str },

    /// Operation on a shadow caster after [`crate::shadow::ShadowCaster::destroy`].
    #[error("shadow caster has been destroyed")]
    Destroyed,

    /// The scene backend could not create a shadow map or post-process stage.
    #[error("failed to create {what}: {reason}")]
    Resource { what: &'static str, reason: String },
}
