//! Rasterizer errors.

use alert_common::AlertMapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("View bounds are empty or not finite")]
    DegenerateView,

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for AlertMapError {
    fn from(err: RenderError) -> Self {
        AlertMapError::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_common::FailureScope;

    #[test]
    fn test_render_error_is_iteration_scoped() {
        let err: AlertMapError = RenderError::Canvas { width: 0, height: 10 }.into();
        assert_eq!(err.scope(), FailureScope::Iteration);
        assert!(err.to_string().contains("0x10"));
    }
}
