/// The stroke tessellator's result type.
pub type TessellationResult = Result<(), TessellationError>;

/// An error that can happen while building a stroke mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TessellationError {
    UnsupportedParameter(UnsupportedParameter),
}

#[cfg(feature = "std")]
impl core::fmt::Display for TessellationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TessellationError::UnsupportedParameter(e) => {
                std::write!(f, "Unsupported parameter: {}", e)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TessellationError {}

impl core::convert::From<UnsupportedParameter> for TessellationError {
    fn from(value: UnsupportedParameter) -> Self {
        Self::UnsupportedParameter(value)
    }
}

/// A style parameter the tessellator cannot work with.
///
/// Degenerate input geometry is never reported this way: it is recovered
/// with documented fallbacks instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedParameter {
    /// `tile_aspect` must be finite and greater than zero.
    InvalidTileAspect,
    /// `line_width` must be finite and greater than zero.
    InvalidLineWidth,
}

#[cfg(feature = "std")]
impl core::fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnsupportedParameter::InvalidTileAspect => {
                std::write!(f, "Tile aspect is not a positive number")
            }
            UnsupportedParameter::InvalidLineWidth => {
                std::write!(f, "Line width is not a positive number")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedParameter {}
