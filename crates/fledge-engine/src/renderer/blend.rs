/// Blend mode for a draw batch. A change of blend mode mid-accumulation
/// splits the batch, so the variants are compared, never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard pre-multiplied alpha blending.
    #[default]
    Normal,
    /// Additive blending (src-alpha, one).
    Additive,
    /// Subtractive blending.
    Subtract,
}
