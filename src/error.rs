use thiserror::Error;

/// Errors surfaced by navigation, DNA access, and topology validation.
///
/// Navigation never returns sentinel indices; an absent edge or an
/// out-of-bounds move is reported here and the caller decides how to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// A base position or array index fell outside its valid range.
    #[error("{context}: position {position} out of range (limit {limit})")]
    OutOfRange {
        context: String,
        position: i64,
        limit: u64,
    },

    /// The top segment has no homologous segment in the parent genome,
    /// or no parse link to the top view.
    #[error("genome '{genome}': top segment {index} has no parent")]
    NoSuchParent { genome: String, index: i64 },

    /// The bottom segment has no homologous segment in the requested
    /// child slot, or no parse link to the bottom view.
    #[error("genome '{genome}': segment {index} has no child edge in slot {slot}")]
    NoSuchChild {
        genome: String,
        index: i64,
        slot: usize,
    },

    /// A cross-reference between the linked arrays is inconsistent, or a
    /// paralogy cycle failed to close within its bound.
    #[error("genome '{genome}': corrupt topology: {reason}")]
    CorruptTopology { genome: String, reason: String },

    /// A cursor was dereferenced after stepping past an array boundary.
    #[error("invalid iterator over {context}: index {index} not in [0, {limit})")]
    InvalidIterator {
        context: String,
        index: i64,
        limit: u64,
    },

    /// A DNA character outside ACGT/acgt was supplied during a build.
    #[error("invalid DNA character {character:?}")]
    InvalidCharacter { character: char },
}

pub type HalResult<T> = Result<T, HalError>;
