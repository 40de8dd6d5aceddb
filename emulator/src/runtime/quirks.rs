use super::screen::SpriteEdge;

/// Whether a key consumed by a key-gated instruction is auto-released.
///
/// Interpreter revisions disagree on this, so it is an explicit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// The consumed key is released on behalf of the host, so a held key
    /// satisfies one wait or skip at most
    #[default]
    ClearOnConsume,

    /// The key stays down until the host reports its release
    Persist,
}

/// Points where CHIP-8 reference implementations diverge, made explicit
/// machine configuration instead of a silent choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    /// Sprite behavior at the screen edge
    pub sprite_edge: SpriteEdge,

    /// Key consumption behavior for `skp` and the key wait
    pub key_policy: KeyPolicy,
}
