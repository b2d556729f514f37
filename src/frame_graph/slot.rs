//! Frame-graph slots: named edges connecting passes across the graph
//! (§4.H, GLOSSARY "Slot").

/// A symbolic, per-frame edge: exactly one producer assigns it, zero or more
/// consumers read it via `getSlot`/`checkSlot`. The well-known slots cover
/// the common engine-wide hand-offs (back-buffer color, G-buffer channels,
/// shadow maps); `User` covers everything a pass author defines itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FrameGraphSlot {
    ScreenColor,
    ScreenDepthStencil,
    GBufferPosition,
    GBufferNormal,
    GBufferAlbedo,
    ShadowMapPoint,
    ShadowMapDirectional,
    ShadowMapSpot,
    /// User-defined slots, e.g. `FrameGraphSlot::User(300)` (§8 scenario 5).
    User(u32),
}
