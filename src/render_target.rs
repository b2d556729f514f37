//! Render target descriptor (§3, §4.E).

use crate::descriptor::Extent2;

/// Descriptor for a `RenderTarget` resource. Its `(num_color_attachments,
/// has_depth_stencil_attachment)` pair is its attachment signature, which
/// must equal a render pass's own signature for `begin` to succeed
/// (invariant 4).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderTargetDesc {
    pub size: Extent2,
    pub multisample: bool,
    pub samples: u32,
    pub num_color_attachments: u32,
    pub has_depth_stencil_attachment: bool,
}

impl RenderTargetDesc {
    pub fn signature(&self) -> (u32, bool) {
        (self.num_color_attachments, self.has_depth_stencil_attachment)
    }
}
