/// RenderPass and Framebuffer traits - opaque attachment-compatibility handles

/// Opaque render pass: describes the attachment layout draw commands render
/// into. All swapchain framebuffers share one render pass.
pub trait RenderPass: Send + Sync {}

/// Opaque framebuffer: one color attachment (a swapchain image view) plus
/// the shared depth attachment, compatible with the swapchain render pass.
pub trait Framebuffer: Send + Sync {}
