//! Off-screen render-target textures backing capture buffers.

use crate::capture::BufferDesc;

/// A render-target texture and its default view.
///
/// The texture is created with `RENDER_ATTACHMENT | TEXTURE_BINDING |
/// COPY_SRC` usage flags, so a capture can render into it and the result can
/// be read back for dataset export.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Size and pixel layout the texture was created with.
    pub desc: BufferDesc,
}

impl RenderTarget {
    /// Create a render-target texture matching `desc`.
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &str, desc: &BufferDesc) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format.to_wgpu(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            desc: desc.clone(),
        }
    }
}
