use std::fmt;

/// Errors that can occur during GPU context initialization.
#[derive(Debug)]
pub enum GpuContextError {
    /// No compatible GPU adapter found.
    AdapterRequest(wgpu::RequestAdapterError),
    /// GPU device request failed (limits or features not met).
    DeviceRequest(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterRequest(e) => {
                write!(f, "no compatible GPU adapter found: {e}")
            }
            Self::DeviceRequest(e) => write!(f, "device request failed: {e}"),
        }
    }
}

impl std::error::Error for GpuContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AdapterRequest(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
        }
    }
}

/// Surface-less wgpu device for off-screen render targets.
pub struct GpuContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
}

impl GpuContext {
    /// Request an adapter and device without a presentation surface. The
    /// queue is dropped; capture buffers are only created and destroyed
    /// here.
    ///
    /// # Errors
    ///
    /// Returns `GpuContextError` if the adapter or device request fails.
    pub async fn new_headless() -> Result<Self, GpuContextError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: None,
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await
            .map_err(GpuContextError::AdapterRequest)?;

        let info = adapter.get_info();
        log::info!("using GPU adapter {} ({:?})", info.name, info.backend);

        let (device, _queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Capture Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(GpuContextError::DeviceRequest)?;

        Ok(Self { device })
    }
}
