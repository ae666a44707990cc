//! Error types for the aviator crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AviatorError {
    /// A remap range whose bounds are equal, inverted or not finite
    #[error("invalid input range: [{in_min}, {in_max}] must be finite with in_max > in_min")]
    InvalidRange { in_min: f32, in_max: f32 },

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, AviatorError>;
