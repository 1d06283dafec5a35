use serde::Serialize;

/// One-time startup probe of what this process can decode and render.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// A GPU adapter can sample 16-bit unsigned-integer textures.
    pub gpu_integer_texture_supported: bool,
    /// The LZ4 frame decoder is compiled in.
    pub lz4_available: bool,
    pub adapter_name: Option<String>,
}

impl Capabilities {
    /// Capabilities of a build without any GPU.
    pub fn software_only() -> Self {
        Self {
            gpu_integer_texture_supported: false,
            lz4_available: cfg!(feature = "lz4"),
            adapter_name: None,
        }
    }

    /// Probe the default adapter. Never fails; missing pieces read as `false`.
    pub fn probe() -> Self {
        #[cfg(feature = "gpu")]
        {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            }));
            match adapter {
                Ok(adapter) => return Self::from_adapter(&adapter),
                Err(e) => tracing::info!("No GPU adapter: {e}"),
            }
        }
        Self::software_only()
    }

    /// Probe an adapter the host already owns.
    #[cfg(feature = "gpu")]
    pub fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let features = adapter.get_texture_format_features(wgpu::TextureFormat::R16Uint);
        let needed = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
        let supported = features.allowed_usages.contains(needed);
        let caps = Self {
            gpu_integer_texture_supported: supported,
            lz4_available: cfg!(feature = "lz4"),
            adapter_name: Some(adapter.get_info().name),
        };
        tracing::info!(
            "Capabilities: integer textures {}, lz4 {}",
            caps.gpu_integer_texture_supported,
            caps.lz4_available
        );
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_only_reports_codec_availability() {
        let caps = Capabilities::software_only();
        assert!(!caps.gpu_integer_texture_supported);
        assert_eq!(caps.lz4_available, cfg!(feature = "lz4"));
    }
}
