use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

/// Swapchain format for `formats` (the surface's list, best first).
///
/// Falls back to the first listed format when none matches the preference.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if modes.contains(&mode) => mode,
        _ => modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

/// wgpu rejects 0x0 configurations; a minimized window keeps the old one.
pub(crate) fn is_configurable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

pub(crate) fn classify_surface_error(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn unorm_surface_when_srgb_not_wanted() {
        let formats = [F::Bgra8UnormSrgb, F::Bgra8Unorm, F::Rgba16Float];
        assert_eq!(choose_surface_format(&formats, false), Some(F::Bgra8Unorm));
        assert_eq!(choose_surface_format(&formats, true), Some(F::Bgra8UnormSrgb));
    }

    #[test]
    fn first_format_is_the_fallback() {
        assert_eq!(choose_surface_format(&[F::Bgra8UnormSrgb], false), Some(F::Bgra8UnormSrgb));
        assert_eq!(choose_surface_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_mode_is_replaced() {
        use wgpu::CompositeAlphaMode as A;
        assert_eq!(choose_alpha_mode(&[A::Opaque], Some(A::PreMultiplied)), A::Opaque);
        assert_eq!(choose_alpha_mode(&[A::Opaque, A::PreMultiplied], Some(A::PreMultiplied)), A::PreMultiplied);
        assert_eq!(choose_alpha_mode(&[], None), A::Auto);
    }

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify_surface_error(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
    }

    #[test]
    fn minimized_window_is_not_configured() {
        assert!(!is_configurable(PhysicalSize::new(0, 720)));
        assert!(is_configurable(PhysicalSize::new(1, 1)));
    }
}
