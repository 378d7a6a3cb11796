/// Color space helpers for clear colors
use egui_wgpu::wgpu;

/// Background used by every sample, in linear space.
pub const CLEAR_COLOR: [f32; 4] = [0.350, 0.350, 0.350, 1.0];

pub fn linear_to_srgb_channel(x: f32) -> f32 {
    if x <= 0.003_130_8 {
        x * 12.92
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts rgb to sRGB space. Alpha is left untouched.
pub fn linear_to_srgb(color: [f32; 4]) -> [f32; 4] {
    [
        linear_to_srgb_channel(color[0]),
        linear_to_srgb_channel(color[1]),
        linear_to_srgb_channel(color[2]),
        color[3],
    ]
}

/// Clear color for a render target. On surfaces without hardware sRGB conversion the color has to
/// be written in gamma space already.
pub fn clear_color(color: [f32; 4], convert_to_gamma: bool) -> [f32; 4] {
    if convert_to_gamma {
        linear_to_srgb(color)
    } else {
        color
    }
}

pub fn to_wgpu(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn srgb_curve_endpoints_and_linear_segment() {
        assert_eq!(linear_to_srgb_channel(0.0), 0.0);
        assert!(approx(linear_to_srgb_channel(1.0), 1.0));
        assert!(approx(linear_to_srgb_channel(0.002), 0.002 * 12.92));
    }

    #[test]
    fn clear_color_is_converted_only_with_gamma() {
        assert_eq!(clear_color(CLEAR_COLOR, false), CLEAR_COLOR);

        let converted = clear_color(CLEAR_COLOR, true);
        let expected = 1.055 * 0.35f32.powf(1.0 / 2.4) - 0.055;
        for channel in &converted[..3] {
            assert!(approx(*channel, expected));
        }
        // 0.35 linear is roughly 0.626 in sRGB
        assert!((converted[0] - 0.626).abs() < 1e-3);
        assert_eq!(converted[3], 1.0);
    }

    #[test]
    fn alpha_is_never_converted() {
        let converted = linear_to_srgb([0.5, 0.5, 0.5, 0.25]);
        assert_eq!(converted[3], 0.25);
    }

    #[test]
    fn to_wgpu_keeps_channel_order() {
        let c = to_wgpu([0.1, 0.2, 0.3, 0.4]);
        assert!((c.r - 0.1).abs() < 1e-6);
        assert!((c.g - 0.2).abs() < 1e-6);
        assert!((c.b - 0.3).abs() < 1e-6);
        assert!((c.a - 0.4).abs() < 1e-6);
    }
}
