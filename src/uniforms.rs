//! Uniform block shared with `shader.wgsl`.

use crate::camera::view_from_clip;
use crate::interaction::ViewParams;

/// Shader lengths are in kilometres.
pub const LENGTH_UNIT_IN_METERS: f64 = 1000.0;
/// Planet radius at the ground, metres.
pub const BOTTOM_RADIUS_M: f64 = 6_360_000.0;
pub const SUN_ANGULAR_RADIUS: f64 = 0.00935 / 2.0;
/// The tables are in luminance units; this brings the user exposure back to
/// a usable range.
pub const LUMINANCE_EXPOSURE_SCALE: f64 = 1e-5;

/// Mirrors `struct Globals` in the shader. vec3 fields are padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub model_from_view: [[f32; 4]; 4],
    pub view_from_clip: [[f32; 4]; 4],
    pub camera: [f32; 3],
    pub exposure: f32,
    pub white_point: [f32; 3],
    _pad0: f32,
    pub earth_center: [f32; 3],
    _pad1: f32,
    pub sun_direction: [f32; 3],
    _pad2: f32,
    pub sun_size: [f32; 2],
    _pad3: [f32; 2],
}

impl GlobalsUniform {
    pub fn new(params: &ViewParams, aspect: f32, white_point: [f32; 3]) -> Self {
        let camera = params.camera();
        let model_from_view = camera.model_from_view(LENGTH_UNIT_IN_METERS);
        Self {
            model_from_view: model_from_view.to_cols_array_2d(),
            view_from_clip: view_from_clip(aspect).to_cols_array_2d(),
            camera: (camera.position() / LENGTH_UNIT_IN_METERS)
                .as_vec3()
                .to_array(),
            exposure: (params.exposure * LUMINANCE_EXPOSURE_SCALE) as f32,
            white_point,
            _pad0: 0.0,
            earth_center: [0.0, 0.0, (-BOTTOM_RADIUS_M / LENGTH_UNIT_IN_METERS) as f32],
            _pad1: 0.0,
            sun_direction: params.sun_direction().as_vec3().to_array(),
            _pad2: 0.0,
            sun_size: sun_size(),
            _pad3: [0.0; 2],
        }
    }
}

/// `(tan, cos)` of the sun's angular radius.
pub fn sun_size() -> [f32; 2] {
    [
        SUN_ANGULAR_RADIUS.tan() as f32,
        SUN_ANGULAR_RADIUS.cos() as f32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 208);
        assert_eq!(std::mem::offset_of!(GlobalsUniform, camera), 128);
        assert_eq!(std::mem::offset_of!(GlobalsUniform, white_point), 144);
        assert_eq!(std::mem::offset_of!(GlobalsUniform, earth_center), 160);
        assert_eq!(std::mem::offset_of!(GlobalsUniform, sun_direction), 176);
        assert_eq!(std::mem::offset_of!(GlobalsUniform, sun_size), 192);
    }

    #[test]
    fn built_from_view_params() {
        let params = ViewParams::preset(1).unwrap();
        let u = GlobalsUniform::new(&params, 1.5, [1.0, 1.0, 1.0]);

        let cam_len = glam::Vec3::from(u.camera).length();
        assert_relative_eq!(cam_len, 9.0, epsilon = 1e-4);
        assert_relative_eq!(u.exposure, 10.0e-5, max_relative = 1e-6);
        assert_eq!(u.earth_center, [0.0, 0.0, -6360.0]);
        assert_relative_eq!(glam::Vec3::from(u.sun_direction).length(), 1.0, epsilon = 1e-6);
        // translation column of model_from_view is the camera
        for i in 0..3 {
            assert_relative_eq!(u.model_from_view[3][i], u.camera[i], epsilon = 1e-5);
        }
        assert_eq!(u.model_from_view[3][3], 1.0);
    }

    #[test]
    fn sun_size_pair() {
        let [tan, cos] = sun_size();
        assert_relative_eq!(tan, 0.004675f32.tan(), epsilon = 1e-7);
        assert_relative_eq!(cos, 0.004675f32.cos(), epsilon = 1e-7);
        assert!(cos < 1.0);
    }
}
