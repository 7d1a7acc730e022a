//! Orbit camera and sun geometry.
//!
//! The world is z-up with the origin on the ground plane. The camera sits on a
//! sphere of radius `distance` around the origin and always looks at it.

use glam::{DMat4, DVec3, DVec4, Mat4, Vec4};

/// Vertical field of view of the viewer.
pub const FOV_Y: f32 = 50.0 / 180.0 * std::f32::consts::PI;

/// Unit vector for a zenith/azimuth pair, z up.
pub fn spherical_direction(zenith: f64, azimuth: f64) -> DVec3 {
    let (sin_z, cos_z) = zenith.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    DVec3::new(sin_z * cos_a, sin_z * sin_a, cos_z)
}

/// Direction towards the sun.
pub fn sun_direction(zenith: f64, azimuth: f64) -> DVec3 {
    spherical_direction(zenith, azimuth)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f64,
    pub zenith: f64,
    pub azimuth: f64,
}

impl OrbitCamera {
    pub fn new(distance: f64, zenith: f64, azimuth: f64) -> Self {
        Self {
            distance,
            zenith,
            azimuth,
        }
    }

    pub fn position(&self) -> DVec3 {
        spherical_direction(self.zenith, self.azimuth) * self.distance
    }

    pub fn target(&self) -> DVec3 {
        DVec3::ZERO
    }

    /// View-space basis in world coordinates: (right, up, back). The camera
    /// looks down `-back`. Defined at zenith 0, unlike a look-at with z up.
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let (sin_z, cos_z) = self.zenith.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        let right = DVec3::new(-sin_a, cos_a, 0.0);
        let up = DVec3::new(-cos_z * cos_a, -cos_z * sin_a, sin_z);
        let back = DVec3::new(sin_z * cos_a, sin_z * sin_a, cos_z);
        (right, up, back)
    }

    pub fn forward(&self) -> DVec3 {
        -self.basis().2
    }

    /// View → world transform with positions expressed in `length_unit` metres.
    pub fn model_from_view(&self, length_unit: f64) -> Mat4 {
        let (right, up, back) = self.basis();
        let eye = back * (self.distance / length_unit);
        DMat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            back.extend(0.0),
            DVec4::new(eye.x, eye.y, eye.z, 1.0),
        )
        .as_mat4()
    }
}

/// Maps a clip-space vertex `(x, y, 0, 1)` to a view-space ray for the given
/// aspect ratio. Only the xyz of the result is meaningful.
pub fn view_from_clip(aspect: f32) -> Mat4 {
    let tan_fov_y = (FOV_Y / 2.0).tan();
    Mat4::from_cols(
        Vec4::new(tan_fov_y * aspect, 0.0, 0.0, 0.0),
        Vec4::new(0.0, tan_fov_y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, -1.0, 1.0),
    )
}
