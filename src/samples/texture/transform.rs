//! World-view-projection for the spinning cube.
//!
//! Matrices are cgmath's column-vector convention (`clip = M * v`), so a chain written
//! left-to-right as model, view, projection in row-vector notation appears here reversed.
//! The world is left-handed: +Z points into the screen and clip depth spans [0, 1].

use std::f32::consts::PI;

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

pub const FOV_Y: f32 = PI / 4.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
/// Fixed tilt so the top face is visible
pub const TILT_X: f32 = -PI * 0.1;
/// Camera sits at (0, 0, -5) looking down +Z
pub const CAMERA_DISTANCE: f32 = 5.0;

/// Left-handed perspective projection with depth mapped to [0, 1].
pub fn projection(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Matrix4<f32> {
    let y_scale = 1.0 / (fov_y * 0.5).tan();
    let x_scale = y_scale / aspect;
    let q = z_far / (z_far - z_near);
    #[rustfmt::skip]
    let m = Matrix4::new(
        x_scale, 0.0,     0.0,          0.0,
        0.0,     y_scale, 0.0,          0.0,
        0.0,     0.0,     q,            1.0,
        0.0,     0.0,     -q * z_near,  0.0,
    );
    m
}

/// wgpu presents without pre-rotating the surface, so there is nothing to undo here.
pub fn surface_pretransform() -> Matrix4<f32> {
    Matrix4::identity()
}

pub fn model(current_time: f64) -> Matrix4<f32> {
    Matrix4::from_angle_x(Rad(TILT_X)) * Matrix4::from_angle_y(Rad(current_time as f32))
}

pub fn view() -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(0.0, 0.0, CAMERA_DISTANCE))
}

pub fn world_view_projection(current_time: f64, aspect: f32) -> Matrix4<f32> {
    projection(FOV_Y, aspect, Z_NEAR, Z_FAR) * surface_pretransform() * view() * model(current_time)
}
