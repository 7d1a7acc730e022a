//! Viewer for a precomputed atmospheric scattering model.
//!
//! Three lookup tables (transmittance, scattering, irradiance) are read from
//! disk, uploaded as float textures and sampled by a full-screen shader. The
//! user orbits the camera and drags the sun; see [`interaction`].

pub mod app;
pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod interaction;
pub mod renderer;
pub mod texture;
pub mod uniforms;
