//! Image filtering by explicit RK4 integration of finite-difference operators.
//!
//! The numerical core works on plain `ndarray` arrays: [`field`] pads a
//! channel by border replication, [`stencil`] holds the finite-difference
//! stencils, [`operator`] turns them into right-hand sides `F(t, U)` and
//! [`integrator`] advances a field or a whole image with RK4.
//!
//! [`config`] and [`image_io`] support the command-line binary and are never
//! called by the core.

pub mod config;
pub mod error;
pub mod field;
pub mod image_io;
pub mod integrator;
pub mod operator;
pub mod stencil;

pub use crate::error::{FilterError, Result};
pub use crate::field::{extend_borders, Field, Image};
pub use crate::integrator::{
    integrate_field, integrate_image, integrate_image_parallel, integrate_image_with_progress,
    IntegrationParams, Progress,
};
pub use crate::operator::{
    Brightness, Diffusion, FieldOperator, FilterKind, GradientNorm, LaplacianNorm,
    PrinceDeGalles, QuarticDiffusion,
};
