//! Flamegrid computes the face fluxes for finite-volume updates of the
//! compressible reacting Navier-Stokes equations on structured, rectilinear
//! grid patches. It owns the hard middle of such a solver: limited
//! piecewise-linear and piecewise-parabolic reconstruction of primitive
//! fields to cell faces, characteristic tracing of the reconstructed
//! profiles to time-centered left/right face states, and assembly of the
//! viscous, conductive and species-diffusion fluxes from cell-centered
//! transport coefficients. Mesh management, boundary conditions, equations
//! of state and chemistry live in the surrounding application and enter
//! only through small query interfaces; the flux divergence and time
//! integration consume the face fluxes this crate produces.

pub mod diffusion;
pub mod eos;
pub mod error;
pub mod godunov;
pub mod index_space;
pub mod patch;
pub mod ppm;
pub mod riemann;
pub mod scheme;
pub mod slope;
pub mod state;
pub mod trace;
