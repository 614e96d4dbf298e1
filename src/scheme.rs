use serde::{Deserialize, Serialize};
use crate::error::Error;




/**
 * Selector for the face reconstruction scheme. `PpmHybridWeno` is the
 * parabolic method with the edge interpolation replaced by fifth-order
 * WENO-Z; it shares the parabola limiter and tracer with `Ppm`.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reconstruction {
    Plm,
    Ppm,
    PpmHybridWeno,
}




// ============================================================================
impl Reconstruction {

    /**
     * Parse a scheme name as it would appear in a configuration file. An
     * unrecognized name is a configuration error; callers treat it as fatal.
     */
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "plm" => Ok(Reconstruction::Plm),
            "ppm" => Ok(Reconstruction::Ppm),
            "ppm-hybrid-weno" => Ok(Reconstruction::PpmHybridWeno),
            _ => Err(Error::UnknownScheme(name.to_string())),
        }
    }

    pub fn is_parabolic(self) -> bool {
        match self {
            Reconstruction::Plm => false,
            Reconstruction::Ppm | Reconstruction::PpmHybridWeno => true,
        }
    }

    /**
     * Ghost cells required along the sweep axis, counted from the cells
     * being reconstructed.
     */
    pub fn halo_width(self) -> i64 {
        if self.is_parabolic() { 3 } else { 2 }
    }
}




/**
 * Options for the inviscid flux stage.
 */
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SchemeOptions {
    pub reconstruction: Reconstruction,
    pub use_flattening: bool,
}

impl Default for SchemeOptions {
    fn default() -> Self {
        Self {
            reconstruction: Reconstruction::Ppm,
            use_flattening: true,
        }
    }
}




/**
 * Options for the diffusion flux stage.
 */
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DiffusionOptions {
    pub do_harmonic: bool,
    pub diffuse_vel: bool,
}

impl Default for DiffusionOptions {
    fn default() -> Self {
        Self {
            do_harmonic: true,
            diffuse_vel: true,
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::Reconstruction;

    #[test]
    fn scheme_names_round_trip() {
        assert_eq!(Reconstruction::from_name("plm").unwrap(), Reconstruction::Plm);
        assert_eq!(Reconstruction::from_name("ppm").unwrap(), Reconstruction::Ppm);
        assert_eq!(Reconstruction::from_name("ppm-hybrid-weno").unwrap(), Reconstruction::PpmHybridWeno);
    }

    #[test]
    fn unknown_scheme_names_are_rejected() {
        assert!(Reconstruction::from_name("weno9").is_err());
    }

    #[test]
    fn parabolic_schemes_need_the_wider_halo() {
        assert_eq!(Reconstruction::Plm.halo_width(), 2);
        assert_eq!(Reconstruction::Ppm.halo_width(), 3);
        assert_eq!(Reconstruction::PpmHybridWeno.halo_width(), 3);
    }
}
