use serde::{Deserialize, Serialize};




// ============================================================================
// Transport coefficient slots, as produced by `GasModel::transport`. Species
// diffusivities are density-weighted (rho * D_k) so the species flux is
// formed directly from the mass fraction gradient.
pub const CMU: usize = 0;
pub const CXI: usize = 1;
pub const CLAM: usize = 2;
pub const CRHOD: usize = 3;


/**
 * Number of transport coefficient components for a given species count.
 */
pub fn num_transport_coefs(num_species: usize) -> usize {
    CRHOD + num_species
}




/**
 * The thermodynamic and transport query interface. All methods are pure
 * functions of the local state, called once per cell (or face); the hydro
 * and diffusion kernels depend on nothing else about the gas. Swapping in a
 * test double here is the intended way to property-test the kernels.
 */
pub trait GasModel: Sync {

    /**
     * Pressure from density, temperature and species mass fractions.
     */
    fn pressure(&self, rho: f64, temp: f64, mass_fractions: &[f64]) -> f64;

    /**
     * Adiabatic sound speed.
     */
    fn sound_speed(&self, rho: f64, temp: f64, mass_fractions: &[f64]) -> f64;

    /**
     * Temperature from density and specific internal energy; the inverse
     * problem of the caloric equation of state.
     */
    fn temperature_from_energy(&self, rho: f64, internal_energy: f64, mass_fractions: &[f64]) -> f64;

    /**
     * Specific enthalpies of each species at the given temperature.
     */
    fn species_enthalpies(&self, temp: f64, enthalpies: &mut [f64]);

    /**
     * Transport coefficients for the given state, written in the slot order
     * `CMU, CXI, CLAM, CRHOD..`.
     */
    fn transport(&self, temp: f64, rho: f64, mass_fractions: &[f64], coefs: &mut [f64]);
}




/**
 * A calorically perfect gas with constant transport properties. This is the
 * built-in gas model, adequate for single-gamma problems and for testing;
 * detailed thermochemistry lives behind the same trait in the surrounding
 * application.
 */
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GammaLawGas {
    pub gamma: f64,
    pub gas_constant: f64,
    pub viscosity: f64,
    pub bulk_viscosity: f64,
    pub conductivity: f64,
    pub diffusivity: f64,
}




// ============================================================================
impl GammaLawGas {

    pub fn new(gamma: f64, gas_constant: f64) -> Self {
        Self {
            gamma,
            gas_constant,
            viscosity: 0.0,
            bulk_viscosity: 0.0,
            conductivity: 0.0,
            diffusivity: 0.0,
        }
    }

    pub fn with_transport(mut self, viscosity: f64, bulk_viscosity: f64, conductivity: f64, diffusivity: f64) -> Self {
        self.viscosity = viscosity;
        self.bulk_viscosity = bulk_viscosity;
        self.conductivity = conductivity;
        self.diffusivity = diffusivity;
        self
    }

    fn specific_heat_cv(&self) -> f64 {
        self.gas_constant / (self.gamma - 1.0)
    }

    fn specific_heat_cp(&self) -> f64 {
        self.gamma * self.gas_constant / (self.gamma - 1.0)
    }
}




// ============================================================================
impl GasModel for GammaLawGas {

    fn pressure(&self, rho: f64, temp: f64, _mass_fractions: &[f64]) -> f64 {
        rho * self.gas_constant * temp
    }

    fn sound_speed(&self, _rho: f64, temp: f64, _mass_fractions: &[f64]) -> f64 {
        (self.gamma * self.gas_constant * temp).sqrt()
    }

    fn temperature_from_energy(&self, _rho: f64, internal_energy: f64, _mass_fractions: &[f64]) -> f64 {
        internal_energy / self.specific_heat_cv()
    }

    fn species_enthalpies(&self, temp: f64, enthalpies: &mut [f64]) {
        for h in enthalpies {
            *h = self.specific_heat_cp() * temp
        }
    }

    fn transport(&self, _temp: f64, rho: f64, _mass_fractions: &[f64], coefs: &mut [f64]) {
        coefs[CMU] = self.viscosity;
        coefs[CXI] = self.bulk_viscosity;
        coefs[CLAM] = self.conductivity;

        for c in &mut coefs[CRHOD..] {
            *c = rho * self.diffusivity
        }
    }
}
