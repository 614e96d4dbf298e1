use serde::{Deserialize, Serialize};
use crate::eos::GasModel;
use crate::error::Error;
use crate::index_space::Axis;




// ============================================================================
// Primitive variable slots. The leading block is fixed; passive scalars
// (advected scalars, species mass fractions, auxiliaries) follow at offsets
// given by the `VarLayout`.
pub const QRHO: usize = 0;
pub const QU: usize = 1;
pub const QV: usize = 2;
pub const QW: usize = 3;
pub const QPRES: usize = 4;
pub const QREINT: usize = 5; // rho times specific internal energy
pub const QTEMP: usize = 6;
pub const QPASS: usize = 7;

// Conserved variable slots. Temperature has no conserved counterpart, so the
// passive block starts one position lower than in the primitive layout.
pub const URHO: usize = 0;
pub const UMX: usize = 1;
pub const UMY: usize = 2;
pub const UMZ: usize = 3;
pub const UEDEN: usize = 4;
pub const UPASS: usize = 5;




/**
 * Return the primitive velocity slot for the given axis.
 */
pub fn qvel(axis: Axis) -> usize {
    match axis {
        Axis::I => QU,
        Axis::J => QV,
        Axis::K => QW,
    }
}


/**
 * Return the conserved momentum slot for the given axis.
 */
pub fn umom(axis: Axis) -> usize {
    match axis {
        Axis::I => UMX,
        Axis::J => UMY,
        Axis::K => UMZ,
    }
}




/**
 * Counts of the passive scalar blocks, fixed once at startup. The passive
 * blocks appear in the order: advected scalars, species mass fractions,
 * auxiliary variables, identically ordered in the primitive and conserved
 * layouts.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarLayout {
    pub num_adv: usize,
    pub num_species: usize,
    pub num_aux: usize,
}




// ============================================================================
impl VarLayout {


    pub fn new(num_adv: usize, num_species: usize, num_aux: usize) -> Self {

        assert!(num_species >= 1, "at least one species is required");

        Self { num_adv, num_species, num_aux }
    }


    pub fn num_passive(&self) -> usize {
        self.num_adv + self.num_species + self.num_aux
    }


    /**
     * First advected scalar, primitive layout.
     */
    pub fn qfa(&self) -> usize {
        QPASS
    }


    /**
     * First species mass fraction, primitive layout.
     */
    pub fn qfs(&self) -> usize {
        QPASS + self.num_adv
    }


    /**
     * First auxiliary variable, primitive layout.
     */
    pub fn qfx(&self) -> usize {
        QPASS + self.num_adv + self.num_species
    }


    /**
     * Number of primitive variables.
     */
    pub fn nq(&self) -> usize {
        QPASS + self.num_passive()
    }


    pub fn ufa(&self) -> usize {
        UPASS
    }


    pub fn ufs(&self) -> usize {
        UPASS + self.num_adv
    }


    pub fn ufx(&self) -> usize {
        UPASS + self.num_adv + self.num_species
    }


    /**
     * Number of conserved variables.
     */
    pub fn nu(&self) -> usize {
        UPASS + self.num_passive()
    }
}




/**
 * Convert a primitive state slice to conserved variables. Passive scalars
 * are stored as specific quantities in the primitive layout and as
 * densities in the conserved layout.
 */
pub fn prim_to_cons(q: &[f64], layout: &VarLayout, u: &mut [f64]) {
    let rho = q[QRHO];
    let vsq = q[QU] * q[QU] + q[QV] * q[QV] + q[QW] * q[QW];

    u[URHO] = rho;
    u[UMX] = rho * q[QU];
    u[UMY] = rho * q[QV];
    u[UMZ] = rho * q[QW];
    u[UEDEN] = q[QREINT] + 0.5 * rho * vsq;

    for p in 0..layout.num_passive() {
        u[UPASS + p] = rho * q[QPASS + p]
    }
}


/**
 * Evaluate the analytic (inviscid) flux vector of a primitive state along
 * the given axis.
 */
pub fn prim_flux(q: &[f64], layout: &VarLayout, axis: Axis, f: &mut [f64]) {
    let rho = q[QRHO];
    let pg = q[QPRES];
    let vn = q[qvel(axis)];
    let vsq = q[QU] * q[QU] + q[QV] * q[QV] + q[QW] * q[QW];
    let energy = q[QREINT] + 0.5 * rho * vsq;

    f[URHO] = rho * vn;
    f[UMX] = rho * q[QU] * vn;
    f[UMY] = rho * q[QV] * vn;
    f[UMZ] = rho * q[QW] * vn;
    f[umom(axis)] += pg;
    f[UEDEN] = (energy + pg) * vn;

    for p in 0..layout.num_passive() {
        f[UPASS + p] = rho * q[QPASS + p] * vn
    }
}




/**
 * Recover a primitive state from conserved variables, querying the gas
 * model for temperature and pressure. Unlike the in-kernel floors, this is
 * the place where genuinely unphysical data surfaces, so a negative density
 * or internal energy is an error rather than a clamp.
 */
pub fn cons_to_prim<G: GasModel>(u: &[f64], layout: &VarLayout, gas: &G, q: &mut [f64]) -> Result<(), Error> {
    let rho = u[URHO];

    if rho <= 0.0 {
        return Err(Error::NegativeMassDensity(rho));
    }

    q[QRHO] = rho;
    q[QU] = u[UMX] / rho;
    q[QV] = u[UMY] / rho;
    q[QW] = u[UMZ] / rho;

    for p in 0..layout.num_passive() {
        q[QPASS + p] = u[UPASS + p] / rho
    }

    let ke = 0.5 * rho * (q[QU] * q[QU] + q[QV] * q[QV] + q[QW] * q[QW]);
    let rhoe = u[UEDEN] - ke;
    let y = &q[layout.qfs() .. layout.qfs() + layout.num_species];
    let temp = gas.temperature_from_energy(rho, rhoe / rho, y);
    let pressure = gas.pressure(rho, temp, y);

    if pressure <= 0.0 {
        return Err(Error::NegativeGasPressure(pressure));
    }

    q[QPRES] = pressure;
    q[QREINT] = rhoe;
    q[QTEMP] = temp;
    Ok(())
}
