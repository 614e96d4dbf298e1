use crate::eos::GasModel;
use crate::index_space::{Axis, Index3, IndexSpace};
use crate::patch::Patch;
use crate::ppm;
use crate::scheme::{Reconstruction, SchemeOptions};
use crate::slope::plm_slope;
use crate::state::{qvel, VarLayout, QPASS, QPRES, QREINT, QRHO, QTEMP};

// Floor applied to density and pressure after the wave amplitudes are
// assembled. Non-positive values are expected transients at strong
// discontinuities and are clamped silently, never rejected.
const SMALL: f64 = f64::MIN_POSITIVE;




/**
 * Gather the five-point stencil of one component, centered on a cell, along
 * the sweep axis. Reads two ghost cells past the traced cell; the caller
 * guarantees the halo.
 */
fn stencil(q: &Patch, iv: Index3, axis: Axis, n: usize) -> [f64; 5] {
    [
        q.get(axis.shift(iv, -2), n),
        q.get(axis.shift(iv, -1), n),
        q.get(iv, n),
        q.get(axis.shift(iv, 1), n),
        q.get(axis.shift(iv, 2), n),
    ]
}


/**
 * The shock flattening coefficient of a cell along the sweep axis, in
 * [0, 1]. A cell flagged as sitting inside a strong compression (pressure
 * jump over two cells dominated by the jump over four, converging normal
 * velocity, jump a sizable fraction of the local pressure) has its parabola
 * blended toward first order.
 */
fn flatten_coefficient(q: &Patch, iv: Index3, axis: Axis) -> f64 {
    const SMALL_PRES: f64 = 1e-200;
    const ZCUT1: f64 = 0.75;
    const ZCUT2: f64 = 0.85;
    const SHOCK_TEST: f64 = 1.0 / 3.0;

    let qn = qvel(axis);
    let pm = q.get(axis.shift(iv, -1), QPRES);
    let pp = q.get(axis.shift(iv, 1), QPRES);
    let dp = pp - pm;
    let dp2 = q.get(axis.shift(iv, 2), QPRES) - q.get(axis.shift(iv, -2), QPRES);

    let zeta = dp.abs() / dp2.abs().max(SMALL_PRES);
    let z = ((zeta - ZCUT1) / (ZCUT2 - ZCUT1)).max(0.0).min(1.0);

    let converging = q.get(axis.shift(iv, -1), qn) - q.get(axis.shift(iv, 1), qn) >= 0.0;
    let strong = dp.abs() / pm.min(pp) > SHOCK_TEST;

    if converging && strong {
        1.0 - z
    } else {
        1.0
    }
}




/**
 * Cell-centered quantities entering the acoustic eigenstructure: the state
 * itself, the sound speed from the gas model, and the enthalpy-like factor
 * used by the internal-energy amplitude.
 */
struct CellEigen {
    rho: f64,
    un: f64,
    ut1: f64,
    ut2: f64,
    p: f64,
    rhoe: f64,
    cc: f64,
    csq: f64,
    enth: f64,
}


fn cell_eigen<G: GasModel>(q: &Patch, layout: &VarLayout, iv: Index3, axis: Axis, gas: &G) -> CellEigen {
    let cell = q.get_slice(iv);
    let y = &cell[layout.qfs() .. layout.qfs() + layout.num_species];
    let (t1, t2) = axis.tangential();

    let rho = cell[QRHO];
    let p = cell[QPRES];
    let rhoe = cell[QREINT];
    let cc = gas.sound_speed(rho, cell[QTEMP], y);
    let csq = cc * cc;

    CellEigen {
        rho,
        un: cell[qvel(axis)],
        ut1: cell[qvel(t1)],
        ut2: cell[qvel(t2)],
        p,
        rhoe,
        cc,
        csq,
        enth: (rhoe + p) / rho / csq,
    }
}




// ============================================================================
// Piecewise-linear tracer. Wave amplitudes are projections of the limited
// slopes onto the three characteristic families; the reference state is the
// profile extrapolated along the extreme wave heading toward the face, so
// that family's own amplitude is absorbed into the reference. The remaining
// families correct the reference only when their waves move toward the face
// (the domain-of-dependence factor below).

fn plm_trace_lower(
    layout: &VarLayout,
    axis: Axis,
    e: &CellEigen,
    cell: &[f64],
    dtdx: f64,
    slope: &[f64],
    out: &mut [f64],
) {
    let un_slot = qvel(axis);
    let (t1, t2) = axis.tangential();

    let drho = slope[QRHO];
    let dun = slope[un_slot];
    let dut1 = slope[qvel(t1)];
    let dut2 = slope[qvel(t2)];
    let dp = slope[QPRES];
    let drhoe = slope[QREINT];

    let alphap = 0.5 * (dp / (e.rho * e.cc) + dun) * e.rho / e.cc;
    let alpha0r = drho - dp / e.csq;
    let alpha0e = drhoe - dp * e.enth;

    let wv = [e.un - e.cc, e.un, e.un + e.cc];

    // Right state on the lower face: reference traced along u-c.
    let ext = 0.5 * (1.0 + dtdx * wv[0].min(0.0));
    let rho_ref = e.rho - ext * drho;
    let un_ref = e.un - ext * dun;
    let ut1_ref = e.ut1 - ext * dut1;
    let ut2_ref = e.ut2 - ext * dut2;
    let p_ref = e.p - ext * dp;
    let rhoe_ref = e.rhoe - ext * drhoe;

    let apright = 0.25 * dtdx * (wv[0] - wv[2]) * (1.0 - 1.0_f64.copysign(wv[2])) * alphap;
    let az0 = 0.25 * dtdx * (wv[0] - wv[1]) * (1.0 - 1.0_f64.copysign(wv[1]));
    let azrright = az0 * alpha0r;
    let azeright = az0 * alpha0e;

    out[QRHO] = (rho_ref + apright + azrright).max(SMALL);
    out[un_slot] = un_ref + apright * e.cc / e.rho;
    out[qvel(t1)] = ut1_ref + az0 * dut1;
    out[qvel(t2)] = ut2_ref + az0 * dut2;
    out[QPRES] = (p_ref + apright * e.csq).max(SMALL);
    out[QREINT] = rhoe_ref + apright * e.enth * e.csq + azeright;
    out[QTEMP] = cell[QTEMP];

    // Passive scalars ride the normal velocity with a partial upwind blend
    // when the velocity sign is not clean.
    let spzerom = if e.un > 0.0 { -1.0 } else { e.un * dtdx };
    for p in 0..layout.num_passive() {
        let n = QPASS + p;
        out[n] = cell[n] + 0.5 * (-1.0 - spzerom) * slope[n];
    }
}


fn plm_trace_upper(
    layout: &VarLayout,
    axis: Axis,
    e: &CellEigen,
    cell: &[f64],
    dtdx: f64,
    slope: &[f64],
    out: &mut [f64],
) {
    let un_slot = qvel(axis);
    let (t1, t2) = axis.tangential();

    let drho = slope[QRHO];
    let dun = slope[un_slot];
    let dut1 = slope[qvel(t1)];
    let dut2 = slope[qvel(t2)];
    let dp = slope[QPRES];
    let drhoe = slope[QREINT];

    let alpham = 0.5 * (dp / (e.rho * e.cc) - dun) * e.rho / e.cc;
    let alpha0r = drho - dp / e.csq;
    let alpha0e = drhoe - dp * e.enth;

    let wv = [e.un - e.cc, e.un, e.un + e.cc];

    // Left state on the upper face: reference traced along u+c.
    let ext = 0.5 * (1.0 - dtdx * wv[2].max(0.0));
    let rho_ref = e.rho + ext * drho;
    let un_ref = e.un + ext * dun;
    let ut1_ref = e.ut1 + ext * dut1;
    let ut2_ref = e.ut2 + ext * dut2;
    let p_ref = e.p + ext * dp;
    let rhoe_ref = e.rhoe + ext * drhoe;

    let amleft = 0.25 * dtdx * (wv[2] - wv[0]) * (1.0 + 1.0_f64.copysign(wv[0])) * alpham;
    let az0 = 0.25 * dtdx * (wv[2] - wv[1]) * (1.0 + 1.0_f64.copysign(wv[1]));
    let azrleft = az0 * alpha0r;
    let azeleft = az0 * alpha0e;

    out[QRHO] = (rho_ref + amleft + azrleft).max(SMALL);
    out[un_slot] = un_ref - amleft * e.cc / e.rho;
    out[qvel(t1)] = ut1_ref + az0 * dut1;
    out[qvel(t2)] = ut2_ref + az0 * dut2;
    out[QPRES] = (p_ref + amleft * e.csq).max(SMALL);
    out[QREINT] = rhoe_ref + amleft * e.enth * e.csq + azeleft;
    out[QTEMP] = cell[QTEMP];

    let spzerop = if e.un >= 0.0 { e.un * dtdx } else { 1.0 };
    for p in 0..layout.num_passive() {
        let n = QPASS + p;
        out[n] = cell[n] + 0.5 * (1.0 - spzerop) * slope[n];
    }
}




// ============================================================================
// Piecewise-parabolic tracer. The parabola integrals over the three wave
// speeds carry both the profile and the extrapolation distance, so the wave
// amplitudes here are left-eigenvector projections of the difference between
// the reference integral and each family's integral.

/**
 * Fill the parabola integrals of every traced component for one cell.
 * `ip` and `im` hold three wave-family entries per component.
 */
fn ppm_profiles(
    q: &Patch,
    layout: &VarLayout,
    iv: Index3,
    axis: Axis,
    dtdx: f64,
    flatn: f64,
    weno: bool,
    e: &CellEigen,
    ip: &mut [f64],
    im: &mut [f64],
) {
    for n in 0..layout.nq() {
        if n == QTEMP {
            continue;
        }
        let s = stencil(q, iv, axis, n);
        let (sm, sp) = if weno {
            ppm::weno_reconstruct(&s, flatn)
        } else {
            ppm::ppm_reconstruct(&s, flatn)
        };
        let (p3, m3) = ppm::ppm_int_profile(sm, sp, s[2], e.un, e.cc, dtdx);
        ip[n * 3 .. n * 3 + 3].copy_from_slice(&p3);
        im[n * 3 .. n * 3 + 3].copy_from_slice(&m3);
    }
}


fn ppm_trace_lower(
    layout: &VarLayout,
    axis: Axis,
    e: &CellEigen,
    cell: &[f64],
    im: &[f64],
    out: &mut [f64],
) {
    let at = |n: usize, w: usize| im[n * 3 + w];
    let un_slot = qvel(axis);
    let (t1, t2) = axis.tangential();

    // The reference is the integral along the fastest wave toward this face
    // (u-c), so that family's amplitude is folded into the reference and
    // only the entropy and u+c families correct it.
    let rho_ref = at(QRHO, 0).max(SMALL);
    let un_ref = at(un_slot, 0);
    let p_ref = at(QPRES, 0).max(SMALL);
    let rhoe_ref = at(QREINT, 0);

    let drho = rho_ref - at(QRHO, 1);
    let dptot = p_ref - at(QPRES, 1);
    let drhoe = rhoe_ref - at(QREINT, 1);
    let dup = un_ref - at(un_slot, 2);
    let dptotp = p_ref - at(QPRES, 2);

    let mut alphap = 0.5 * (dptotp / (e.rho * e.cc) + dup) * e.rho / e.cc;
    let mut alpha0r = drho - dptot / e.csq;
    let mut alpha0e = drhoe - dptot * e.enth;

    alphap = if e.un + e.cc > 0.0 { 0.0 } else { -alphap };
    alpha0r = if e.un > 0.0 { 0.0 } else { -alpha0r };
    alpha0e = if e.un > 0.0 { 0.0 } else { -alpha0e };

    out[QRHO] = (rho_ref + alphap + alpha0r).max(SMALL);
    out[un_slot] = un_ref + alphap * e.cc / e.rho;
    out[QPRES] = (p_ref + alphap * e.csq).max(SMALL);
    out[QREINT] = rhoe_ref + alphap * e.enth * e.csq + alpha0e;
    out[QTEMP] = cell[QTEMP];

    // Transverse velocities and passives are carried by the u wave alone.
    out[qvel(t1)] = if e.un > 0.0 { cell[qvel(t1)] } else { at(qvel(t1), 1) };
    out[qvel(t2)] = if e.un > 0.0 { cell[qvel(t2)] } else { at(qvel(t2), 1) };

    for p in 0..layout.num_passive() {
        let n = QPASS + p;
        out[n] = if e.un > 0.0 { cell[n] } else { at(n, 1) };
    }
}


fn ppm_trace_upper(
    layout: &VarLayout,
    axis: Axis,
    e: &CellEigen,
    cell: &[f64],
    ip: &[f64],
    out: &mut [f64],
) {
    let at = |n: usize, w: usize| ip[n * 3 + w];
    let un_slot = qvel(axis);
    let (t1, t2) = axis.tangential();

    // Reference along u+c, the fastest wave toward the upper face.
    let rho_ref = at(QRHO, 2).max(SMALL);
    let un_ref = at(un_slot, 2);
    let p_ref = at(QPRES, 2).max(SMALL);
    let rhoe_ref = at(QREINT, 2);

    let dum = un_ref - at(un_slot, 0);
    let dptotm = p_ref - at(QPRES, 0);
    let drho = rho_ref - at(QRHO, 1);
    let dptot = p_ref - at(QPRES, 1);
    let drhoe = rhoe_ref - at(QREINT, 1);

    let mut alpham = 0.5 * (dptotm / (e.rho * e.cc) - dum) * e.rho / e.cc;
    let mut alpha0r = drho - dptot / e.csq;
    let mut alpha0e = drhoe - dptot * e.enth;

    alpham = if e.un - e.cc >= 0.0 { -alpham } else { 0.0 };
    alpha0r = if e.un >= 0.0 { -alpha0r } else { 0.0 };
    alpha0e = if e.un >= 0.0 { -alpha0e } else { 0.0 };

    out[QRHO] = (rho_ref + alpham + alpha0r).max(SMALL);
    out[un_slot] = un_ref - alpham * e.cc / e.rho;
    out[QPRES] = (p_ref + alpham * e.csq).max(SMALL);
    out[QREINT] = rhoe_ref + alpham * e.enth * e.csq + alpha0e;
    out[QTEMP] = cell[QTEMP];

    out[qvel(t1)] = if e.un >= 0.0 { at(qvel(t1), 1) } else { cell[qvel(t1)] };
    out[qvel(t2)] = if e.un >= 0.0 { at(qvel(t2), 1) } else { cell[qvel(t2)] };

    for p in 0..layout.num_passive() {
        let n = QPASS + p;
        out[n] = if e.un >= 0.0 { at(n, 1) } else { cell[n] };
    }
}




// ============================================================================
#[derive(Clone, Copy)]
enum Side {
    Lower,
    Upper,
}


fn trace_cell<G: GasModel>(
    q: &Patch,
    layout: &VarLayout,
    iv: Index3,
    axis: Axis,
    dtdx: f64,
    opts: &SchemeOptions,
    gas: &G,
    side: Side,
    slope: &mut [f64],
    ip: &mut [f64],
    im: &mut [f64],
    out: &mut [f64],
) {
    let e = cell_eigen(q, layout, iv, axis, gas);
    let cell = q.get_slice(iv);

    match opts.reconstruction {
        Reconstruction::Plm => {
            for n in 0..layout.nq() {
                slope[n] = if n == QTEMP { 0.0 } else { plm_slope(&stencil(q, iv, axis, n)) };
            }
            match side {
                Side::Lower => plm_trace_lower(layout, axis, &e, cell, dtdx, slope, out),
                Side::Upper => plm_trace_upper(layout, axis, &e, cell, dtdx, slope, out),
            }
        }
        Reconstruction::Ppm | Reconstruction::PpmHybridWeno => {
            let flatn = if opts.use_flattening {
                flatten_coefficient(q, iv, axis)
            } else {
                1.0
            };
            let weno = opts.reconstruction == Reconstruction::PpmHybridWeno;
            ppm_profiles(q, layout, iv, axis, dtdx, flatn, weno, &e, ip, im);
            match side {
                Side::Lower => ppm_trace_lower(layout, axis, &e, cell, im, out),
                Side::Upper => ppm_trace_upper(layout, axis, &e, cell, ip, out),
            }
        }
    }
}


/**
 * Trace the cells of `cells` to time-centered face states along one axis.
 * Returns `(qm, qp)` on the face space `cells.extend_upper(1, axis)`: `qm`
 * holds the state seen from the cell below each face (valid wherever that
 * cell is in `cells`), `qp` the state seen from the cell above it. The
 * primitive patch must be ghost-filled two cells beyond `cells` along the
 * sweep axis.
 *
 * The two passes write disjoint face locations and read only cell data, so
 * each runs as an unsynchronized parallel-for; the pass boundary is the
 * barrier between reconstruction/tracing and the Riemann stage.
 */
pub fn trace_states<G: GasModel>(
    q: &Patch,
    layout: &VarLayout,
    cells: &IndexSpace,
    axis: Axis,
    dt: f64,
    dx: f64,
    opts: &SchemeOptions,
    gas: &G,
) -> (Patch, Patch) {
    use rayon::prelude::*;

    assert!(q.num_fields() == layout.nq(), "primitive patch does not match the variable layout");
    assert!(
        q.index_space().contains_space(&cells.extend_axis(2, axis)),
        "primitive patch does not cover the reconstruction stencils"
    );
    assert!(dx > 0.0 && dt >= 0.0);

    let nq = layout.nq();
    let dtdx = dt / dx;
    let faces = cells.extend_upper(1, axis);
    let k0 = faces.start().2;

    log::debug!(
        "trace {} cells along {:?} with {:?}",
        cells.len(),
        axis,
        opts.reconstruction
    );

    let mut qp = Patch::zeros(nq, faces.clone());
    let mut qm = Patch::zeros(nq, faces.clone());

    qp.par_pencils_mut().for_each(|((i, j), pencil)| {
        let mut slope = vec![0.0; nq];
        let mut ip = vec![0.0; nq * 3];
        let mut im = vec![0.0; nq * 3];

        for (n, out) in pencil.chunks_exact_mut(nq).enumerate() {
            let f = (i, j, k0 + n as i64);
            if cells.contains(f) {
                trace_cell(q, layout, f, axis, dtdx, opts, gas, Side::Lower, &mut slope, &mut ip, &mut im, out)
            }
        }
    });

    qm.par_pencils_mut().for_each(|((i, j), pencil)| {
        let mut slope = vec![0.0; nq];
        let mut ip = vec![0.0; nq * 3];
        let mut im = vec![0.0; nq * 3];

        for (n, out) in pencil.chunks_exact_mut(nq).enumerate() {
            let f = (i, j, k0 + n as i64);
            let c = axis.shift(f, -1);
            if cells.contains(c) {
                trace_cell(q, layout, c, axis, dtdx, opts, gas, Side::Upper, &mut slope, &mut ip, &mut im, out)
            }
        }
    });

    (qm, qp)
}
