use rayon::prelude::*;
use crate::eos::GasModel;
use crate::index_space::{Axis, IndexSpace};
use crate::patch::Patch;
use crate::riemann::RiemannSolver;
use crate::scheme::SchemeOptions;
use crate::state::{VarLayout, QRHO, QTEMP};
use crate::trace;




/**
 * Compute the time-centered inviscid flux through every face of `valid`
 * with normals along `axis`. The primitive patch must be ghost-filled
 * `opts.reconstruction.halo_width()` cells beyond `valid` along the sweep
 * axis (one ring of cells outside the box is traced, and reconstruction
 * reads two more).
 *
 * The stages run with a barrier between them: reconstruction and tracing
 * complete over the whole box before the Riemann solver consumes the face
 * state pairs. The traced state patches are scratch owned by this call.
 * Returns the conserved-variable flux on `valid.extend_upper(1, axis)`.
 */
pub fn inviscid_flux<G, R>(
    q: &Patch,
    layout: &VarLayout,
    valid: &IndexSpace,
    axis: Axis,
    dt: f64,
    dx: f64,
    opts: &SchemeOptions,
    gas: &G,
    riemann: &R,
) -> Patch
where
    G: GasModel,
    R: RiemannSolver,
{
    let traced_cells = valid.extend_axis(1, axis);
    let (qm, qp) = trace::trace_states(q, layout, &traced_cells, axis, dt, dx, opts, gas);

    let faces = valid.extend_upper(1, axis);
    let nu = layout.nu();
    let k0 = faces.start().2;

    log::debug!("riemann solve on {} faces along {:?}", faces.len(), axis);

    let mut flux = Patch::zeros(nu, faces.clone());

    flux.par_pencils_mut().for_each(|((i, j), pencil)| {
        for (n, f) in pencil.chunks_exact_mut(nu).enumerate() {
            let face = (i, j, k0 + n as i64);
            let ql = qm.get_slice(face);
            let qr = qp.get_slice(face);

            // Sound speeds ride to the face on the adjacent cell states.
            let yl = &ql[layout.qfs() .. layout.qfs() + layout.num_species];
            let yr = &qr[layout.qfs() .. layout.qfs() + layout.num_species];
            let cl = gas.sound_speed(ql[QRHO], ql[QTEMP], yl);
            let cr = gas.sound_speed(qr[QRHO], qr[QTEMP], yr);

            riemann.solve(ql, qr, cl, cr, axis, layout, f);
        }
    });

    flux
}
