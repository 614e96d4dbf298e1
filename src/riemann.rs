use crate::index_space::Axis;
use crate::state::{qvel, umom, VarLayout, QPASS, QPRES, QREINT, QRHO, QU, QV, QW, UEDEN, UMX, UMY, UMZ, UPASS, URHO};




/**
 * Contract for the approximate Riemann solver: consume the pair of traced
 * primitive face states (and the cell sound speeds carried to the face) and
 * produce one physically consistent conserved-variable flux. A pure
 * function of its arguments; implementations must be freely callable from
 * parallel face loops.
 */
pub trait RiemannSolver: Sync {
    fn solve(
        &self,
        ql: &[f64],
        qr: &[f64],
        cl: f64,
        cr: f64,
        axis: Axis,
        layout: &VarLayout,
        flux: &mut [f64],
    );
}




fn cons_component(q: &[f64], n: usize) -> f64 {
    let rho = q[QRHO];
    match n {
        URHO => rho,
        UMX => rho * q[QU],
        UMY => rho * q[QV],
        UMZ => rho * q[QW],
        UEDEN => q[QREINT] + 0.5 * rho * (q[QU] * q[QU] + q[QV] * q[QV] + q[QW] * q[QW]),
        _ => rho * q[QPASS + (n - UPASS)],
    }
}


fn flux_component(q: &[f64], axis: Axis, n: usize) -> f64 {
    let vn = q[qvel(axis)];
    let mut f = cons_component(q, n) * vn;

    if n == umom(axis) {
        f += q[QPRES]
    }
    if n == UEDEN {
        f += q[QPRES] * vn
    }
    f
}




/**
 * The HLLE (two outer wave) approximate Riemann solver. Passive scalars are
 * carried as densities and advect with the mass flux, which is all the
 * two-wave model can say about them.
 */
pub struct Hlle;




// ============================================================================
impl RiemannSolver for Hlle {

    fn solve(
        &self,
        ql: &[f64],
        qr: &[f64],
        cl: f64,
        cr: f64,
        axis: Axis,
        layout: &VarLayout,
        flux: &mut [f64],
    ) {
        let vnl = ql[qvel(axis)];
        let vnr = qr[qvel(axis)];

        let ap = (vnl + cl).max(vnr + cr).max(0.0);
        let am = (vnl - cl).min(vnr - cr).min(0.0);

        for n in 0..layout.nu() {
            let ul = cons_component(ql, n);
            let ur = cons_component(qr, n);
            let fl = flux_component(ql, axis, n);
            let fr = flux_component(qr, axis, n);

            flux[n] = (fl * ap - fr * am - (ul - ur) * ap * am) / (ap - am);
        }
    }
}
