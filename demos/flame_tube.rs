use flamegrid::diffusion;
use flamegrid::eos::{num_transport_coefs, GammaLawGas, GasModel};
use flamegrid::godunov;
use flamegrid::index_space::{range3d, Axis, IndexSpace};
use flamegrid::patch::Patch;
use flamegrid::riemann::Hlle;
use flamegrid::scheme::{DiffusionOptions, SchemeOptions};
use flamegrid::state;
use flamegrid::state::{VarLayout, QPRES, QREINT, QRHO, QTEMP, QU};




const NUM_GUARD: i64 = 3;
const CFL: f64 = 0.4;




/**
 * The mesh: a thin tube of cells along the x axis.
 */
#[derive(serde::Serialize)]
struct Mesh {
    length: f64,
    num_zones: i64,
}




// ============================================================================
impl Mesh {

    fn cell_spacing(&self) -> f64 {
        self.length / self.num_zones as f64
    }

    fn cell_center(&self, i: i64) -> f64 {
        self.cell_spacing() * (i as f64 + 0.5)
    }

    fn interior(&self) -> IndexSpace {
        range3d(0..self.num_zones, 0..1, 0..1)
    }
}




/**
 * The simulation solution state
 */
#[derive(serde::Serialize)]
struct State {
    iteration: u64,
    time: f64,
    primitive: Patch,
}




/**
 * A hot dense pocket of fuel on the left, cold oxidizer on the right. The
 * species interface diffuses while the pressure jump drives a shock tube.
 */
fn initial_primitive(mesh: &Mesh, layout: &VarLayout, gas: &GammaLawGas) -> Patch {
    Patch::from_slice_function(mesh.interior().extend_all(NUM_GUARD), layout.nq(), |(i, _j, _k), s| {
        let x = mesh.cell_center(i.max(0).min(mesh.num_zones - 1));
        let left = x < 0.5 * mesh.length;

        let temp = if left { 1200.0 } else { 300.0 };
        let rho = if left { 1.0 } else { 0.125 };

        s[QRHO] = rho;
        s[QU] = 0.0;
        s[QPRES] = gas.pressure(rho, temp, &[]);
        s[QREINT] = s[QPRES] / (gas.gamma - 1.0);
        s[QTEMP] = temp;
        s[layout.qfs()] = if left { 1.0 } else { 0.0 };
        s[layout.qfs() + 1] = if left { 0.0 } else { 1.0 };
    })
}


/**
 * Zero-gradient (outflow) ghost fill: every halo cell copies the nearest
 * interior cell.
 */
fn fill_ghosts(q: &Patch, valid: &IndexSpace) -> Patch {
    let (i0, j0, k0) = valid.start();
    let (i1, j1, k1) = valid.end();

    Patch::from_slice_function(q.index_space().clone(), q.num_fields(), |(i, j, k), s| {
        let clamped = (
            i.max(i0).min(i1 - 1),
            j.max(j0).min(j1 - 1),
            k.max(k0).min(k1 - 1),
        );
        s.copy_from_slice(q.get_slice(clamped))
    })
}


fn max_signal_speed(q: &Patch, layout: &VarLayout, valid: &IndexSpace, gas: &GammaLawGas) -> f64 {
    valid
        .iter()
        .map(|iv| {
            let s = q.get_slice(iv);
            let y = &s[layout.qfs() .. layout.qfs() + layout.num_species];
            s[QU].abs() + gas.sound_speed(s[QRHO], s[QTEMP], y)
        })
        .fold(0.0, f64::max)
}


// ============================================================================
fn advance(state: State, mesh: &Mesh, layout: &VarLayout, gas: &GammaLawGas) -> State {
    let State { iteration, time, primitive } = state;

    let valid = mesh.interior();
    let dx = mesh.cell_spacing();
    let deltas = (dx, dx, dx);
    let dt = CFL * dx / max_signal_speed(&primitive, layout, &valid, gas);

    let hydro_opts = SchemeOptions::default();
    let diff_opts = DiffusionOptions::default();

    let coef = Patch::from_slice_function(
        primitive.index_space().clone(),
        num_transport_coefs(layout.num_species),
        |iv, c| {
            let s = primitive.get_slice(iv);
            let y = &s[layout.qfs() .. layout.qfs() + layout.num_species];
            gas.transport(s[QTEMP], s[QRHO], y, c)
        },
    );

    let faces = valid.extend_upper(1, Axis::I);
    let area = Patch::from_scalar_function(faces, |_| 1.0);

    let hydro = godunov::inviscid_flux(
        &primitive, layout, &valid, Axis::I, dt, dx, &hydro_opts, gas, &Hlle);
    let diffusive = diffusion::diffusion_flux(
        &primitive, &coef, layout, &valid, Axis::I, deltas, &area, &diff_opts, gas);

    // Conservative update, then primitive recovery; both owned by the
    // driver, not by the flux kernels.
    let mut next = primitive.clone();
    let mut u = vec![0.0; layout.nu()];

    for iv in valid.iter() {
        state::prim_to_cons(primitive.get_slice(iv), layout, &mut u);
        for n in 0..layout.nu() {
            let f_lo = hydro.get(iv, n) + diffusive.get(iv, n);
            let f_hi = hydro.get(Axis::I.shift(iv, 1), n) + diffusive.get(Axis::I.shift(iv, 1), n);
            u[n] -= (f_hi - f_lo) * dt / dx;
        }
        state::cons_to_prim(&u, layout, gas, next.get_slice_mut(iv))
            .unwrap_or_else(|e| panic!("primitive recovery failed at {:?}: {}", iv, e));
    }

    State {
        iteration: iteration + 1,
        time: time + dt,
        primitive: fill_ghosts(&next, &valid),
    }
}




// ============================================================================
fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let mesh = Mesh { length: 1.0, num_zones: 400 };
    let layout = VarLayout::new(0, 2, 0);
    let gas = GammaLawGas::new(1.4, 287.0).with_transport(1.8e-5, 0.0, 0.026, 2.2e-5);

    let mut state = State {
        iteration: 0,
        time: 0.0,
        primitive: initial_primitive(&mesh, &layout, &gas),
    };

    while state.time < 5e-4 {
        state = advance(state, &mesh, &layout, &gas);

        if state.iteration % 20 == 0 {
            log::info!("[{}] t={:.3e}", state.iteration, state.time);
        }
    }

    let file = std::fs::File::create("state.cbor").unwrap();
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&state, &mut buffer).unwrap();
}
