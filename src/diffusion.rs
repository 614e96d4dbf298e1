use rayon::prelude::*;
use crate::eos::{GasModel, CLAM, CMU, CRHOD, CXI};
use crate::eos::num_transport_coefs;
use crate::index_space::{Axis, Index3, IndexSpace};
use crate::patch::Patch;
use crate::scheme::DiffusionOptions;
use crate::state::{qvel, umom, VarLayout, QTEMP, UEDEN, URHO};

// Tangential derivative slots on a face with normal n and tangents (t1, t2).
const TD_UT1_T1: usize = 0; // d(u_t1)/d(t1)
const TD_UT2_T2: usize = 1; // d(u_t2)/d(t2)
const TD_UN_T1: usize = 2;  // d(u_n)/d(t1)
const TD_UN_T2: usize = 3;  // d(u_n)/d(t2)
const NUM_TANDER: usize = 4;




fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a * b > 0.0 {
        2.0 * a * b / (a + b)
    } else {
        0.0
    }
}


/**
 * Move cell-centered transport coefficients to the faces of one
 * orientation, with the arithmetic mean or, on request, the harmonic mean.
 * The harmonic mean is the better-behaved choice when the coefficients vary
 * by orders of magnitude between neighbors, as they do across a flame
 * front; it degenerates to zero whenever the two cell values do not share a
 * sign.
 */
pub fn average_coefficients_to_faces(
    coef: &Patch,
    faces: &IndexSpace,
    axis: Axis,
    do_harmonic: bool,
) -> Patch {
    let nc = coef.num_fields();
    let k0 = faces.start().2;

    let mut out = Patch::zeros(nc, faces.clone());

    out.par_pencils_mut().for_each(|((i, j), pencil)| {
        for (n, face) in pencil.chunks_exact_mut(nc).enumerate() {
            let iv = (i, j, k0 + n as i64);
            let lo = coef.get_slice(axis.shift(iv, -1));
            let hi = coef.get_slice(iv);

            for (c, (a, b)) in face.iter_mut().zip(lo.iter().zip(hi)) {
                *c = if do_harmonic {
                    harmonic_mean(*a, *b)
                } else {
                    0.5 * (*a + *b)
                }
            }
        }
    });

    out
}


fn centered_tangential_derivative(
    q: &Patch,
    iv: Index3,
    normal: Axis,
    tangent: Axis,
    component: usize,
    spacing: f64,
) -> f64 {
    let behind = normal.shift(iv, -1);

    0.25 / spacing
        * (q.get(tangent.shift(iv, 1), component) + q.get(tangent.shift(behind, 1), component)
            - q.get(tangent.shift(iv, -1), component)
            - q.get(tangent.shift(behind, -1), component))
}


/**
 * Second-order-centered derivatives of the velocity components tangential
 * to each face normal, from the two cells adjacent to the face and their
 * tangential neighbors. These enter only the viscous stress, so callers
 * with velocity diffusion disabled use a zero patch instead.
 */
pub fn tangential_velocity_derivs(
    q: &Patch,
    faces: &IndexSpace,
    axis: Axis,
    deltas: (f64, f64, f64),
) -> Patch {
    let (t1, t2) = axis.tangential();
    let (d1, d2) = (t1.pick(deltas), t2.pick(deltas));
    let k0 = faces.start().2;

    let mut out = Patch::zeros(NUM_TANDER, faces.clone());

    out.par_pencils_mut().for_each(|((i, j), pencil)| {
        for (n, face) in pencil.chunks_exact_mut(NUM_TANDER).enumerate() {
            let iv = (i, j, k0 + n as i64);

            face[TD_UT1_T1] = centered_tangential_derivative(q, iv, axis, t1, qvel(t1), d1);
            face[TD_UT2_T2] = centered_tangential_derivative(q, iv, axis, t2, qvel(t2), d2);
            face[TD_UN_T1] = centered_tangential_derivative(q, iv, axis, t1, qvel(axis), d1);
            face[TD_UN_T2] = centered_tangential_derivative(q, iv, axis, t2, qvel(axis), d2);
        }
    });

    out
}




/**
 * Compute the physical diffusion flux (viscous stress, heat conduction,
 * species diffusion and the enthalpy it carries) through every face of
 * `valid` with normals along `axis`. The primitive patch must be
 * ghost-filled one cell beyond `valid` on every axis, and `area` supplies
 * the face area factor (possibly reduced by embedded geometry, which is
 * weighted by the caller, not here).
 *
 * Three phases run in strict dependency order: edge averaging of the
 * coefficients and the tangential derivative stencils are independent of
 * one another (and run concurrently), and the flux formula reads both.
 * When `diffuse_vel` is off the tangential derivatives are skipped and the
 * stress terms are omitted from the momentum and energy fluxes.
 */
pub fn diffusion_flux<G: GasModel>(
    q: &Patch,
    coef: &Patch,
    layout: &VarLayout,
    valid: &IndexSpace,
    axis: Axis,
    deltas: (f64, f64, f64),
    area: &Patch,
    opts: &DiffusionOptions,
    gas: &G,
) -> Patch {
    assert!(q.num_fields() == layout.nq(), "primitive patch does not match the variable layout");
    assert!(
        q.index_space().contains_space(&valid.extend_all(1)),
        "primitive patch does not cover the one-cell halo"
    );
    assert!(coef.num_fields() == num_transport_coefs(layout.num_species));
    assert!(area.num_fields() == 1);

    let faces = valid.extend_upper(1, axis);
    let do_vel = opts.diffuse_vel;

    log::debug!("diffusion flux on {} faces along {:?}", faces.len(), axis);

    let (face_coefs, tander) = rayon::join(
        || average_coefficients_to_faces(coef, &faces, axis, opts.do_harmonic),
        || {
            if do_vel {
                tangential_velocity_derivs(q, &faces, axis, deltas)
            } else {
                Patch::zeros(NUM_TANDER, faces.clone())
            }
        },
    );

    let nu = layout.nu();
    let ns = layout.num_species;
    let dninv = 1.0 / axis.pick(deltas);
    let (t1, t2) = axis.tangential();
    let k0 = faces.start().2;

    let mut flux = Patch::zeros(nu, faces.clone());

    flux.par_pencils_mut().for_each(|((i, j), pencil)| {
        let mut jk = vec![0.0; ns];
        let mut hk = vec![0.0; ns];

        for (n, f) in pencil.chunks_exact_mut(nu).enumerate() {
            let iv = (i, j, k0 + n as i64);
            let lo = q.get_slice(axis.shift(iv, -1));
            let hi = q.get_slice(iv);
            let cf = face_coefs.get_slice(iv);
            let td = tander.get_slice(iv);
            let a = area.get(iv, 0);

            let dtempdn = (hi[QTEMP] - lo[QTEMP]) * dninv;

            if do_vel {
                let dundn = (hi[qvel(axis)] - lo[qvel(axis)]) * dninv;
                let dut1dn = (hi[qvel(t1)] - lo[qvel(t1)]) * dninv;
                let dut2dn = (hi[qvel(t2)] - lo[qvel(t2)]) * dninv;
                let divu = dundn + td[TD_UT1_T1] + td[TD_UT2_T2];

                let tau_nn = cf[CMU] * (4.0 / 3.0 * dundn - 2.0 / 3.0 * (td[TD_UT1_T1] + td[TD_UT2_T2]))
                    + cf[CXI] * divu;
                let tau_nt1 = cf[CMU] * (dut1dn + td[TD_UN_T1]);
                let tau_nt2 = cf[CMU] * (dut2dn + td[TD_UN_T2]);

                let un_f = 0.5 * (lo[qvel(axis)] + hi[qvel(axis)]);
                let ut1_f = 0.5 * (lo[qvel(t1)] + hi[qvel(t1)]);
                let ut2_f = 0.5 * (lo[qvel(t2)] + hi[qvel(t2)]);

                f[umom(axis)] = -tau_nn * a;
                f[umom(t1)] = -tau_nt1 * a;
                f[umom(t2)] = -tau_nt2 * a;
                f[UEDEN] = -(un_f * tau_nn + ut1_f * tau_nt1 + ut2_f * tau_nt2) * a;
            }

            f[UEDEN] -= cf[CLAM] * dtempdn * a;

            // Fickian species fluxes, corrected so they sum to zero, with
            // the enthalpy they carry added to the energy flux.
            let temp_f = 0.5 * (lo[QTEMP] + hi[QTEMP]);
            gas.species_enthalpies(temp_f, &mut hk);

            let mut correction = 0.0;
            for s in 0..ns {
                let n = layout.qfs() + s;
                let dydn = (hi[n] - lo[n]) * dninv;
                jk[s] = -cf[CRHOD + s] * dydn;
                correction += jk[s];
            }

            let mut mass_flux = 0.0;
            for s in 0..ns {
                let n = layout.qfs() + s;
                let y_f = 0.5 * (lo[n] + hi[n]);
                let j_corrected = (jk[s] - y_f * correction) * a;

                f[layout.ufs() + s] = j_corrected;
                f[UEDEN] += hk[s] * j_corrected;
                mass_flux += j_corrected;
            }
            f[URHO] = mass_flux;
        }
    });

    flux
}




// ============================================================================
#[cfg(test)]
mod test {
    use crate::eos::{GammaLawGas, GasModel, CRHOD};
    use crate::eos::num_transport_coefs;
    use crate::index_space::{range3d, Axis};
    use crate::patch::Patch;
    use crate::scheme::DiffusionOptions;
    use crate::state::{VarLayout, QPRES, QREINT, QRHO, QTEMP, QU, QV, UEDEN, UMY, URHO};
    use super::{average_coefficients_to_faces, diffusion_flux, tangential_velocity_derivs};

    /// Gas with distinct constant diffusivities per species, to exercise
    /// the correction velocity.
    struct TwoSpeciesGas {
        inner: GammaLawGas,
        diffusivities: [f64; 2],
    }

    impl GasModel for TwoSpeciesGas {
        fn pressure(&self, rho: f64, temp: f64, y: &[f64]) -> f64 {
            self.inner.pressure(rho, temp, y)
        }
        fn sound_speed(&self, rho: f64, temp: f64, y: &[f64]) -> f64 {
            self.inner.sound_speed(rho, temp, y)
        }
        fn temperature_from_energy(&self, rho: f64, e: f64, y: &[f64]) -> f64 {
            self.inner.temperature_from_energy(rho, e, y)
        }
        fn species_enthalpies(&self, temp: f64, h: &mut [f64]) {
            self.inner.species_enthalpies(temp, h)
        }
        fn transport(&self, temp: f64, rho: f64, y: &[f64], coefs: &mut [f64]) {
            self.inner.transport(temp, rho, y, coefs);
            for (s, d) in self.diffusivities.iter().enumerate() {
                coefs[CRHOD + s] = rho * d
            }
        }
    }

    fn uniform_patch(layout: &VarLayout, space: &crate::index_space::IndexSpace) -> Patch {
        Patch::from_slice_function(space.clone(), layout.nq(), |_, s| {
            s[QRHO] = 1.2;
            s[QU] = 0.0;
            s[QPRES] = 1.2 * 287.0 * 300.0;
            s[QREINT] = 1.2 * 287.0 * 300.0 / 0.4;
            s[QTEMP] = 300.0;
            s[layout.qfs()] = 0.5;
            s[layout.qfs() + 1] = 0.5;
        })
    }

    fn coef_patch<G: GasModel>(q: &Patch, layout: &VarLayout, gas: &G) -> Patch {
        Patch::from_slice_function(q.index_space().clone(), num_transport_coefs(layout.num_species), |iv, c| {
            let s = q.get_slice(iv);
            let y = &s[layout.qfs() .. layout.qfs() + layout.num_species];
            gas.transport(s[QTEMP], s[QRHO], y, c)
        })
    }

    #[test]
    fn uniform_fields_produce_exactly_zero_flux() {
        let layout = VarLayout::new(0, 2, 0);
        let gas = GammaLawGas::new(1.4, 287.0).with_transport(1e-5, 1e-5, 0.026, 2e-5);
        let valid = range3d(0..4, 0..4, 0..4);
        let q = uniform_patch(&layout, &valid.extend_all(1));
        let coef = coef_patch(&q, &layout, &gas);

        for &do_harmonic in &[false, true] {
            for &axis in &Axis::all() {
                let faces = valid.extend_upper(1, axis);
                let area = Patch::from_scalar_function(faces, |_| 1e-4);
                let opts = DiffusionOptions { do_harmonic, diffuse_vel: true };
                let flux = diffusion_flux(&q, &coef, &layout, &valid, axis, (0.01, 0.01, 0.01), &area, &opts, &gas);

                for face in flux.index_space().clone().iter() {
                    for n in 0..layout.nu() {
                        assert_eq!(flux.get(face, n), 0.0, "axis {:?} component {}", axis, n);
                    }
                }
            }
        }
    }

    #[test]
    fn averaging_modes_agree_for_equal_neighbors() {
        let coef = Patch::from_slice_function(range3d(-1..5, 0..1, 0..1), 2, |_, c| {
            c[0] = 3.5;
            c[1] = 0.07;
        });
        let faces = range3d(0..5, 0..1, 0..1);
        let arith = average_coefficients_to_faces(&coef, &faces, Axis::I, false);
        let harm = average_coefficients_to_faces(&coef, &faces, Axis::I, true);

        for face in faces.iter() {
            assert_eq!(arith.get_slice(face), harm.get_slice(face));
        }
    }

    #[test]
    fn harmonic_mean_vanishes_on_sign_changes() {
        let coef = Patch::from_slice_function(range3d(-1..2, 0..1, 0..1), 1, |(i, _, _), c| {
            c[0] = if i < 1 { -2.0 } else { 2.0 }
        });
        let faces = range3d(1..2, 0..1, 0..1);
        let harm = average_coefficients_to_faces(&coef, &faces, Axis::I, true);
        assert_eq!(harm.get((1, 0, 0), 0), 0.0);
    }

    #[test]
    fn tangential_derivatives_see_a_linear_shear() {
        let layout = VarLayout::new(0, 1, 0);
        // u = 2 y: the only nonzero tangential derivative at an I-face is
        // d(u_n)/d(t1) = 2.
        let q = Patch::from_slice_function(range3d(-1..4, -1..4, -1..4), layout.nq(), |(_i, j, _k), s| {
            s[QRHO] = 1.0;
            s[QU] = 2.0 * j as f64;
            s[QTEMP] = 300.0;
            s[layout.qfs()] = 1.0;
        });
        let faces = range3d(0..3, 0..3, 0..3);
        let td = tangential_velocity_derivs(&q, &faces, Axis::I, (1.0, 1.0, 1.0));

        for face in faces.iter() {
            assert!((td.get(face, super::TD_UN_T1) - 2.0).abs() < 1e-12);
            assert_eq!(td.get(face, super::TD_UT1_T1), 0.0);
            assert_eq!(td.get(face, super::TD_UT2_T2), 0.0);
            assert_eq!(td.get(face, super::TD_UN_T2), 0.0);
        }
    }

    #[test]
    fn conduction_flux_matches_the_linear_profile() {
        let layout = VarLayout::new(0, 1, 0);
        let lam = 0.026;
        let gas = GammaLawGas::new(1.4, 287.0).with_transport(0.0, 0.0, lam, 0.0);
        let valid = range3d(0..4, 0..2, 0..2);
        let dx = 0.01;
        let q = Patch::from_slice_function(valid.extend_all(1), layout.nq(), |(i, _j, _k), s| {
            let temp = 300.0 + 10.0 * i as f64;
            s[QRHO] = 1.0;
            s[QPRES] = 287.0 * temp;
            s[QREINT] = 287.0 * temp / 0.4;
            s[QTEMP] = temp;
            s[layout.qfs()] = 1.0;
        });
        let coef = coef_patch(&q, &layout, &gas);
        let faces = valid.extend_upper(1, Axis::I);
        let area = Patch::from_scalar_function(faces, |_| 1.0);
        let opts = DiffusionOptions { do_harmonic: false, diffuse_vel: true };
        let flux = diffusion_flux(&q, &coef, &layout, &valid, Axis::I, (dx, dx, dx), &area, &opts, &gas);

        for face in flux.index_space().clone().iter() {
            assert!((flux.get(face, UEDEN) - (-lam * 10.0 / dx)).abs() < 1e-9);
            assert_eq!(flux.get(face, URHO), 0.0);
        }
    }

    #[test]
    fn couette_shear_produces_the_expected_tangential_stress() {
        let layout = VarLayout::new(0, 1, 0);
        let mu = 1.8e-5;
        let gas = GammaLawGas::new(1.4, 287.0).with_transport(mu, 0.0, 0.0, 0.0);
        let valid = range3d(0..4, 0..2, 0..2);
        let dx = 0.1;
        // v = 3 x: a pure shear du_t1/dn at I-faces.
        let q = Patch::from_slice_function(valid.extend_all(1), layout.nq(), |(i, _j, _k), s| {
            s[QRHO] = 1.0;
            s[QV] = 3.0 * i as f64 * dx;
            s[QPRES] = 287.0 * 300.0;
            s[QREINT] = 287.0 * 300.0 / 0.4;
            s[QTEMP] = 300.0;
            s[layout.qfs()] = 1.0;
        });
        let coef = coef_patch(&q, &layout, &gas);
        let faces = valid.extend_upper(1, Axis::I);
        let area = Patch::from_scalar_function(faces, |_| 1.0);
        let opts = DiffusionOptions { do_harmonic: true, diffuse_vel: true };
        let flux = diffusion_flux(&q, &coef, &layout, &valid, Axis::I, (dx, dx, dx), &area, &opts, &gas);

        for face in flux.index_space().clone().iter() {
            assert!((flux.get(face, UMY) - (-mu * 3.0)).abs() < 1e-12);
        }

        // Disabling velocity diffusion removes the stress entirely.
        let opts = DiffusionOptions { do_harmonic: true, diffuse_vel: false };
        let flux = diffusion_flux(&q, &coef, &layout, &valid, Axis::I, (dx, dx, dx), &area, &opts, &gas);
        for face in flux.index_space().clone().iter() {
            assert_eq!(flux.get(face, UMY), 0.0);
        }
    }

    #[test]
    fn species_diffusion_fluxes_sum_to_zero() {
        let layout = VarLayout::new(0, 2, 0);
        let gas = TwoSpeciesGas {
            inner: GammaLawGas::new(1.4, 287.0),
            diffusivities: [3e-5, 8e-5],
        };
        let valid = range3d(0..5, 0..2, 0..2);
        let q = Patch::from_slice_function(valid.extend_all(1), layout.nq(), |(i, _j, _k), s| {
            let y0 = 0.2 + 0.05 * i as f64;
            s[QRHO] = 1.2;
            s[QPRES] = 1.2 * 287.0 * 300.0;
            s[QREINT] = 1.2 * 287.0 * 300.0 / 0.4;
            s[QTEMP] = 300.0;
            s[layout.qfs()] = y0;
            s[layout.qfs() + 1] = 1.0 - y0;
        });
        let coef = coef_patch(&q, &layout, &gas);
        let faces = valid.extend_upper(1, Axis::I);
        let area = Patch::from_scalar_function(faces, |_| 1.0);
        let opts = DiffusionOptions::default();
        let flux = diffusion_flux(&q, &coef, &layout, &valid, Axis::I, (0.01, 0.01, 0.01), &area, &opts, &gas);

        for face in flux.index_space().clone().iter() {
            let f0 = flux.get(face, layout.ufs());
            let f1 = flux.get(face, layout.ufs() + 1);
            assert!(f0 != 0.0 && f1 != 0.0);
            assert!((f0 + f1).abs() < 1e-12 * f0.abs().max(f1.abs()));
            assert!((flux.get(face, URHO)).abs() < 1e-12 * f0.abs());
        }
    }

    #[test]
    fn bulk_viscosity_alone_does_nothing_without_velocity_gradients() {
        let layout = VarLayout::new(0, 1, 0);
        let gas = GammaLawGas::new(1.4, 287.0).with_transport(0.0, 5e-5, 0.0, 0.0);
        let valid = range3d(0..3, 0..3, 0..3);
        let q = Patch::from_slice_function(valid.extend_all(1), layout.nq(), |_, s| {
            s[QRHO] = 1.0;
            s[QPRES] = 287.0 * 300.0;
            s[QREINT] = 287.0 * 300.0 / 0.4;
            s[QTEMP] = 300.0;
            s[layout.qfs()] = 1.0;
        });
        let coef = coef_patch(&q, &layout, &gas);
        let faces = valid.extend_upper(1, Axis::J);
        let area = Patch::from_scalar_function(faces, |_| 1.0);
        let flux = diffusion_flux(&q, &coef, &layout, &valid, Axis::J, (0.01, 0.01, 0.01), &area, &DiffusionOptions::default(), &gas);

        for face in flux.index_space().clone().iter() {
            for n in 0..layout.nu() {
                assert_eq!(flux.get(face, n), 0.0);
            }
        }
    }
}
