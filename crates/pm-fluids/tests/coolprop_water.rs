//! CoolProp integration tests on water.
//!
//! Broad tolerances to ride out backend version differences, strict physics.

use pm_core::units::{degc, k, kpa, mpa, pa};
use pm_fluids::{
    Classifier, CoolPropProvider, DomeOptions, FluidError, Phase, PropertyProvider,
    SaturationEnvelope, StateInput, Substance, VaporDome, classify_at_pressure,
    classify_at_temperature, classify_state, sample_isobar, sample_isobar_volumes,
};
use proptest::prelude::*;

fn water() -> CoolPropProvider {
    CoolPropProvider::new(Substance::Water).unwrap()
}

#[test]
fn compressed_liquid_at_25c() {
    let mut provider = water();
    let phase = classify_at_temperature(&mut provider, degc(25.0), 0.001001).unwrap();
    assert_eq!(phase, Phase::CompressedLiquid);
}

#[test]
fn superheated_vapor_at_1mpa() {
    let mut provider = water();
    let env = SaturationEnvelope::at_pressure(&mut provider, mpa(1.0)).unwrap();
    // Steam tables: v_g(1 MPa) = 0.1944 m³/kg, T_sat = 179.9 °C
    assert!((env.v_g() - 0.1944).abs() < 2e-3, "v_g = {}", env.v_g());
    assert!((env.t_sat_k() - 453.03).abs() < 0.1);

    let phase = classify_at_pressure(&mut provider, mpa(1.0), 0.32).unwrap();
    assert_eq!(phase, Phase::SuperheatedVapor);
}

#[test]
fn mixture_at_50c() {
    let mut provider = water();
    let phase = classify_at_temperature(&mut provider, degc(50.0), 10.0).unwrap();
    let x = phase.quality().expect("two-phase state has a quality");
    assert!(phase.is_two_phase());
    // v_g(50 °C) = 12.03 m³/kg
    assert!((x - 0.831).abs() < 0.01, "x = {x}");
}

#[test]
fn envelope_collapses_at_critical_point() {
    let mut provider = water();
    let critical = provider.critical_point();
    let env = SaturationEnvelope::at_temperature(&mut provider, critical.temperature).unwrap();
    assert_eq!(env.v_f(), env.v_g());
    assert!((env.v_f() - critical.specific_volume()).abs() < 1e-12);

    let phase = Classifier::default()
        .at_temperature(&mut provider, critical.temperature, critical.specific_volume())
        .unwrap();
    assert_eq!(phase, Phase::Supercritical);
}

#[test]
fn envelope_narrows_toward_critical_point() {
    let mut provider = water();
    let low = SaturationEnvelope::at_pressure(&mut provider, mpa(1.0)).unwrap();
    let high = SaturationEnvelope::at_pressure(&mut provider, mpa(21.0)).unwrap();
    assert!(high.width() < low.width());
    assert!(high.v_f() < high.v_g());
}

#[test]
fn above_critical_is_supercritical() {
    let mut provider = water();
    // 700 K at 500 kg/m³ is well above 22 MPa
    assert_eq!(
        classify_at_temperature(&mut provider, k(700.0), 0.002).unwrap(),
        Phase::Supercritical
    );
    // 25 MPa at 0.01 m³/kg is around 740 K
    assert_eq!(
        classify_at_pressure(&mut provider, mpa(25.0), 0.01).unwrap(),
        Phase::Supercritical
    );
    let err = SaturationEnvelope::at_pressure(&mut provider, mpa(25.0)).unwrap_err();
    assert!(err.is_out_of_range());
}

#[test]
fn one_critical_property_alone_is_not_supercritical() {
    let mut provider = water();
    // 25 MPa at 0.0012 m³/kg is liquid around 230 °C
    assert_eq!(
        classify_at_pressure(&mut provider, mpa(25.0), 0.0012).unwrap(),
        Phase::CompressedLiquid
    );
    // 700 K at 1 m³/kg is low-pressure steam
    assert_eq!(
        classify_at_temperature(&mut provider, k(700.0), 1.0).unwrap(),
        Phase::SuperheatedVapor
    );
}

#[test]
fn textbook_states_classify_the_same_from_every_entry_point() {
    let mut provider = water();
    let cases = [
        (
            StateInput::TV {
                t: degc(25.0),
                v: 0.001001,
            },
            Phase::CompressedLiquid.rank(),
        ),
        (
            StateInput::PV {
                p: mpa(1.0),
                v: 0.32,
            },
            Phase::SuperheatedVapor.rank(),
        ),
        (
            StateInput::TV {
                t: degc(50.0),
                v: 10.0,
            },
            Phase::SaturatedMixture { quality: 0.0 }.rank(),
        ),
    ];

    for (input, expected) in cases {
        let direct = match input {
            StateInput::PV { p, v } => classify_at_pressure(&mut provider, p, v).unwrap(),
            StateInput::TV { t, v } => classify_at_temperature(&mut provider, t, v).unwrap(),
            _ => unreachable!(),
        };
        let state = provider.state(input).unwrap();
        let captured = classify_state(&mut provider, &state).unwrap();

        assert_eq!(direct.rank(), expected, "{input}");
        assert_eq!(captured.rank(), expected, "{input}");
        if let (Some(a), Some(b)) = (direct.quality(), captured.quality()) {
            assert!((a - b).abs() < 1e-4, "{input}: x = {a} vs {b}");
        }
    }
}

#[test]
fn isobar_below_triple_point_pressure_resolves() {
    let mut provider = water();
    let temps: Vec<f64> = (0..8).map(|i| 280.0 + 20.0 * i as f64).collect();
    let sweep = sample_isobar(&mut provider, pa(500.0), &temps).unwrap();
    assert_eq!(sweep.num_failed, 0, "{:?}", sweep.failures());
    assert!(sweep.quality().iter().all(|x| x.is_nan()));
}

#[test]
fn negative_volume_is_invalid_input() {
    let mut provider = water();
    let err = classify_at_pressure(&mut provider, mpa(1.0), -0.1).unwrap_err();
    assert!(matches!(err, FluidError::InvalidInput { .. }));
}

#[test]
fn density_is_inverse_volume() {
    let mut provider = water();
    let state = provider
        .state(StateInput::PT {
            p: pa(101_325.0),
            t: k(300.0),
        })
        .unwrap();
    assert!((state.density_kg_m3() * state.specific_volume() - 1.0).abs() < 1e-12);
    assert!(state.density_kg_m3() > 990.0 && state.density_kg_m3() < 1000.0);
    assert_eq!(state.quality(), None);
}

#[test]
fn isobar_sweep_reports_phases_in_order() {
    let mut provider = water();
    let p = kpa(100.0);
    let volumes: Vec<f64> = (0..40)
        .map(|i| 1.01e-3 * 10f64.powf(i as f64 * 3.5 / 39.0))
        .collect();
    let sweep = sample_isobar_volumes(&mut provider, p, &volumes).unwrap();
    assert_eq!(sweep.num_failed, 0);

    let classifier = Classifier::default();
    let ranks: Vec<u8> = sweep
        .specific_volume_m3_kg()
        .iter()
        .map(|&v| classifier.at_pressure(&mut provider, p, v).unwrap().rank())
        .collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{ranks:?}");
    assert_eq!(ranks.first(), Some(&0));
    assert_eq!(ranks.last(), Some(&4));
}

#[test]
fn sweep_through_saturation_temperature_records_failure() {
    let mut provider = water();
    let p = kpa(101.325);
    let t_sat = SaturationEnvelope::at_pressure(&mut provider, p)
        .unwrap()
        .t_sat_k();
    let sweep = sample_isobar(&mut provider, p, &[300.0, t_sat, 400.0]).unwrap();
    assert_eq!(sweep.samples.len(), 3);
    assert_eq!(sweep.num_failed, 1);
    assert!(matches!(
        sweep.samples[1].error(),
        Some(FluidError::InvalidInput { .. })
    ));
    assert_eq!(sweep.temperature_k().len(), 2);
}

#[test]
fn water_dome_is_closed() {
    let mut provider = water();
    let dome = VaporDome::sample(
        &mut provider,
        &DomeOptions {
            t_start: None,
            num_points: 40,
        },
    )
    .unwrap();
    let points = dome.points();
    assert!(points.len() >= 30);
    assert!(points.iter().all(|p| p.v_f <= p.v_g));
    let top = dome.critical().unwrap();
    assert!((top.t_k - 647.096).abs() < 0.01);
    assert_eq!(top.v_f, top.v_g);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn saturated_liquid_never_exceeds_vapor(p_kpa in 1.0f64..22_000.0) {
        let mut provider = water();
        let env = SaturationEnvelope::at_pressure(&mut provider, kpa(p_kpa)).unwrap();
        prop_assert!(env.v_f() < env.v_g());
    }

    #[test]
    fn quality_round_trip(p_kpa in 5.0f64..20_000.0, x in 0.0f64..=1.0) {
        let mut provider = water();
        let env = SaturationEnvelope::at_pressure(&mut provider, kpa(p_kpa)).unwrap();
        let v = env.volume_at_quality(x).unwrap();
        let back = env.quality_of(v).unwrap();
        prop_assert!((back - x).abs() < 1e-9, "x={x} back={back}");
    }
}
