//! Saturation envelope: v_f and v_g at a fixed pressure or temperature.

use crate::error::{FluidError, FluidResult};
use crate::provider::PropertyProvider;
use crate::state::{StateInput, validation};
use pm_core::numeric::{Tolerances, lerp, nearly_equal};
use pm_core::units::{Pressure, SpecVolume, Temperature, k, pa, pressure_pa, temperature_k};
use std::fmt;

/// Which property was held fixed when the envelope was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationBasis {
    Pressure,
    Temperature,
}

/// Saturated liquid and vapor specific volumes at one saturation condition.
///
/// Invariant: `v_f <= v_g`, equal only at the critical point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationEnvelope {
    basis: SaturationBasis,
    t_sat_k: f64,
    p_sat_pa: f64,
    v_f: SpecVolume,
    v_g: SpecVolume,
}

impl SaturationEnvelope {
    /// Build an envelope from raw values, enforcing `0 < v_f <= v_g`.
    pub fn new(
        basis: SaturationBasis,
        t_sat_k: f64,
        p_sat_pa: f64,
        v_f: SpecVolume,
        v_g: SpecVolume,
    ) -> FluidResult<Self> {
        validation::validate_temperature(k(t_sat_k))?;
        validation::validate_pressure(pa(p_sat_pa))?;
        validation::validate_volume(v_f)?;
        validation::validate_volume(v_g)?;
        if v_f > v_g {
            return Err(FluidError::ConvergenceFailed {
                what: format!(
                    "saturated liquid volume {v_f} exceeds vapor volume {v_g} at T={t_sat_k} K"
                ),
            });
        }
        Ok(Self {
            basis,
            t_sat_k,
            p_sat_pa,
            v_f,
            v_g,
        })
    }

    /// Envelope at pressure `p`.
    ///
    /// At P_crit the envelope collapses to v_crit; above it there is no
    /// envelope and the query reports `OutOfRange`.
    pub fn at_pressure<P>(provider: &mut P, p: Pressure) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        validation::validate_pressure(p)?;
        let critical = provider.critical_point();
        let p_pa = pressure_pa(p);
        let tol = Tolerances::property();

        if critical.is_above_pressure(p_pa, tol) {
            return Err(FluidError::out_of_range(format!(
                "P={p_pa} Pa is above the critical pressure {} Pa; no saturation envelope",
                critical.pressure_pa()
            )));
        }
        if critical.is_at_pressure(p_pa, tol) {
            let v_c = critical.specific_volume();
            return Self::new(
                SaturationBasis::Pressure,
                critical.temperature_k(),
                critical.pressure_pa(),
                v_c,
                v_c,
            );
        }

        let liquid = provider.state(StateInput::PQ { p, x: 0.0 })?;
        let (t_sat_k, v_f) = (liquid.temperature_k(), liquid.specific_volume());
        let vapor = provider.state(StateInput::PQ { p, x: 1.0 })?;
        Self::new(
            SaturationBasis::Pressure,
            t_sat_k,
            p_pa,
            v_f,
            vapor.specific_volume(),
        )
    }

    /// Envelope at temperature `t`.
    ///
    /// At T_crit the envelope collapses to v_crit; above it there is no
    /// envelope and the query reports `OutOfRange`.
    pub fn at_temperature<P>(provider: &mut P, t: Temperature) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        validation::validate_temperature(t)?;
        let critical = provider.critical_point();
        let t_k = temperature_k(t);
        let tol = Tolerances::property();

        if critical.is_above_temperature(t_k, tol) {
            return Err(FluidError::out_of_range(format!(
                "T={t_k} K is above the critical temperature {} K; no saturation envelope",
                critical.temperature_k()
            )));
        }
        if critical.is_at_temperature(t_k, tol) {
            let v_c = critical.specific_volume();
            return Self::new(
                SaturationBasis::Temperature,
                critical.temperature_k(),
                critical.pressure_pa(),
                v_c,
                v_c,
            );
        }

        let liquid = provider.state(StateInput::TQ { t, x: 0.0 })?;
        let (p_sat_pa, v_f) = (liquid.pressure_pa(), liquid.specific_volume());
        let vapor = provider.state(StateInput::TQ { t, x: 1.0 })?;
        Self::new(
            SaturationBasis::Temperature,
            t_k,
            p_sat_pa,
            v_f,
            vapor.specific_volume(),
        )
    }

    pub fn basis(&self) -> SaturationBasis {
        self.basis
    }

    pub fn saturation_temperature(&self) -> Temperature {
        k(self.t_sat_k)
    }

    pub fn saturation_pressure(&self) -> Pressure {
        pa(self.p_sat_pa)
    }

    pub fn t_sat_k(&self) -> f64 {
        self.t_sat_k
    }

    pub fn p_sat_pa(&self) -> f64 {
        self.p_sat_pa
    }

    /// Saturated liquid specific volume [m³/kg].
    pub fn v_f(&self) -> SpecVolume {
        self.v_f
    }

    /// Saturated vapor specific volume [m³/kg].
    pub fn v_g(&self) -> SpecVolume {
        self.v_g
    }

    /// v_fg = v_g - v_f
    pub fn width(&self) -> f64 {
        self.v_g - self.v_f
    }

    /// True at the critical point, where liquid and vapor coincide.
    pub fn is_collapsed(&self, tol: Tolerances) -> bool {
        nearly_equal(self.v_f, self.v_g, tol)
    }

    pub fn contains(&self, v: SpecVolume) -> bool {
        (self.v_f..=self.v_g).contains(&v)
    }

    /// Quality of a state with volume `v`, or `None` off the envelope (and on
    /// a collapsed one, where quality is undefined).
    pub fn quality_of(&self, v: SpecVolume) -> Option<f64> {
        let slack = f64::EPSILON * 4.0 * self.v_g;
        if v < self.v_f - slack || v > self.v_g + slack || self.width() <= 0.0 {
            return None;
        }
        Some(((v - self.v_f) / self.width()).clamp(0.0, 1.0))
    }

    /// v = v_f + x·(v_g − v_f)
    pub fn volume_at_quality(&self, x: f64) -> FluidResult<SpecVolume> {
        validation::validate_quality(x)?;
        Ok(lerp(self.v_f, self.v_g, x))
    }
}

impl fmt::Display for SaturationEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T_sat={:.3} K, P_sat={:.1} Pa, v_f={:.6e} m3/kg, v_g={:.6e} m3/kg",
            self.t_sat_k, self.p_sat_pa, self.v_f, self.v_g
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, ToyProvider};
    use proptest::prelude::*;

    #[test]
    fn envelope_at_pressure_matches_curves() {
        let mut provider = ToyProvider::new();
        let p = test_support::p_sat(450.0);
        let env = SaturationEnvelope::at_pressure(&mut provider, pa(p)).unwrap();
        assert!((env.t_sat_k() - 450.0).abs() < 1e-6);
        assert!((env.v_f() - test_support::v_f(450.0)).abs() < 1e-12);
        assert!((env.v_g() - test_support::v_g(450.0)).abs() < 1e-9);
        assert_eq!(env.basis(), SaturationBasis::Pressure);
        assert_eq!(provider.queries, 2);
    }

    #[test]
    fn envelope_at_temperature_reports_pressure() {
        let mut provider = ToyProvider::new();
        let env = SaturationEnvelope::at_temperature(&mut provider, k(400.0)).unwrap();
        assert!((env.p_sat_pa() - test_support::p_sat(400.0)).abs() < 1e-6);
        assert!(env.v_f() < env.v_g());
    }

    #[test]
    fn envelope_collapses_at_critical() {
        let mut provider = ToyProvider::new();
        let env =
            SaturationEnvelope::at_temperature(&mut provider, k(test_support::T_CRIT)).unwrap();
        assert!(env.is_collapsed(Tolerances::default()));
        assert_eq!(env.v_f(), env.v_g());
        assert!((env.v_f() - test_support::V_CRIT).abs() < 1e-12);
        assert_eq!(env.quality_of(env.v_f()), None);
        assert_eq!(provider.queries, 0);
    }

    #[test]
    fn above_critical_is_out_of_range() {
        let mut provider = ToyProvider::new();
        let err = SaturationEnvelope::at_pressure(&mut provider, pa(25e6)).unwrap_err();
        assert!(matches!(err, FluidError::OutOfRange { .. }));
        let err = SaturationEnvelope::at_temperature(&mut provider, k(650.0)).unwrap_err();
        assert!(matches!(err, FluidError::OutOfRange { .. }));
    }

    #[test]
    fn inverted_envelope_is_rejected() {
        let err =
            SaturationEnvelope::new(SaturationBasis::Pressure, 400.0, 1e5, 0.5, 0.4).unwrap_err();
        assert!(matches!(err, FluidError::ConvergenceFailed { .. }));
    }

    #[test]
    fn quality_outside_envelope_is_none() {
        let env =
            SaturationEnvelope::new(SaturationBasis::Pressure, 400.0, 1e5, 0.001, 1.0).unwrap();
        assert_eq!(env.quality_of(0.0005), None);
        assert_eq!(env.quality_of(2.0), None);
        assert_eq!(env.quality_of(0.001), Some(0.0));
        assert_eq!(env.quality_of(1.0), Some(1.0));
        assert!(env.volume_at_quality(1.2).is_err());
    }

    proptest! {
        #[test]
        fn liquid_volume_never_exceeds_vapor(t in 300.0f64..599.0) {
            let mut provider = ToyProvider::new();
            let p = test_support::p_sat(t);
            let env = SaturationEnvelope::at_pressure(&mut provider, pa(p)).unwrap();
            prop_assert!(env.v_f() < env.v_g());
        }

        #[test]
        fn quality_round_trips(x in 0.0f64..=1.0, t in 300.0f64..590.0) {
            let env = SaturationEnvelope::new(
                SaturationBasis::Temperature,
                t,
                test_support::p_sat(t),
                test_support::v_f(t),
                test_support::v_g(t),
            )
            .unwrap();
            let v = env.volume_at_quality(x).unwrap();
            prop_assert_eq!(v, env.v_f() + x * (env.v_g() - env.v_f()));
            let back = env.quality_of(v).unwrap();
            prop_assert!((back - x).abs() < 1e-9);
        }
    }
}
