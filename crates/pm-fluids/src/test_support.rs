//! Analytic stand-in provider for unit tests.
//!
//! A made-up substance with closed-form saturation curves, so classifier and
//! sampler logic can be checked without a real equation of state.

use crate::error::{FluidError, FluidResult};
use crate::provider::{CriticalPoint, PropertyProvider};
use crate::state::{StateInput, StateProperties, ThermoState};
use crate::substance::Substance;
use pm_core::units::{Temperature, k, kg_m3, pa, pressure_pa, temperature_k};

pub const T_CRIT: f64 = 600.0;
pub const P_CRIT: f64 = 20.0e6;
pub const V_CRIT: f64 = 0.003;
const A: f64 = 6.0;
const LIQUID_EXPANSION: f64 = 1.0e-2;
const LIQUID_STIFFNESS: f64 = 2.0e9;

pub struct ToyProvider {
    /// Queries closer than this to T_crit fail to converge.
    pub fail_near_critical_k: Option<f64>,
    pub queries: usize,
}

impl ToyProvider {
    pub fn new() -> Self {
        Self {
            fail_near_critical_k: None,
            queries: 0,
        }
    }

    pub fn failing_near_critical(band_k: f64) -> Self {
        Self {
            fail_near_critical_k: Some(band_k),
            queries: 0,
        }
    }
}

pub fn p_sat(t: f64) -> f64 {
    P_CRIT * (A * (1.0 - T_CRIT / t)).exp()
}

pub fn t_sat(p: f64) -> f64 {
    T_CRIT / (1.0 - (p / P_CRIT).ln() / A)
}

pub fn v_f(t: f64) -> f64 {
    V_CRIT * (1.0 - 0.6 * (1.0 - t / T_CRIT).max(0.0).powf(0.35))
}

pub fn v_g(t: f64) -> f64 {
    V_CRIT * (0.9 * A * (T_CRIT / t - 1.0)).exp() * t / T_CRIT
}

fn props(t: f64, p: f64, v: f64, quality: Option<f64>) -> StateProperties {
    let u = 4_000.0 * (t - 273.15) + quality.unwrap_or(0.0) * 2.0e6;
    StateProperties {
        t_k: t,
        p_pa: p,
        v_m3_kg: v,
        quality,
        u_j_kg: u,
        h_j_kg: u + p * v,
        s_j_kg_k: 4_000.0 * (t / 273.15).ln() + quality.unwrap_or(0.0) * 2.0e6 / t,
    }
}

impl ToyProvider {
    fn solve(&self, input: StateInput) -> FluidResult<StateProperties> {
        let sat_limit = |what: &str| FluidError::out_of_range(format!("{what} above critical"));
        let props = match input {
            StateInput::PQ { p, x } => {
                let p = pressure_pa(p);
                if p > P_CRIT {
                    return Err(sat_limit("pressure"));
                }
                let t = t_sat(p);
                let v = v_f(t) + x * (v_g(t) - v_f(t));
                props(t, p, v, Some(x))
            }
            StateInput::TQ { t, x } => {
                let t = temperature_k(t);
                if t > T_CRIT {
                    return Err(sat_limit("temperature"));
                }
                let v = v_f(t) + x * (v_g(t) - v_f(t));
                props(t, p_sat(t), v, Some(x))
            }
            StateInput::TV { t, v } => {
                let t = temperature_k(t);
                if t > T_CRIT {
                    props(t, P_CRIT * (V_CRIT / v) * (t / T_CRIT), v, None)
                } else {
                    let (vf, vg, ps) = (v_f(t), v_g(t), p_sat(t));
                    if v < vf {
                        props(t, ps + LIQUID_STIFFNESS * (vf - v) / vf, v, None)
                    } else if v > vg {
                        props(t, ps * vg / v, v, None)
                    } else {
                        props(t, ps, v, Some((v - vf) / (vg - vf)))
                    }
                }
            }
            StateInput::PV { p, v } => {
                let p = pressure_pa(p);
                if p > P_CRIT {
                    props(T_CRIT * p * v / (P_CRIT * V_CRIT), p, v, None)
                } else {
                    let ts = t_sat(p);
                    let (vf, vg) = (v_f(ts), v_g(ts));
                    if v < vf {
                        props(ts - (vf - v) / (vf * LIQUID_EXPANSION), p, v, None)
                    } else if v > vg {
                        props(ts * v / vg, p, v, None)
                    } else {
                        props(ts, p, v, Some((v - vf) / (vg - vf)))
                    }
                }
            }
            StateInput::PT { p, t } => {
                let (p, t) = (pressure_pa(p), temperature_k(t));
                if p >= P_CRIT {
                    props(t, p, V_CRIT * (P_CRIT / p) * (t / T_CRIT), None)
                } else {
                    let ts = t_sat(p);
                    if (t - ts).abs() < 1e-9 {
                        return Err(FluidError::invalid("P and T are not independent"));
                    } else if t < ts {
                        let v = v_f(t) * (1.0 - 1.0e-4 * (ts - t));
                        props(t, p, v, None)
                    } else {
                        props(t, p, v_g(ts) * t / ts, None)
                    }
                }
            }
            StateInput::PH { .. } | StateInput::PS { .. } => {
                return Err(FluidError::NotSupported {
                    what: "toy provider only handles T, P, v and x pairs".to_string(),
                });
            }
        };

        if let Some(band) = self.fail_near_critical_k
            && (props.t_k - T_CRIT).abs() < band
        {
            return Err(FluidError::ConvergenceFailed {
                what: format!("toy flash near critical point at {input}"),
            });
        }
        Ok(props)
    }
}

impl PropertyProvider for ToyProvider {
    fn name(&self) -> &str {
        "Toy"
    }

    fn substance(&self) -> Substance {
        Substance::Water
    }

    fn state(&mut self, input: StateInput) -> FluidResult<ThermoState> {
        self.queries += 1;
        input.validate()?;
        let props = self.solve(input)?;
        ThermoState::new(Substance::Water, props)
    }

    fn critical_point(&self) -> CriticalPoint {
        CriticalPoint {
            temperature: k(T_CRIT),
            pressure: pa(P_CRIT),
            density: kg_m3(1.0 / V_CRIT),
        }
    }

    fn triple_point_temperature(&self) -> Temperature {
        k(280.0)
    }

    fn temperature_limits(&self) -> (Temperature, Temperature) {
        (k(280.0), k(1500.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_curves_meet_at_critical() {
        assert!((p_sat(T_CRIT) - P_CRIT).abs() < 1e-6);
        assert!((v_f(T_CRIT) - V_CRIT).abs() < 1e-15);
        assert!((v_g(T_CRIT) - V_CRIT).abs() < 1e-15);
        assert!((t_sat(p_sat(450.0)) - 450.0).abs() < 1e-9);
    }

    #[test]
    fn vapor_line_falls_with_temperature() {
        assert!(v_g(400.0) > v_g(500.0));
        assert!(v_f(400.0) < v_f(500.0));
        assert!(v_f(400.0) < v_g(400.0));
    }
}
