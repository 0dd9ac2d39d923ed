//! Vapor dome and T-v / P-v diagram data.

use crate::error::{FluidError, FluidResult};
use crate::provider::PropertyProvider;
use crate::sampler::{SweepResult, sample_isobar_volumes, sample_isotherm};
use crate::saturation::SaturationEnvelope;
use crate::substance::Substance;
use crate::sweeps::{linear_points, log_points};
use pm_core::units::{Pressure, Temperature, k, pressure_pa, temperature_k};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, warn};

/// One saturation sample on the dome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomePoint {
    pub t_k: f64,
    pub p_pa: f64,
    /// Saturated liquid specific volume [m³/kg]
    pub v_f: f64,
    /// Saturated vapor specific volume [m³/kg]
    pub v_g: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomeOptions {
    /// Lowest saturation temperature. Defaults to the triple point (or the
    /// equation-of-state minimum, whichever is higher).
    pub t_start: Option<Temperature>,
    /// Number of samples below T_crit; the critical point is added on top.
    pub num_points: usize,
}

impl Default for DomeOptions {
    fn default() -> Self {
        Self {
            t_start: None,
            num_points: 60,
        }
    }
}

/// Saturated liquid and vapor lines from the triple point to the critical
/// point, closed by the critical point itself.
#[derive(Debug, Clone, PartialEq)]
pub struct VaporDome {
    substance: Substance,
    points: Vec<DomePoint>,
    truncated: bool,
}

/// Saturation temperatures from `t_start` toward `t_crit`, denser near the
/// top. `t_crit` itself is excluded.
pub fn dome_temperatures(t_start: f64, t_crit: f64, n: usize) -> Vec<f64> {
    let span = t_crit - t_start;
    (0..n)
        .map(|i| t_start + span * (FRAC_PI_2 * i as f64 / n as f64).sin())
        .collect()
}

impl VaporDome {
    pub fn sample<P>(provider: &mut P, options: &DomeOptions) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        if options.num_points < 2 {
            return Err(FluidError::invalid("dome needs at least 2 points"));
        }
        let critical = provider.critical_point();
        let t_crit = critical.temperature_k();
        let t_start = match options.t_start {
            Some(t) => temperature_k(t),
            None => {
                let (t_min, _) = provider.temperature_limits();
                temperature_k(provider.triple_point_temperature()).max(temperature_k(t_min))
            }
        };
        if !t_start.is_finite() || t_start <= 0.0 || t_start >= t_crit {
            return Err(FluidError::out_of_range(format!(
                "dome start {t_start} K must lie below the critical temperature {t_crit} K"
            )));
        }

        let substance = provider.substance();
        debug!(
            substance = %substance,
            t_start,
            t_crit,
            n = options.num_points,
            "sampling vapor dome"
        );

        let mut points = Vec::with_capacity(options.num_points + 1);
        let mut truncated = false;
        for t_k in dome_temperatures(t_start, t_crit, options.num_points) {
            match SaturationEnvelope::at_temperature(provider, k(t_k)) {
                Ok(env) => points.push(DomePoint {
                    t_k: env.t_sat_k(),
                    p_pa: env.p_sat_pa(),
                    v_f: env.v_f(),
                    v_g: env.v_g(),
                }),
                Err(err) if points.is_empty() => return Err(err),
                Err(err) => {
                    warn!(t_k, error = %err, "saturation failed; truncating dome");
                    truncated = true;
                    break;
                }
            }
        }

        let v_c = critical.specific_volume();
        points.push(DomePoint {
            t_k: t_crit,
            p_pa: critical.pressure_pa(),
            v_f: v_c,
            v_g: v_c,
        });

        Ok(Self {
            substance,
            points,
            truncated,
        })
    }

    pub fn substance(&self) -> Substance {
        self.substance
    }

    /// Samples in ascending temperature, the last one being the critical point.
    pub fn points(&self) -> &[DomePoint] {
        &self.points
    }

    /// True when sampling stopped early below the critical point.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn critical(&self) -> Option<&DomePoint> {
        self.points.last()
    }

    /// `(v_f, T)` from the lowest temperature up to the critical point.
    pub fn liquid_line(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.v_f, p.t_k)).collect()
    }

    /// `(v_g, T)` from the lowest temperature up to the critical point.
    pub fn vapor_line(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.v_g, p.t_k)).collect()
    }

    /// Single T-v polyline: liquid line up, vapor line back down.
    pub fn closed_curve(&self) -> Vec<(f64, f64)> {
        self.closed_by(|p| p.t_k)
    }

    /// Same as [`closed_curve`](Self::closed_curve) with pressure on the y axis.
    pub fn closed_curve_pv(&self) -> Vec<(f64, f64)> {
        self.closed_by(|p| p.p_pa)
    }

    fn closed_by(&self, y: impl Fn(&DomePoint) -> f64) -> Vec<(f64, f64)> {
        let mut curve: Vec<(f64, f64)> = self.points.iter().map(|p| (p.v_f, y(p))).collect();
        // The critical point is shared by both lines.
        curve.extend(self.points.iter().rev().skip(1).map(|p| (p.v_g, y(p))));
        curve
    }
}

/// Specific-volume range and resolution for isolines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    pub v_min: f64,
    pub v_max: f64,
    pub num_points: usize,
    pub logarithmic: bool,
}

impl Default for VolumeRange {
    fn default() -> Self {
        Self {
            v_min: 1.0e-3,
            v_max: 100.0,
            num_points: 200,
            logarithmic: true,
        }
    }
}

impl VolumeRange {
    fn points(&self) -> FluidResult<Vec<f64>> {
        if self.num_points < 2 {
            return Err(FluidError::invalid("isoline needs at least 2 points"));
        }
        if !(self.v_min.is_finite() && self.v_max.is_finite())
            || self.v_min <= 0.0
            || self.v_max <= self.v_min
        {
            return Err(FluidError::invalid(format!(
                "volume range [{}, {}] must be positive and increasing",
                self.v_min, self.v_max
            )));
        }
        Ok(if self.logarithmic {
            log_points(self.v_min, self.v_max, self.num_points)
        } else {
            linear_points(self.v_min, self.v_max, self.num_points)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TvDiagramOptions {
    pub dome: DomeOptions,
    pub isobars: Vec<Pressure>,
    pub volumes: VolumeRange,
}

/// Line of constant pressure or temperature across the diagram.
#[derive(Debug, Clone)]
pub struct Isoline {
    /// Fixed value in SI units (Pa or K)
    pub value: f64,
    pub sweep: SweepResult,
}

/// Dome plus isobars on T-v axes.
#[derive(Debug, Clone)]
pub struct TvDiagram {
    pub dome: VaporDome,
    pub isobars: Vec<Isoline>,
}

impl TvDiagram {
    pub fn build<P>(provider: &mut P, options: &TvDiagramOptions) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        let dome = VaporDome::sample(provider, &options.dome)?;
        let volumes = options.volumes.points()?;
        let mut isobars = Vec::with_capacity(options.isobars.len());
        for &p in &options.isobars {
            let sweep = sample_isobar_volumes(provider, p, &volumes)?;
            isobars.push(Isoline {
                value: pressure_pa(p),
                sweep,
            });
        }
        Ok(Self { dome, isobars })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PvDiagramOptions {
    pub dome: DomeOptions,
    pub isotherms: Vec<Temperature>,
    pub volumes: VolumeRange,
}

/// Dome plus isotherms on P-v axes.
#[derive(Debug, Clone)]
pub struct PvDiagram {
    pub dome: VaporDome,
    pub isotherms: Vec<Isoline>,
}

impl PvDiagram {
    pub fn build<P>(provider: &mut P, options: &PvDiagramOptions) -> FluidResult<Self>
    where
        P: PropertyProvider + ?Sized,
    {
        let dome = VaporDome::sample(provider, &options.dome)?;
        let volumes = options.volumes.points()?;
        let mut isotherms = Vec::with_capacity(options.isotherms.len());
        for &t in &options.isotherms {
            let sweep = sample_isotherm(provider, t, &volumes)?;
            isotherms.push(Isoline {
                value: temperature_k(t),
                sweep,
            });
        }
        Ok(Self { dome, isotherms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{Classifier, Phase};
    use crate::test_support::{self, ToyProvider};
    use pm_core::units::pa;

    #[test]
    fn temperatures_crowd_toward_critical() {
        let temps = dome_temperatures(300.0, 600.0, 20);
        assert_eq!(temps.len(), 20);
        assert_eq!(temps[0], 300.0);
        assert!(temps.iter().all(|&t| t < 600.0));
        let first_gap = temps[1] - temps[0];
        let last_gap = temps[19] - temps[18];
        assert!(last_gap < first_gap / 5.0);
    }

    #[test]
    fn dome_closes_at_critical_point() {
        let mut provider = ToyProvider::new();
        let dome = VaporDome::sample(&mut provider, &DomeOptions::default()).unwrap();

        assert!(!dome.is_truncated());
        assert_eq!(dome.points().len(), 61);
        let top = dome.critical().unwrap();
        assert_eq!(top.t_k, test_support::T_CRIT);
        assert_eq!(top.v_f, top.v_g);
        assert!(dome.points().iter().all(|p| p.v_f <= p.v_g));
        assert!(dome.points().windows(2).all(|w| w[0].t_k < w[1].t_k));
    }

    #[test]
    fn closed_curve_shares_the_top() {
        let mut provider = ToyProvider::new();
        let options = DomeOptions {
            t_start: Some(k(400.0)),
            num_points: 5,
        };
        let dome = VaporDome::sample(&mut provider, &options).unwrap();
        let curve = dome.closed_curve();
        assert_eq!(curve.len(), 2 * dome.points().len() - 1);
        assert_eq!(curve.first().map(|c| c.1), Some(400.0));
        assert_eq!(curve.last().map(|c| c.1), Some(400.0));
        assert_eq!(curve[5].1, test_support::T_CRIT);
        assert_eq!(dome.liquid_line().len(), 6);
        assert_eq!(dome.vapor_line()[0].0, dome.points()[0].v_g);
    }

    #[test]
    fn failure_near_critical_truncates() {
        let mut provider = ToyProvider::failing_near_critical(1.0);
        let dome = VaporDome::sample(&mut provider, &DomeOptions::default()).unwrap();
        assert!(dome.is_truncated());
        let points = dome.points();
        assert!(points.len() < 61);
        assert!(points.iter().all(|p| p.v_f.is_finite() && p.v_g.is_finite()));
        let below = &points[points.len() - 2];
        assert!(below.t_k < test_support::T_CRIT - 1.0);
        assert_eq!(points.last().map(|p| p.t_k), Some(test_support::T_CRIT));
    }

    #[test]
    fn start_above_critical_is_rejected() {
        let mut provider = ToyProvider::new();
        let options = DomeOptions {
            t_start: Some(k(650.0)),
            num_points: 10,
        };
        let err = VaporDome::sample(&mut provider, &options).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn tv_isobar_crosses_the_dome() {
        let mut provider = ToyProvider::new();
        let p = pa(test_support::p_sat(450.0));
        let options = TvDiagramOptions {
            dome: DomeOptions {
                t_start: None,
                num_points: 10,
            },
            isobars: vec![p],
            volumes: VolumeRange {
                v_min: 1.0e-3,
                v_max: 0.05,
                num_points: 30,
                logarithmic: true,
            },
        };
        let diagram = TvDiagram::build(&mut provider, &options).unwrap();
        assert_eq!(diagram.isobars.len(), 1);
        let isobar = &diagram.isobars[0].sweep;
        assert_eq!(isobar.num_failed, 0);

        let classifier = Classifier::default();
        let phases: Vec<Phase> = isobar
            .specific_volume_m3_kg()
            .iter()
            .map(|&v| classifier.at_pressure(&mut provider, p, v).unwrap())
            .collect();
        assert_eq!(phases.first(), Some(&Phase::CompressedLiquid));
        assert_eq!(phases.last(), Some(&Phase::SuperheatedVapor));
        assert!(phases.iter().any(|phase| phase.is_two_phase()));
    }

    #[test]
    fn pv_diagram_has_one_isotherm_per_temperature() {
        let mut provider = ToyProvider::new();
        let options = PvDiagramOptions {
            dome: DomeOptions {
                t_start: Some(k(350.0)),
                num_points: 8,
            },
            isotherms: vec![k(400.0), k(500.0), k(700.0)],
            volumes: VolumeRange {
                num_points: 12,
                ..VolumeRange::default()
            },
        };
        let diagram = PvDiagram::build(&mut provider, &options).unwrap();
        assert_eq!(diagram.isotherms.len(), 3);
        assert_eq!(diagram.isotherms[2].value, 700.0);
        assert!(
            diagram
                .isotherms
                .iter()
                .all(|iso| iso.sweep.samples.len() == 12)
        );
    }

    #[test]
    fn bad_volume_range_is_rejected() {
        let mut provider = ToyProvider::new();
        let options = PvDiagramOptions {
            isotherms: vec![k(400.0)],
            volumes: VolumeRange {
                v_min: 1.0,
                v_max: 0.5,
                num_points: 10,
                logarithmic: true,
            },
            ..PvDiagramOptions::default()
        };
        assert!(matches!(
            PvDiagram::build(&mut provider, &options),
            Err(FluidError::InvalidInput { .. })
        ));
    }
}
