//! Asymptotic complexity fitting over a benchmark family.

use pacebench_core::{BigO, BigOFunc};
use pacebench_report::Run;

/// Result of fitting one curve to the measured points.
#[derive(Debug, Clone, Copy)]
struct LeastSq {
    coef: f64,
    rms: f64,
    complexity: BigO,
}

/// The shape function for a named curve.
fn fitting_curve(complexity: BigO) -> BigOFunc {
    match complexity {
        BigO::ON => |n| n as f64,
        BigO::ON2 => |n| (n as f64).powi(2),
        BigO::ON3 => |n| (n as f64).powi(3),
        BigO::OLogN => |n| (n as f64).log2(),
        BigO::ONLogN => |n| n as f64 * (n as f64).log2(),
        _ => |_| 1.0,
    }
}

/// Single-parameter least-squares fit of `time ~ coef * curve(n)`.
///
/// The returned rms is normalized by the mean time so families with very
/// different magnitudes stay comparable.
fn least_sq(n: &[i64], time: &[f64], curve: BigOFunc, complexity: BigO) -> LeastSq {
    debug_assert_eq!(n.len(), time.len());
    let mut sigma_gn_squared = 0.0;
    let mut sigma_time = 0.0;
    let mut sigma_time_gn = 0.0;
    for (&size, &t) in n.iter().zip(time) {
        let gn = curve(size);
        sigma_gn_squared += gn * gn;
        sigma_time += t;
        sigma_time_gn += t * gn;
    }

    let coef = sigma_time_gn / sigma_gn_squared;
    let mut rms = 0.0;
    for (&size, &t) in n.iter().zip(time) {
        let fit = coef * curve(size);
        rms += (t - fit).powi(2);
    }
    let mean = sigma_time / n.len() as f64;
    LeastSq {
        coef,
        rms: (rms / n.len() as f64).sqrt() / mean,
        complexity,
    }
}

/// Fit the requested complexity; [`BigO::Auto`] tries every candidate curve
/// and keeps the one with the lowest normalized rms.
fn minimal_least_sq(n: &[i64], time: &[f64], complexity: BigO, lambda: Option<BigOFunc>) -> LeastSq {
    match complexity {
        BigO::Lambda => {
            let curve = lambda.expect("complexity lambda missing on a Lambda-fit benchmark");
            least_sq(n, time, curve, BigO::Lambda)
        }
        BigO::Auto => {
            let candidates = [BigO::OLogN, BigO::ON, BigO::ONLogN, BigO::ON2, BigO::ON3];
            let mut best = least_sq(n, time, fitting_curve(BigO::O1), BigO::O1);
            for candidate in candidates {
                let fit = least_sq(n, time, fitting_curve(candidate), candidate);
                if fit.rms < best.rms {
                    best = fit;
                }
            }
            best
        }
        _ => least_sq(n, time, fitting_curve(complexity), complexity),
    }
}

/// Fit the family's per-iteration times against its problem sizes and emit
/// two synthetic rows: `<base>_BigO` carrying the curve coefficients and
/// `<base>_RMS` carrying the normalized fit error. `<base>` is the family
/// name with any `/arg` suffix stripped.
pub fn compute_big_o(reports: &[Run]) -> Vec<Run> {
    let mut results = Vec::new();
    if reports.len() < 2 {
        return results;
    }

    let mut n = Vec::with_capacity(reports.len());
    let mut real_time = Vec::with_capacity(reports.len());
    let mut cpu_time = Vec::with_capacity(reports.len());
    for run in reports {
        n.push(run.complexity_n);
        real_time.push(run.real_accumulated_time / run.iterations as f64);
        cpu_time.push(run.cpu_accumulated_time / run.iterations as f64);
    }

    let template = &reports[0];
    let (result_cpu, result_real) = if template.complexity == BigO::Lambda {
        (
            minimal_least_sq(&n, &cpu_time, BigO::Lambda, template.complexity_lambda),
            minimal_least_sq(&n, &real_time, BigO::Lambda, template.complexity_lambda),
        )
    } else {
        // The CPU fit picks the curve; the real-time fit reuses it so both
        // rows describe the same asymptote.
        let cpu = minimal_least_sq(&n, &cpu_time, template.complexity, None);
        let real = minimal_least_sq(&n, &real_time, cpu.complexity, None);
        (cpu, real)
    };

    let base_name = template
        .benchmark_name
        .split('/')
        .next()
        .unwrap_or(&template.benchmark_name)
        .to_string();

    results.push(Run {
        benchmark_name: format!("{}_BigO", base_name),
        real_accumulated_time: result_real.coef,
        cpu_accumulated_time: result_cpu.coef,
        time_unit: template.time_unit,
        complexity: result_cpu.complexity,
        complexity_lambda: template.complexity_lambda,
        report_big_o: true,
        report_label: template.report_label.clone(),
        ..Run::default()
    });

    // The rms is a dimensionless ratio; pre-dividing by the unit multiplier
    // cancels the scaling reporters apply to time fields.
    let multiplier = template.time_unit.multiplier();
    results.push(Run {
        benchmark_name: format!("{}_RMS", base_name),
        real_accumulated_time: result_real.rms / multiplier,
        cpu_accumulated_time: result_cpu.rms / multiplier,
        time_unit: template.time_unit,
        complexity: result_cpu.complexity,
        report_rms: true,
        report_label: template.report_label.clone(),
        ..Run::default()
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacebench_core::TimeUnit;

    fn family_member(name: &str, n: i64, seconds_per_iter: f64) -> Run {
        Run {
            benchmark_name: name.to_string(),
            iterations: 1,
            real_accumulated_time: seconds_per_iter,
            cpu_accumulated_time: seconds_per_iter,
            time_unit: TimeUnit::Nanosecond,
            complexity: BigO::ON,
            complexity_n: n,
            ..Run::default()
        }
    }

    #[test]
    fn linear_family_fits_exactly() {
        let reports = vec![
            family_member("copy/8", 8, 16.0),
            family_member("copy/64", 64, 128.0),
            family_member("copy/512", 512, 1024.0),
        ];
        let rows = compute_big_o(&reports);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].benchmark_name, "copy_BigO");
        assert!(rows[0].report_big_o);
        assert_eq!(rows[0].complexity, BigO::ON);
        assert!((rows[0].cpu_accumulated_time - 2.0).abs() < 1e-9, "time = 2*n");
        assert_eq!(rows[1].benchmark_name, "copy_RMS");
        assert!(rows[1].report_rms);
        assert!(rows[1].cpu_accumulated_time.abs() < 1e-9, "perfect fit has zero rms");
    }

    #[test]
    fn auto_fit_picks_the_quadratic_curve() {
        let mut reports: Vec<Run> = [8i64, 32, 128, 512]
            .into_iter()
            .map(|n| family_member(&format!("mul/{n}"), n, (n * n) as f64 * 3.0))
            .collect();
        for run in &mut reports {
            run.complexity = BigO::Auto;
        }
        let rows = compute_big_o(&reports);

        assert_eq!(rows[0].complexity, BigO::ON2);
        assert!((rows[0].cpu_accumulated_time - 3.0).abs() < 1e-6);
    }

    #[test]
    fn lambda_fit_uses_the_user_curve() {
        let mut reports = vec![
            family_member("halve/16", 16, 8.0),
            family_member("halve/64", 64, 32.0),
        ];
        for run in &mut reports {
            run.complexity = BigO::Lambda;
            run.complexity_lambda = Some(|n| n as f64 / 2.0);
        }
        let rows = compute_big_o(&reports);

        assert_eq!(rows[0].complexity, BigO::Lambda);
        assert!((rows[0].cpu_accumulated_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fewer_than_two_reports_yield_nothing() {
        assert!(compute_big_o(&[]).is_empty());
        assert!(compute_big_o(&[family_member("copy/8", 8, 1.0)]).is_empty());
    }

    #[test]
    fn per_iteration_normalization_uses_each_runs_count() {
        // Same per-iteration cost expressed with different iteration counts.
        let mut small = family_member("copy/8", 8, 16.0);
        small.iterations = 1;
        let mut large = family_member("copy/64", 64, 12800.0);
        large.iterations = 100;

        let rows = compute_big_o(&[small, large]);
        assert!((rows[0].cpu_accumulated_time - 2.0).abs() < 1e-9);
    }
}
