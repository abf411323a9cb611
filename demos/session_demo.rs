//! Runs a complete qCSF session end to end: constructs an engine and a
//! stimulus mode, drives the select/respond/update loop with a simulated
//! ideal observer for a fixed trial budget, and prints the derived
//! result.
//!
//! There is no display here (the core has no UI, per spec.md §1/§6): the
//! observer's response is drawn from the engine's own likelihood model,
//! so this doubles as a quick check that the full pipeline converges.

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use qcsf::qcsf_engine::{EngineConfig, QcsfEngine};
use qcsf::result::{self, ResultConfig};
use qcsf::stimulus_mode::StimulusMode;
use qcsf::types::ParamPoint;
use qcsf::Calibration;

#[derive(Parser, Debug)]
#[command(about = "Simulate a qCSF session with an ideal observer")]
struct Args {
    /// Stimulus family: gabor4afc | gaborYesNo | tumblingE | sloan
    #[arg(long, default_value = "sloan")]
    mode: String,

    /// Number of trials to run.
    #[arg(long, default_value_t = 50)]
    trials: u32,

    /// RNG seed, for reproducible simulated responses.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulated observer's true peak log10-sensitivity.
    #[arg(long, default_value_t = 2.0)]
    true_g: f64,
    /// Simulated observer's true peak (knee) frequency, cpd.
    #[arg(long, default_value_t = 4.0)]
    true_f: f64,
    /// Simulated observer's true bandwidth.
    #[arg(long, default_value_t = 1.3)]
    true_b: f64,
    /// Simulated observer's true truncation.
    #[arg(long, default_value_t = 1.8)]
    true_d: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut mode = match args.mode.as_str() {
        "gabor4afc" => StimulusMode::gabor_4afc(),
        "gaborYesNo" => StimulusMode::gabor_yes_no(),
        "tumblingE" => StimulusMode::tumbling_e(),
        "sloan" => StimulusMode::sloan(),
        other => anyhow::bail!("unknown mode '{other}', expected gabor4afc|gaborYesNo|tumblingE|sloan"),
    };
    mode.prepare(64)?;

    let config = EngineConfig {
        num_afc: mode.num_afc(),
        alpha: mode.psychometric_slope(),
        seed: args.seed,
        ..Default::default()
    };
    let mut engine = QcsfEngine::new(config)?;
    let calibration = Calibration::new(5.0, 600.0, 128, false)?;
    let theta_true = ParamPoint { g: args.true_g, f: args.true_f, b: args.true_b, d: args.true_d };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ 0xC5F);
    let mut frame = vec![0u8; 4 * 256 * 256];

    println!("Running {} trials in '{}' mode (observer true theta: {:?})", args.trials, args.mode, theta_true);

    for trial in 0..args.trials {
        let choice = engine.select_stimulus()?;
        let stim = engine.stimulus_grid()[choice.stim_index];
        let ground_truth = mode.render(&mut frame, 256, 256, stim, &calibration, &mut rng)?;

        let correct = simulate_response(&engine, theta_true, stim, &mut rng);
        let reported = if correct {
            ground_truth.clone()
        } else {
            mode.labels().into_iter().find(|l| l != &ground_truth).unwrap_or(ground_truth.clone())
        };
        let observed_correct = mode.check(&reported);
        engine.update(choice.stim_index, observed_correct)?;

        if trial % 10 == 0 || trial + 1 == args.trials {
            println!(
                "trial {:>3}: freq={:>6.2} cpd  contrast={:>7.4}  correct={}",
                engine.trial_count(),
                choice.freq_cpd,
                choice.contrast,
                observed_correct
            );
        }
    }

    for warning in engine.warnings() {
        eprintln!("warning: {warning}");
    }

    let result = result::derive(&engine, &ResultConfig::default());
    println!("\n--- session result ---");
    println!("estimate: {:?}", result.theta);
    println!("AULCSF: {:.3}  rank: {}", result.aulcsf, result.rank);
    println!("predicted Snellen: {}", result.snellen);
    for landmark in &result.landmarks {
        println!(
            "  {:<32} yours={:>7.2}  required={:>7.2}  {}",
            landmark.name,
            landmark.yours,
            landmark.required_sensitivity,
            if landmark.pass { "PASS" } else { "FAIL" }
        );
    }
    if !result.guard_applied.is_empty() {
        println!("plausibility guard applied:");
        for note in &result.guard_applied {
            println!("  - {note}");
        }
    }

    Ok(())
}

/// Draws a simulated correct/incorrect response from the same logistic
/// psychometric function the engine's likelihood matrix is built from,
/// evaluated at the session's fixed ground-truth `theta_true`.
fn simulate_response(
    engine: &QcsfEngine,
    theta_true: ParamPoint,
    stim: qcsf::types::Stimulus,
    rng: &mut ChaCha8Rng,
) -> bool {
    let log_s = engine.evaluate_csf(stim.freq_cpd, theta_true);
    let x = log_s - (-stim.log_contrast);
    let alpha = 3.5;
    let gamma = 0.1;
    let lambda = 0.04;
    let psi = 1.0 / (1.0 + (-alpha * x).exp());
    let p_correct = (gamma + (1.0 - gamma - lambda) * psi).clamp(0.001, 0.999);
    rng.gen::<f64>() < p_correct
}
