//! Simulate command - step a model from a TOML file.

use std::path::Path;
use std::time::Instant;

use crate::config::Settings;
use crate::io::{EntityType, Envelope, ExitCode, OutputFormat, ResultCode, emit};
use crate::simulation::{self, Sample, SimulationFile};

pub fn run(
    file: &Path,
    steps: Option<usize>,
    ts: Option<f64>,
    json: bool,
    settings: &Settings,
) -> ExitCode {
    let format = OutputFormat::from_json_flag(json);
    let start = Instant::now();

    let sim = match SimulationFile::load(file) {
        Ok(sim) => sim,
        Err(e) => return fail(format, ResultCode::ParseError, e.to_string(), None),
    };

    let default_ts = ts.unwrap_or(settings.simulation.sampling_time);
    let steps = steps.or(sim.steps).unwrap_or(settings.simulation.steps);
    let ts = sim.model.sampling_time(default_ts);

    let mut system = match simulation::build_system(&sim.model, default_ts) {
        Ok(system) => system,
        Err(e) => {
            return fail(
                format,
                ResultCode::InvalidModel,
                e.to_string(),
                Some("Check the [model] table of the simulation file"),
            );
        }
    };

    let samples = match simulation::run(system.as_mut(), &sim.input, steps, ts) {
        Ok(samples) => samples,
        Err(e) => return fail(format, ResultCode::InternalError, e.to_string(), None),
    };

    if format.is_json() {
        let count = samples.len();
        let envelope = Envelope::success(samples)
            .with_entity_type(EntityType::Sample)
            .with_count(count)
            .with_query(file.display().to_string())
            .with_message(format!("Simulated {count} steps"))
            .with_duration_ms(start.elapsed().as_millis() as u64);
        emit(&envelope)
    } else {
        print_table(system.describe().as_str(), &samples);
        ExitCode::Success
    }
}

fn print_table(model: &str, samples: &[Sample]) {
    println!("# {model}");
    println!("{:>6} {:>12} {:>12}  y", "k", "t", "u");
    for sample in samples {
        let outputs: Vec<String> = sample.output.iter().map(|y| format!("{y:.6}")).collect();
        println!(
            "{:>6} {:>12.6} {:>12.6}  {}",
            sample.k,
            sample.t,
            sample.input,
            outputs.join(" ")
        );
    }
}

fn fail(format: OutputFormat, code: ResultCode, message: String, hint: Option<&str>) -> ExitCode {
    if format.is_json() {
        let mut envelope: Envelope<()> = Envelope::error(code, message);
        if let Some(hint) = hint {
            envelope = envelope.with_hint(hint);
        }
        emit(&envelope)
    } else {
        eprintln!("Error: {message}");
        if let Some(hint) = hint {
            eprintln!("  {hint}");
        }
        code.exit_code()
    }
}
