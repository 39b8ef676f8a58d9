//! # pinwheel-sweep
//!
//! Sweeps a servo back and forth on a Raspberry Pi GPIO channel until Ctrl-C.
//!
//! ```bash
//! # Standard sweep on GPIO18: 0-180°, 10° steps, 500ms hold.
//! pinwheel-sweep
//!
//! # Faster, narrower sweep coming back to 90° when stopped.
//! RUST_LOG=debug pinwheel-sweep --step 5 --hold-ms 100 --min 45 --max 135 --neutral 90
//!
//! # Settings from a file (flags still take precedence).
//! pinwheel-sweep --config demos/sweep.toml
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use pinwheel::errors::Error;
use pinwheel::hardware::{Board, GpioSink, PulseSink};
use pinwheel::sweep::{SweepConfig, SweepController};
use pinwheel::utils::{task, CancellationToken};

/// Pinwheel servo sweep
#[derive(Parser, Debug)]
#[command(name = "pinwheel-sweep")]
#[command(version)]
#[command(about = "Sweeps a servo back and forth on a Raspberry Pi GPIO channel")]
struct Args {
    /// TOML file holding the sweep settings.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// BCM GPIO channel the servo is wired to [default: 18]
    #[arg(long)]
    channel: Option<u8>,

    /// Degrees travelled per step [default: 10]
    #[arg(short, long)]
    step: Option<u16>,

    /// Time each position is held, in milliseconds [default: 500]
    #[arg(long)]
    hold_ms: Option<u64>,

    /// Pulse width (us) at 0° [default: 2000]
    #[arg(long)]
    baseline: Option<u32>,

    /// Pulse width increment (us) per degree [default: 10]
    #[arg(long)]
    pulse_per_degree: Option<u32>,

    /// Lower bound of the sweep, in degrees [default: 0]
    #[arg(long)]
    min: Option<u16>,

    /// Upper bound of the sweep, in degrees [default: 180]
    #[arg(long)]
    max: Option<u16>,

    /// Angle commanded once the sweep is stopped.
    #[arg(long)]
    neutral: Option<u16>,
}

impl Args {
    /// Builds the sweep settings: file (or defaults) first, then the flags on top.
    fn sweep_config(&self) -> Result<SweepConfig, Error> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path)?,
            None => SweepConfig::default(),
        };
        if let Some(channel) = self.channel {
            config = config.set_channel(channel);
        }
        if let Some(step) = self.step {
            config = config.set_step(step);
        }
        if let Some(hold_ms) = self.hold_ms {
            config = config.set_hold(hold_ms);
        }
        if let Some(baseline) = self.baseline {
            config = config.set_baseline_pulse(baseline);
        }
        if let Some(pulse_per_degree) = self.pulse_per_degree {
            config = config.set_pulse_per_degree(pulse_per_degree);
        }
        if self.min.is_some() || self.max.is_some() {
            let min = self.min.unwrap_or(config.range.start);
            let max = self.max.unwrap_or(config.range.end);
            config = config.set_range([min, max]);
        }
        if self.neutral.is_some() {
            config = config.set_neutral(self.neutral);
        }
        Ok(config)
    }
}

#[pinwheel::runtime]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match args.sweep_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(err.exit_code());
        }
    };

    let mut sink = GpioSink::new(Board::new());
    if let Err(err) = sink.initialize() {
        error!("{}", err);
        eprintln!("GPIO initialization failed.");
        std::process::exit(err.exit_code());
    }

    let mut sweep = match SweepController::new(sink, config) {
        Ok(sweep) => sweep,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(err.exit_code());
        }
    };

    let token = CancellationToken::new();
    let listener = token.clone();
    let spawned = task::run(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    error!("Unable to listen for Ctrl-C: {}", err);
                }
                info!("Ctrl-C received: stopping the sweep");
            }
            _ = listener.cancelled() => {}
        }
        listener.cancel();
    });
    if let Err(err) = spawned {
        error!("Unable to spawn the Ctrl-C listener: {}", err);
    }

    let result = match sweep.attach() {
        Ok(_) => sweep.run(&token).await.map(|report| {
            info!("Sweep stopped after {} command(s)", report.emitted);
        }),
        Err(err) => Err(err),
    };
    // Releases the Ctrl-C listener whatever happened.
    token.cancel();

    if let Err(err) = sweep.terminate() {
        error!("Unable to release GPIO: {}", err);
    }
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(err.exit_code());
    }
}
