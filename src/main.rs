use clap::Parser;
use dut_console::config::{Config, ConfigLoader, LogFormat};
use dut_console::dut::Dut;
use dut_console::error::HarnessError;
use dut_console::port::{PortSettings, SerialConsole};
use dut_console::suite::{self, FailureKind, SuiteReport, Target};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dut-console",
    version,
    about = "Serial console expectation harness for device-in-the-loop firmware tests.",
    long_about = "Opens a connected device's serial console, waits for a fixed sequence of \
                  literal log markers in order, and reports pass/fail with the first point \
                  of mismatch. Flashing and provisioning are left to the surrounding harness."
)]
struct Args {
    /// Console port path (e.g. /dev/ttyUSB0 or COM3). Falls back to ESPPORT
    /// or the [target] section of the config file.
    #[arg(short, long)]
    port: Option<String>,

    /// Console baud rate. Falls back to ESPBAUD or the config file.
    #[arg(short, long)]
    baud: Option<u32>,

    /// Build target the device was flashed for (esp32, esp32s3).
    #[arg(short, long)]
    target: Option<Target>,

    /// Suite to run.
    #[arg(long, default_value = "ipc_isr")]
    suite: String,

    /// Wait window per marker, in milliseconds.
    #[arg(long)]
    window_ms: Option<u64>,

    /// Explicit config file path (otherwise standard resolution applies).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the suite report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// List serial ports visible to the system and exit.
    #[arg(long)]
    list_ports: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(&config);

    if args.list_ports {
        list_ports();
        return ExitCode::SUCCESS;
    }

    match run(&args, &config) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: failed to serialize report: {e}");
                        return ExitCode::from(2);
                    }
                }
            } else {
                println!("{}", report.summary());
            }

            match (report.passed, report.failure) {
                (true, _) => ExitCode::SUCCESS,
                (false, Some(FailureKind::DeviceError)) => ExitCode::from(2),
                (false, _) => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn load_config(args: &Args) -> Result<Config, HarnessError> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    Ok(loader.into_config())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn run(args: &Args, config: &Config) -> Result<SuiteReport, HarnessError> {
    let suite = suite::find(&args.suite)
        .ok_or_else(|| HarnessError::UnknownSuite(args.suite.clone()))?;

    if let Some(target) = args.target.or(config.target.name) {
        if !suite.supports(target) {
            return Err(HarnessError::TargetUnsupported {
                suite: suite.name.to_string(),
                target: target.to_string(),
            });
        }
        info!(suite = suite.name, %target, "target selected");
    }

    let port_name = args
        .port
        .clone()
        .or_else(|| config.target.port.clone())
        .ok_or(HarnessError::NoPort)?;

    let mut settings = PortSettings::with_baud(args.baud.unwrap_or(config.console.baud));
    settings.read_timeout = config.console.read_timeout();

    let console = SerialConsole::open(&port_name, settings)?;
    info!(port = %port_name, "console open");

    let window = args
        .window_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.expect.window());

    let mut dut = Dut::new(console, window);
    // Fresh session: output from before the runner attached must not count.
    dut.discard_pending()?;

    Ok(suite.run(&mut dut))
}

fn list_ports() {
    let ports = SerialConsole::available_ports();
    if ports.is_empty() {
        println!("No serial ports detected on this system");
        return;
    }

    println!("Available serial ports ({}):", ports.len());
    for (idx, port) in ports.iter().enumerate() {
        println!("  {}. {}", idx + 1, port.port_name);
        if let serialport::SerialPortType::UsbPort(usb) = &port.port_type {
            println!("     USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                println!("     Product: {product}");
            }
        }
    }
}
