use anyhow::bail;
use stockroom_shared::telemetry;

const APP_NAME: &str = "stockroom_cli";

pub fn init(cli: &super::cli::Cli, default_filter: &str) -> anyhow::Result<()> {
    fn init_to_file(default_filter: &str) -> anyhow::Result<()> {
        let (file, filename) = telemetry::create_trace_file(APP_NAME)?;
        let subscriber = telemetry::get_subscriber(APP_NAME.into(), default_filter, file);

        // Start logging to file
        match telemetry::init_subscriber(subscriber) {
            Ok(_) => {
                eprintln!("Tracing started to file {filename:?}");
                Ok(())
            }
            Err(e) => {
                bail!("Failed to start tracing to file. Error: {e}");
            }
        }
    }

    if !cli.is_to_std_out {
        // Log to file
        match init_to_file(default_filter) {
            Ok(_) => return Ok(()),
            Err(e) => {
                // Print error and fall though to logging to stdout
                eprintln!("Failed to start logging to file: {e}");
            }
        }
    }

    // Log to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    match tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(_) => Ok(()),
        Err(e) => {
            bail!("Failed to start tracing. Error: {e}");
        }
    }
}
