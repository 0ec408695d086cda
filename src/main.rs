use std::env;
use std::process::ExitCode;

use weighin::cli;
use weighin::config::AppConfig;
use weighin::logging::init_logging;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.logging);

    let code = cli::run_with_args(&args, &config);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
