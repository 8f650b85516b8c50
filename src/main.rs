//! pxe - command-line front end for the pixedit sprite editor

use std::process::ExitCode;

use pixedit::cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    cli::run()
}
