use std::process::ExitCode;

fn main() -> ExitCode {
    ssm_inject_cli::run()
}
