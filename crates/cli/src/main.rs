use std::process::ExitCode;

fn main() -> ExitCode {
    leavewise_cli::run()
}
