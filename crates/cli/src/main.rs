use std::process::ExitCode;

fn main() -> ExitCode {
    zarigani_cli::run()
}
