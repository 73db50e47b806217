fn main() -> std::process::ExitCode {
    orderly_lib::run()
}
