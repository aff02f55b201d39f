//! ledgerline-check - Parse a ledger file and report syntax errors.

fn main() -> std::process::ExitCode {
    ledgerline::cmd::check::main()
}
