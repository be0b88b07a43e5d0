pub(crate) mod quick;

/// Installs a logger once so `RUST_LOG=trace cargo test` shows which fixup cases ran.
pub(crate) fn init_logging() {
    let _ = pretty_env_logger::try_init();
}
