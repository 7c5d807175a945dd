use pubflow::core::CoreApp;

/// CLI/env/config layering happens synchronously, before the tokio runtime is built,
/// so the `--workers`/`PUBFLOW_WORKERS` setting can actually size that runtime's worker
/// pool instead of only reaching `tokio::main`'s default-sized runtime too late.
fn main() {
    let config = match CoreApp::bootstrap() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\nError: {}\n", e);
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    if let Err(e) = runtime.block_on(CoreApp::run(config)) {
        eprintln!("\nError: {}\n", e);
        std::process::exit(1);
    }
}
