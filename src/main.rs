fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging, controlled by RUST_LOG
    env_logger::init();

    // File dialogs run as tokio tasks
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    topology_editor::run_app()?;
    Ok(())
}
