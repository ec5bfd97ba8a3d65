/// Runtime used for every command, the HTTP requests are spawned onto it
pub fn create_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
