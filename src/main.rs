#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = lms_api::run().await {
        eprintln!("lms-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
