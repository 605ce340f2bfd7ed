#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = school_portal::run().await {
        eprintln!("school-portal fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
