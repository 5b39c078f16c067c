#[tokio::main]
async fn main() -> anyhow::Result<()> {
    veritext::run().await
}
