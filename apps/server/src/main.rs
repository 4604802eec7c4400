#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vocab_server::run().await
}
