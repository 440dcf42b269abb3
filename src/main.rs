use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    arona::run().await
}
