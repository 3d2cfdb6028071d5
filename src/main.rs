#[tokio::main]
async fn main() -> anyhow::Result<()> {
    justwrite::start_server().await
}
