#[tokio::main]
async fn main() -> anyhow::Result<()> {
    petfinder_proxy_lib::run().await
}
