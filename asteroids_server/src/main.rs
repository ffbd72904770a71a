#[tokio::main]
async fn main() -> std::io::Result<()> {
    asteroids_server::run_with_config().await
}
