#[tokio::main]
async fn main() -> std::io::Result<()> {
    battle_server::run_with_config().await
}
