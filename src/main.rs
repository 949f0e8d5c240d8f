use snapserve::services::admin_bootstrap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(command) if admin_bootstrap::is_command(&command) => {
            snapserve::bootstrapper::create_admin(args.collect()).await
        }
        _ => snapserve::bootstrapper::run().await,
    }
}
