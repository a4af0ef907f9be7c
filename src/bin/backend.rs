use http_monitoring::config::Service;
use http_monitoring::server;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    server::init_tracing();

    if let Err(e) = server::run(Service::Backend).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
