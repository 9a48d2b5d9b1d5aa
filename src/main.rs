use gomokud::config::Config;
use gomokud::hosting::Server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::load();
    gomokud::init(config.level);
    Server::run(config).await
}
