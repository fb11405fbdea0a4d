use actix_cors::Cors;
use actix_web::{http::Method, middleware::Logger, web, App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::{info, LevelFilter};
use std::sync::Arc;

use helios_dapp_api::chain::{ChainReader, HeliosChain, Wallet};
use helios_dapp_api::config::{Config, DEFAULT_CONFIG_PATH};
use helios_dapp_api::database::{DeploymentRepository, MongoDbClient};
use helios_dapp_api::deployment::{
    DeploymentOrchestrator, DeploymentSettings, DeploymentStore, MemoryDeploymentStore,
};
use helios_dapp_api::routes::configure_routes;
use helios_dapp_api::services::build_notifier;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level.to_string())).init();

    let config = Config::load(&args.config).expect("Failed to load configuration");

    info!("Starting Helios dApp API...");
    info!(
        "Network: {} (chain {}), {} RPC endpoint(s)",
        config.network.name,
        config.network.chain_id,
        config.network.rpcs.len()
    );

    let chain = Arc::new(HeliosChain::from_config(&config.network).expect("Failed to set up chain access"));

    let store: Arc<dyn DeploymentStore> = match &config.database {
        Some(database) => {
            let client = MongoDbClient::init(database)
                .await
                .expect("Failed to initialize database");
            Arc::new(DeploymentRepository::new(client))
        }
        None => {
            info!("No database configured, deployment history is kept in memory");
            Arc::new(MemoryDeploymentStore::new())
        }
    };

    let settings = DeploymentSettings::from_config(&config).expect("Invalid deployment settings");
    let orchestrator = web::Data::new(DeploymentOrchestrator::new(
        chain.clone(),
        chain.clone(),
        store,
        build_notifier(&config.telegram),
        settings,
    ));
    let chain_reader = web::Data::from(chain.clone() as Arc<dyn ChainReader>);
    let wallet = web::Data::from(chain as Arc<dyn Wallet>);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server will be available at http://{}", bind_addr);

    let config = Arc::new(config);

    HttpServer::new(move || {
        let allowed_origins = config.cors.allowed_origins.clone();

        let cors = Cors::default().allowed_origin_fn(move |origin, _req_head| {
            let origin_str = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            allowed_origins.iter().any(|allowed| origin_str == allowed)
        });

        let mut methods: Vec<Method> = config
            .cors
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        methods.push(Method::OPTIONS);

        let cors = cors
            .allowed_methods(methods)
            .allowed_headers(config.cors.allowed_headers.clone())
            .max_age(3600);

        let cors = if config.cors.supports_credentials {
            cors.supports_credentials()
        } else {
            cors
        };

        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(orchestrator.clone())
            .app_data(chain_reader.clone())
            .app_data(wallet.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
