use std::sync::Arc;

use clap::Parser;
use signing_service::{
    Algorithm, InMemoryDeviceStore, ServiceConfig, SigningService, run,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "signing-service", about = "Chained transaction signing devices over HTTP")]
struct Args {
    #[clap(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "PORT", default_value = "8080")]
    port: u16,
    /// Comma separated list of algorithms devices may use.
    #[clap(long, env = "SIGNING_ALGORITHMS", value_delimiter = ',', default_value = "RSA,ECDSA")]
    algorithms: Vec<Algorithm>,
    #[clap(long, env = "RSA_KEY_BITS", default_value = "2048")]
    rsa_key_bits: usize,
    /// Allow RSA keys below 2048 bits. Never use in production.
    #[clap(long, env = "ALLOW_INSECURE_RSA_KEYS")]
    allow_insecure_rsa_keys: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("signing_service=info")),
        )
        .init();

    let args = Args::parse();

    let config = ServiceConfig {
        algorithms: args.algorithms,
        rsa_key_bits: args.rsa_key_bits,
        allow_insecure_rsa_keys: args.allow_insecure_rsa_keys,
    };
    let registry = config.build_registry()?;
    let service = SigningService::new(Arc::new(InMemoryDeviceStore::new()), Arc::new(registry));

    run(args.host, args.port, Arc::new(service)).await
}
