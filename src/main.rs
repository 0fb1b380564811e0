use cartbasic::shell::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match std::env::var("CARTBASIC_CONFIG") {
        Ok(path) => match Config::load(Path::new(&path)) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("{}: {}", path, error);
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
    .from_env();

    let default = if config.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cartbasic::term::main(config);
}
