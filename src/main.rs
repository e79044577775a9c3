use dinoscale::{
    LogLevel, LogOutput, LogSink, Logger, Method, Server, ServerConfig, ServerResult,
};
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let config = match load_config(args.get(1).map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let logger = match &config.log_file {
        Some(path) => Logger::new(config.log_level, LogOutput::File, Some(path.as_path())),
        None => Logger::console(config.log_level),
    };

    // Anything logged through the `log` facade lands in the same place.
    if log::set_boxed_logger(Box::new(logger.clone())).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Err(e) = run(config, logger.clone()) {
        logger.log(&format!("Fatal: {}", e), LogLevel::Error);
        process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> ServerResult<ServerConfig> {
    let mut config = match path {
        Some(path) if Path::new(path).exists() => ServerConfig::from_json_file(path)?,
        _ => ServerConfig::new(),
    };

    if config.routes.is_empty() {
        config = config
            .with_route(Method::Get, "/", "index.html")
            .with_route(Method::Get, "/hello", "hello.html")
            .with_route(Method::Get, "/night", "night.html");
    }

    Ok(config)
}

fn run(config: ServerConfig, logger: Logger) -> ServerResult<()> {
    let mut server = Server::new(config, Arc::new(logger.clone()))?;
    server.listen()?;

    let stats = server.stats();
    let signal_logger = logger.clone();
    let handler = ctrlc::set_handler(move || {
        signal_logger.log("Received shutdown signal. Stopping server...", LogLevel::Info);
        signal_logger.log(&stats.format(), LogLevel::Info);
        process::exit(0);
    });
    if let Err(e) = handler {
        logger.log(
            &format!("Cannot install Ctrl-C handler: {}", e),
            LogLevel::Warn,
        );
    }

    server.start_listening()
}
