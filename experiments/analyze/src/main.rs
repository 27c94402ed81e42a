use {
    inference::{Inference, Tracer, TracerConfig},
    std::time::Instant,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var("TRACER_LOG_DIR") {
        Ok(dir) => base::init_file_logger(dir, "tracer")?,
        Err(_) => base::init_stdout_logger(),
    }

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image> [model] [config.json]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(3) {
        Some(path) => TracerConfig::from_file(path)?,
        None => TracerConfig::default(),
    };
    let model = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| config.default_model.clone());

    let inference = Inference::from_config(config.device)?;
    let tracer = Tracer::new(inference.load_registry(&config));
    println!("{}", serde_json::to_string_pretty(&tracer.health())?);

    let bytes = std::fs::read(&args[1])?;
    base::log_info!("Analyzing {} ({} bytes) with {}", args[1], bytes.len(), model);

    let start = Instant::now();
    let result = tracer.analyze(model, bytes).await;
    base::log_info!("Analysis took {:.1?}", start.elapsed());

    match result {
        Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
        Err(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(if response.is_client_error() { 2 } else { 1 });
        }
    }
    Ok(())
}
