//! Avalia uma transação fornecida em um arquivo JSON e imprime o relatório.
//!
//! ```bash
//! cargo run -p ethernity-detector-threat --example analyze_trace -- <ARQUIVO_JSON> [CONFIG_JSON]
//! ```

use std::env;
use std::fs;

use ethernity_detector_threat::{DetectionConfig, ThreatEngine};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <ARQUIVO_JSON> [CONFIG_JSON]", args[0]);
        eprintln!("Exemplo: {} crates/ethernity-detector-threat/demos/scenario_a.json", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => DetectionConfig::from_json_file(path)?,
        None => DetectionConfig::default(),
    };
    let engine = ThreatEngine::with_config(config);

    let raw = fs::read_to_string(&args[1])?;
    let report = engine.analyze_json(&raw)?;

    println!("Detectado: {}", report.detected);
    println!("Mensagem: {}", report.message);
    println!("{}", report.to_json_pretty()?);

    Ok(())
}
