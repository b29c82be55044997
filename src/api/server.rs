use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::api::dto::GraphDto;
use crate::application::{Config, DistillOptions, DistillUsecase};
use crate::infrastructure::{FsRuleStore, FsTraceSource};

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

/// Serve distilled graphs to visual tools over line-delimited JSON.
pub fn start_server(port: u16, config: Config) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;

    println!("[TraceSift] API Server listening on {}", address);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let config = config.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &config) {
                        eprintln!("[API] Connection error: {}", e);
                    }
                });
            }
            Err(e) => eprintln!("[API] Accept error: {}", e),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, config: &Config) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match process_command(trimmed, config) {
            Ok(data) => json!({
                "status": "success",
                "data": data
            }),
            Err(e) => json!({
                "status": "error",
                "message": e.to_string()
            }),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if let Ok(req) = serde_json::from_str::<CommandReq>(trimmed) {
            if req.command == "SHUTDOWN" {
                println!("[API] Shutdown requested.");
                std::process::exit(0);
            }
        }
    }
    Ok(())
}

fn process_command(json_str: &str, config: &Config) -> Result<serde_json::Value> {
    let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;

    match req.command.as_str() {
        "PING" => Ok(json!("PONG")),
        "DISTILL" => handle_distill(req.params, config),
        "SHUTDOWN" => Ok(json!("Shutting down...")),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn handle_distill(
    params: Option<serde_json::Value>,
    config: &Config,
) -> Result<serde_json::Value> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for DISTILL"))?;

    let proof_id = params
        .get("proof_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing 'proof_id' param"))?;

    let data_dir = params
        .get("data_dir")
        .and_then(|v| v.as_str())
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());

    let prune = params.get("prune").and_then(|v| v.as_bool()).unwrap_or(true);

    println!("[API] Distilling: {}", proof_id);

    let trace_source = FsTraceSource::new(&data_dir);
    let rule_store = FsRuleStore::new(&data_dir);
    let usecase = DistillUsecase {
        trace_source: &trace_source,
        rule_store: &rule_store,
        max_iterations: config.max_iterations,
    };

    let result = usecase.run(
        proof_id,
        DistillOptions {
            prune,
            verbose: false,
        },
    )?;

    let graph_dto = GraphDto::from(&result);
    Ok(serde_json::to_value(graph_dto)?)
}
