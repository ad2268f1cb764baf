//! # CLI
//!
//! This module defines the command-line interface of `jrpc` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g., ensuring headers are `key:value`
//! and named parameters are `key=value`).
//!
//! Method and parameter names become labels of a method signature, so they cannot contain `:`, `(`,
//! `)` or whitespace.
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "jrpc", version, about = "JSON-RPC 2.0 command-line client")]
pub struct Cli {
    /// The JSON-RPC endpoint (e.g. http://localhost:8545)
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call a method on a JSON-RPC server
    ///
    /// Positional parameters are sent BY-POSITION, `--named` parameters are sent BY-NAME.
    /// Values are parsed as JSON and fall back to plain strings.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// jrpc http://localhost:8545 call subtract 42 23
    /// jrpc http://localhost:8545 call subtract -n minuend=42 -n subtrahend=23
    /// ```
    Call {
        /// The method name
        #[arg(value_parser = parse_method)]
        method: String,

        /// Positional parameters
        #[arg(value_parser = parse_value, conflicts_with = "named")]
        params: Vec<Value>,

        /// Named parameter (key=value), repeatable
        #[arg(short = 'n', long = "named", value_parser = parse_named)]
        named: Vec<(String, Value)>,

        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Timeout of the HTTP exchange, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| "Format must be 'key:value'".to_string())
}

fn parse_named(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| "Format must be 'key=value'".to_string())?;

    let key = key.trim();
    if key.is_empty() {
        return Err("Parameter names cannot be empty".to_string());
    }
    if !is_label(key) {
        return Err(format!("Parameter names cannot contain {RESERVED}"));
    }

    Ok((key.to_string(), parse_value(value)?))
}

fn parse_method(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("The method name cannot be empty".to_string());
    }
    if !is_label(s) {
        return Err(format!("Method names cannot contain {RESERVED}"));
    }
    Ok(s.to_string())
}

const RESERVED: &str = "':', '(', ')' or whitespace";

fn is_label(s: &str) -> bool {
    !s.chars()
        .any(|c| matches!(c, ':' | '(' | ')') || c.is_whitespace())
}

fn parse_value(value: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string())))
}
