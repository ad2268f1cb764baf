use colored::*;
use jrpc_core::error::ProxyError;
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<ProxyError> for FormattedString {
    fn from(err: ProxyError) -> Self {
        if let Some(fault) = err.fault() {
            let mut out = format!(
                "{} code={} message={:?}",
                "JSON-RPC Error:".red().bold(),
                fault.code,
                fault.message
            );
            if let Some(data) = &fault.data {
                let data = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
                out.push_str(&format!("\n\n{}\n{}", "data:".yellow(), data));
            }
            return FormattedString(out);
        }

        FormattedString(format!(
            "{} (code {})\n\n'{}'",
            "Call Failed:".red().bold(),
            err.code(),
            err
        ))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jrpc_core::error::RpcFault;
    use serde_json::json;

    #[test]
    fn server_faults_show_code_message_and_data() {
        colored::control::set_override(false);

        let err = ProxyError::ServerResponse(
            RpcFault::new(-32000, "Insufficient funds").with_data(json!({"balance": 3})),
        );
        let FormattedString(out) = FormattedString::from(err);

        assert!(out.starts_with("JSON-RPC Error: code=-32000 message=\"Insufficient funds\""));
        assert!(out.contains("\"balance\": 3"));
    }

    #[test]
    fn other_failures_show_their_category_code() {
        colored::control::set_override(false);

        let err = ProxyError::Transport("connection refused".into());
        let FormattedString(out) = FormattedString::from(err);

        assert!(out.contains("(code 1003)"));
        assert!(out.contains("connection refused"));
    }
}
