//! TOML parser with helpful error messages

use super::StencilConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse stencil.toml
pub fn parse_stencil_toml(path: &Path) -> Result<StencilConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_stencil_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse stencil.toml content from string
pub fn parse_stencil_toml_str(content: &str) -> Result<StencilConfig> {
    let config: StencilConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;
    config.validate()?;
    Ok(config)
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &StencilConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize configuration to TOML")
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())]
                .matches('\n')
                .count()
                + 1;
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                line_context(content, line_num),
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Lines around `line_num` (1-based), with the offending one marked.
fn line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
