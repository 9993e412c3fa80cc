use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use psdhtml_lib::{ClassifiedLayer, ConvertError, ConvertOutput, PsdOutput};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &PsdOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: ConvertError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let payload = PsdOutput::Convert(ConvertOutput::failed(err.to_payload()));

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"success\":false}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for fatal errors; per-document failures exit 0.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &PsdOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &PsdOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"success\":false}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &PsdOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        PsdOutput::Convert(out) => {
            if let Some(detail) = &out.error_detail {
                writeln!(buf, "{} {}", color("ERROR", "31", colorize), detail.message).ok();
                if let Some(hint) = &detail.remediation {
                    writeln!(buf, "Hint: {hint}").ok();
                }
                return buf.trim_end().to_string();
            }

            let converted = out.results.values().filter(|r| r.success).count();
            writeln!(
                buf,
                "Converted {converted} of {} document(s)",
                out.results.len()
            )
            .ok();
            for (name, result) in &out.results {
                if result.success {
                    writeln!(buf, "{} {name}", color("OK", "32", colorize)).ok();
                } else {
                    let reason = result.error.as_deref().unwrap_or("unknown error");
                    writeln!(buf, "{} {name}: {reason}", color("FAIL", "31", colorize)).ok();
                }
            }
        }
        PsdOutput::Inspect(out) => {
            for (name, doc) in &out.documents {
                match (doc.width, doc.height, &doc.error) {
                    (Some(w), Some(h), _) => {
                        writeln!(buf, "{} ({w}x{h})", color(name, "1", colorize)).ok();
                    }
                    (_, _, Some(err)) => {
                        writeln!(buf, "{} {name}: {err}", color("FAIL", "31", colorize)).ok();
                    }
                    _ => {
                        writeln!(buf, "{name}").ok();
                    }
                }
                for layer in &doc.layers {
                    write_layer(&mut buf, layer, 1, colorize);
                }
            }
        }
    }
    buf.trim_end().to_string()
}

fn write_layer(buf: &mut String, layer: &ClassifiedLayer, depth: usize, colorize: bool) {
    let indent = "  ".repeat(depth);
    let b = layer.bounds;
    let label = match (&layer.role, &layer.error) {
        (Some(role), _) => color(&format!("{role:?}"), "32", colorize),
        (None, Some(err)) => color(err, "33", colorize),
        (None, None) => color("-", "2", colorize),
    };
    let hidden = if layer.visible { "" } else { " hidden" };
    writeln!(
        buf,
        "{indent}{} [{}{hidden}] ({},{})-({},{}) {label}",
        layer.name, layer.kind, b.x1, b.y1, b.x2, b.y2
    )
    .ok();
    for child in &layer.children {
        write_layer(buf, child, depth + 1, colorize);
    }
}

/// Apply ANSI color code to text if colorize is enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
