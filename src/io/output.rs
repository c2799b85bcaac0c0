use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::DocumentFormat;

/// Where an edited value tree is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    /// `-` is stdout, anything else a file path.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "-" => OutputDestination::Stdout,
            path => OutputDestination::File(PathBuf::from(path)),
        }
    }

    fn format_hint(&self) -> Option<DocumentFormat> {
        match self {
            OutputDestination::Stdout => None,
            OutputDestination::File(path) => DocumentFormat::from_extension(path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    /// Stdout only, pretty printed.
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    /// Pick the format from the file destinations' extensions. Files that
    /// disagree are rejected; stdout follows whatever the files chose.
    pub fn for_destinations(destinations: Vec<OutputDestination>) -> Result<Self> {
        let mut format: Option<DocumentFormat> = None;
        for destination in &destinations {
            let Some(hint) = destination.format_hint() else {
                continue;
            };
            match format {
                Some(chosen) if chosen != hint => {
                    bail!("output formats disagree: {chosen} and {hint}")
                }
                _ => format = Some(hint),
            }
        }
        let options = Self::new(format.unwrap_or_default());
        Ok(if destinations.is_empty() {
            options
        } else {
            options.with_destinations(destinations)
        })
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::default())
    }
}

/// Serialize `value` once and write it to every destination.
pub fn emit(value: &Value, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let mut payload = serialize_value(value, options)?;
    if !payload.ends_with('\n') {
        payload.push('\n');
    }
    for destination in &options.destinations {
        match destination {
            OutputDestination::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(payload.as_bytes())
                    .and_then(|_| stdout.flush())
                    .context("failed to write to stdout")?;
            }
            OutputDestination::File(path) => fs::write(path, &payload)
                .with_context(|| format!("failed to write {}", path.display()))?,
        }
    }
    Ok(())
}

pub fn serialize_value(value: &Value, options: &OutputOptions) -> Result<String> {
    let payload = match (options.format, options.pretty) {
        (DocumentFormat::Json, true) => serde_json::to_string_pretty(value)?,
        (DocumentFormat::Json, false) => serde_json::to_string(value)?,
        #[cfg(feature = "yaml")]
        (DocumentFormat::Yaml, _) => serde_yaml::to_string(value)?,
        #[cfg(feature = "toml")]
        (DocumentFormat::Toml, true) => toml::to_string_pretty(value)?,
        #[cfg(feature = "toml")]
        (DocumentFormat::Toml, false) => toml::to_string(value)?,
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    #[test]
    fn no_destinations_is_a_no_op() {
        let options = OutputOptions::default().with_destinations(Vec::new());
        emit(&json!({"ok": true}), &options).unwrap();
    }

    #[test]
    fn compact_json_has_no_newlines() {
        let options = OutputOptions::default().with_pretty(false);
        let payload = serialize_value(&json!({"a": {"b": 1}}), &options).unwrap();
        assert_eq!(payload, r#"{"a":{"b":1}}"#);
    }

    #[test]
    fn destinations_choose_the_format() {
        let options = OutputOptions::for_destinations(vec![
            OutputDestination::parse("-"),
            OutputDestination::parse("out.json"),
        ])
        .unwrap();
        assert_eq!(options.format, DocumentFormat::Json);
        assert_eq!(options.destinations.len(), 2);

        let defaulted = OutputOptions::for_destinations(Vec::new()).unwrap();
        assert_eq!(defaulted.destinations, vec![OutputDestination::Stdout]);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn conflicting_file_formats_are_rejected() {
        let result = OutputOptions::for_destinations(vec![
            OutputDestination::parse("a.json"),
            OutputDestination::parse("b.yaml"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn writes_file_destination() {
        let path = std::env::temp_dir().join(format!(
            "dynform-test-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let options =
            OutputOptions::default().with_destinations(vec![OutputDestination::File(path.clone())]);
        emit(&json!({"ok": true}), &options).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("}\n"));
        let _ = fs::remove_file(path);
    }
}
