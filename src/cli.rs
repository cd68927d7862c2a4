use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Convert flat delimited files into nested JSON documents inferred from column naming",
    long_about = None
)]
pub struct Cli {
    /// Input CSV file ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output JSON file (stdout if omitted or '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter inside column names that encodes the JSON nesting
    #[arg(short = 'd', long = "delimiter", default_value = "_")]
    pub delimiter: String,
    /// CSV column delimiter (supports ',', 'tab', ';', '|'; defaults by extension)
    #[arg(long = "columns-delimiter", value_parser = parse_delimiter)]
    pub columns_delimiter: Option<u8>,
    /// JSON file mapping field names to a cast type and/or default value
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Maximum documents per output file; splits into numbered chunks
    #[arg(long = "max-docs")]
    pub max_docs: Option<usize>,
    /// Write one JSON document per line instead of a JSON array
    #[arg(long = "per-line")]
    pub per_line: bool,
    /// Infer value types (numbers, lists, dates) from cell contents
    #[arg(long = "infer-types")]
    pub infer_types: bool,
    /// Keep fields with empty values as explicit nulls instead of omitting them
    #[arg(long = "keep-empty")]
    pub keep_empty: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_named_and_literal_forms() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("pipe").unwrap(), b'|');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
