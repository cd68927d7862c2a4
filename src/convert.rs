//! Batch conversion driver: header to template, rows to documents, documents
//! to the output stage.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde_json::Value;

use crate::{
    cli::Cli,
    config::{self, FieldConfig},
    diag::DiagnosticSink,
    fill::{FillContext, fill_document},
    io_utils,
    output,
    structure::Template,
};

pub fn execute(args: &Cli, sink: &dyn DiagnosticSink) -> Result<()> {
    let columns_delimiter = io_utils::resolve_input_delimiter(&args.input, args.columns_delimiter);
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_path = args.output.as_deref();
    let writing_to_stdout = output_path.is_none_or(io_utils::is_dash);
    if args.max_docs.is_some() && writing_to_stdout {
        return Err(anyhow!("--max-docs requires an output file path"));
    }
    if let Some(0) = args.max_docs {
        return Err(anyhow!("--max-docs must be at least 1"));
    }

    let field_config = match &args.config {
        Some(path) => config::load(path, sink)?,
        None => FieldConfig::new(),
    };

    info!(
        "Converting '{}' -> {} (columns delimiter '{}', nesting delimiter '{}')",
        args.input.display(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into()),
        crate::printable_delimiter(columns_delimiter),
        args.delimiter
    );

    let documents = convert_rows(args, columns_delimiter, input_encoding, &field_config, sink)?;

    if let Some(path) = output_path {
        ensure_parent_dir(path)?;
    }
    match (args.max_docs, output_path) {
        (Some(max_docs), Some(path)) => {
            output::write_chunked(path, &documents, max_docs, args.per_line)?;
            info!(
                "Wrote {} document(s) across {} chunk file(s)",
                documents.len(),
                documents.len().div_ceil(max_docs)
            );
        }
        _ => output::write_documents(output_path, &documents, args.per_line)?,
    }
    Ok(())
}

/// Builds the template once from the header, then fills one independent
/// instance per row. Documents come back in input-row order.
fn convert_rows(
    args: &Cli,
    columns_delimiter: u8,
    input_encoding: &'static encoding_rs::Encoding,
    field_config: &FieldConfig,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Value>> {
    let mut reader = io_utils::open_csv_reader_from_path(&args.input, columns_delimiter)?;
    let header = io_utils::reader_headers(&mut reader, input_encoding)?;
    let template = Template::build(&header, &args.delimiter)?;
    info!(
        "Document structure has {} field(s) across {} column(s)",
        template.leaf_count(),
        header.len()
    );
    debug!(
        "Conversion knobs: infer_types={}, keep_empty={}, configured_fields={}",
        args.infer_types,
        args.keep_empty,
        field_config.len()
    );

    let context = FillContext {
        header: &header,
        delimiter: &args.delimiter,
        keep_empty: args.keep_empty,
        infer_types: args.infer_types,
        config: field_config,
    };
    let mut documents = Vec::new();
    for record in reader.byte_records() {
        let record = record.with_context(|| format!("Reading record from {:?}", args.input))?;
        let raw = io_utils::decode_record(&record, input_encoding)?;
        documents.push(fill_document(&context, &raw, template.instantiate(), sink));
    }
    info!("Converted {} record(s)", documents.len());
    Ok(documents)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if io_utils::is_dash(path) {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating output directory {parent:?}"))?;
            info!("Created output directory {parent:?}");
        }
    }
    Ok(())
}
