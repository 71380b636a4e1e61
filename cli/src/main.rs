use crate::cli::{Args, Command};
use crate::input::{read_source, Source};
use anyhow::Context;
use clap::Parser;
use rdf_convert::format::{FormatDescriptor, FormatHint, FormatResolver};
use rdf_convert::io::{rdf_json_value, serialize_as, ParseOptions};
use rdf_convert::{default_registry, Converter};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod input;
mod php;

/// The output alias writing the RDF/JSON structure as a PHP array.
const PHP: &str = "php";

pub fn main() -> anyhow::Result<()> {
    let matches = Args::parse();
    match matches.command {
        Command::Convert {
            input,
            from,
            to,
            output,
            base,
            verbose,
        } => {
            init_logging(verbose);
            convert(
                input.as_deref(),
                from.as_deref(),
                &to,
                output.as_deref(),
                base,
            )
        }
        Command::Formats => {
            init_logging(0);
            list_formats(&mut stdout().lock())
        }
    }
}

/// Logs to stderr: warnings by default, `-v` for progress messages, `-vv` for details.
///
/// `RUST_LOG` takes precedence when it is set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn convert(
    input: Option<&str>,
    from: Option<&str>,
    to: &str,
    output: Option<&Path>,
    base: Option<String>,
) -> anyhow::Result<()> {
    let registry = default_registry();
    let php = to.trim().eq_ignore_ascii_case(PHP);
    // Unknown output formats are reported before reading anything.
    let to_format = FormatResolver::new(registry)
        .resolve_for_serialize(if php { "json" } else { to })
        .context("Invalid output format")?;

    let mut hint = FormatHint::from_option(from);
    if hint == FormatHint::Guess {
        info!("Will guess input format...");
    }
    let source = read_source(input, registry)?;
    if let (FormatHint::Guess, Some(media_type)) = (&hint, &source.media_type) {
        debug!("Using the media type {media_type} announced by the server");
        hint = FormatHint::from(media_type.as_str());
    }

    let mut options = ParseOptions::new();
    if let Some(base_iri) = base.or_else(|| source.base_iri()) {
        options = options.with_base_iri(base_iri);
    }
    let mut converter = Converter::new(registry);
    let from_format = converter
        .load(&source.data, &hint, source.name(), &options)
        .with_context(|| format!("Could not convert {}", source.origin))?;
    info!(
        "Read {} statements as {}",
        converter.graph().len(),
        from_format.label()
    );

    let data = if php {
        php::php_document(&rdf_json_value(converter.graph())).into_bytes()
    } else {
        serialize_as(to_format, converter.graph())
            .with_context(|| format!("Could not write {}", to_format.label()))?
    };
    write_output(output, &data, &source)
}

fn write_output(output: Option<&Path>, data: &[u8], source: &Source) -> anyhow::Result<()> {
    if let Some(path) = output {
        write_atomically(path, data)
            .with_context(|| format!("Could not write to '{}'", path.display()))?;
        info!(
            "Converted {} into '{}' ({} kB)",
            source.origin,
            path.display(),
            (data.len() + 512) / 1024
        );
    } else {
        let mut stdout = stdout().lock();
        stdout.write_all(data)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Writes a temporary sibling of `path` then renames it, so `path` is never left half written.
fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = temporary_sibling(path)?;
    let result = File::create(&temp_path)
        .map(BufWriter::new)
        .and_then(|mut writer| {
            writer.write_all(data)?;
            close_file_writer(writer)
        })
        .and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        if let Err(error) = fs::remove_file(&temp_path) {
            debug!(
                "Could not remove the temporary file '{}': {error}",
                temp_path.display()
            );
        }
    }
    result
}

fn temporary_sibling(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' is not a file path", path.display()),
        )
    })?;
    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(format!(".{}.tmp", process::id()));
    Ok(path.with_file_name(temp_name))
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}

fn list_formats(output: &mut impl Write) -> anyhow::Result<()> {
    let registry = default_registry();
    writeln!(output, "Input formats:")?;
    for format in registry.list_parseable() {
        write_format(output, format)?;
    }
    writeln!(output, "\nOutput formats:")?;
    for format in registry.list_serializable() {
        write_format(output, format)?;
    }
    writeln!(
        output,
        "  {PHP:<10} PHP array of the RDF/JSON structure  [{PHP}]"
    )?;
    Ok(())
}

fn write_format(output: &mut impl Write, format: &FormatDescriptor) -> io::Result<()> {
    writeln!(
        output,
        "  {:<10} {}  [{}] ({})",
        format.name(),
        format.label(),
        format.extensions().collect::<Vec<_>>().join(", "),
        format.media_types().collect::<Vec<_>>().join(", ")
    )
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::{NamedTempFile, TempDir};
    use predicates::prelude::*;

    fn cli_command() -> Command {
        let mut command = Command::new(env!("CARGO"));
        command
            .arg("run")
            .arg("--bin")
            .arg("rdf-convert")
            .arg("--no-default-features");
        command.arg("--");
        command
    }

    #[test]
    fn cli_help() {
        cli_command()
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn cli_convert_help_lists_formats() {
        cli_command()
            .arg("convert")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Supported input formats:"))
            .stdout(predicate::str::contains(
                "json, jsonld, ntriples, turtle, rdfxml, n3, nquads, trig",
            ))
            .stdout(predicate::str::contains(
                "json, jsonld, ntriples, turtle, rdfxml, dot, n3, nquads, trig, php",
            ));
    }

    #[test]
    fn cli_formats() {
        cli_command()
            .arg("formats")
            .assert()
            .success()
            .stdout(predicate::str::contains("Input formats:"))
            .stdout(predicate::str::contains("jsonld"))
            .stdout(predicate::str::contains("text/vnd.graphviz"));
    }

    #[test]
    fn cli_convert_file() -> Result<()> {
        let input_file = NamedTempFile::new("input.ttl")?;
        input_file.write_str("@prefix schema: <http://schema.org/> .\n<#me> a schema:Person ;\n\tschema:name \"Foo Bar\"@en .\n")?;
        let output_file = NamedTempFile::new("output.nt")?;
        cli_command()
            .arg("convert")
            .arg(input_file.path())
            .arg("--base")
            .arg("http://example.com/")
            .arg("--to")
            .arg("nt")
            .arg("--output")
            .arg(output_file.path())
            .assert()
            .success();
        output_file.assert("<http://example.com/#me> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .\n<http://example.com/#me> <http://schema.org/name> \"Foo Bar\"@en .\n");
        Ok(())
    }

    #[test]
    fn cli_convert_file_resolves_against_file_url() -> Result<()> {
        let input_dir = TempDir::new()?;
        let relative_file = input_dir.child("relative.ttl");
        relative_file.write_str("<s> <p> <o> .")?;
        cli_command()
            .arg("convert")
            .arg(relative_file.path())
            .arg("--to")
            .arg("ntriples")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("<file:///"))
            .stdout(predicate::str::ends_with("/o> .\n"));
        Ok(())
    }

    #[test]
    fn cli_convert_guesses_from_stdin() {
        cli_command()
            .arg("convert")
            .arg("--to")
            .arg("ntriples")
            .arg("-v")
            .write_stdin(r#"{"@context": {"ex": "http://example.com/"}, "@id": "ex:s", "ex:p": "o"}"#)
            .assert()
            .success()
            .stdout("<http://example.com/s> <http://example.com/p> \"o\" .\n")
            .stderr(predicate::str::contains("Will guess input format..."))
            .stderr(predicate::str::contains("Reading from STDIN..."));
    }

    #[test]
    fn cli_convert_to_jsonld_by_default() {
        cli_command()
            .arg("convert")
            .arg("--from")
            .arg("ntriples")
            .write_stdin("<http://example.com/s> <http://example.com/p> \"o\" .\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"@graph\""))
            .stdout(predicate::str::contains("\"@id\": \"http://example.com/s\""));
    }

    #[test]
    fn cli_convert_to_php() {
        cli_command()
            .arg("convert")
            .arg("--from")
            .arg("ntriples")
            .arg("--to")
            .arg("php")
            .write_stdin("<http://example.com/s> <http://example.com/p> \"it's\" .\n")
            .assert()
            .success()
            .stdout(
                "<?php
return [
    'http://example.com/s' => [
        'http://example.com/p' => [
            [
                'type' => 'literal',
                'value' => 'it\\'s',
            ],
        ],
    ],
];
",
            );
    }

    #[test]
    fn cli_convert_unknown_output_format() {
        cli_command()
            .arg("convert")
            .arg("--from")
            .arg("ntriples")
            .arg("--to")
            .arg("yaml")
            .write_stdin("<http://example.com/s> <http://example.com/p> \"o\" .\n")
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("yaml"));
    }

    #[test]
    fn cli_convert_malformed_input_keeps_output_untouched() -> Result<()> {
        let output_file = NamedTempFile::new("output.jsonld")?;
        cli_command()
            .arg("convert")
            .arg("--from")
            .arg("turtle")
            .arg("--output")
            .arg(output_file.path())
            .write_stdin("{\"@context\": {}}")
            .assert()
            .failure()
            .stderr(predicate::str::contains("turtle"));
        output_file.assert(predicate::path::missing());
        Ok(())
    }

    #[test]
    fn cli_convert_missing_file() -> Result<()> {
        let input_dir = TempDir::new()?;
        cli_command()
            .arg("convert")
            .arg(input_dir.child("missing.ttl").path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not read the file"));
        Ok(())
    }

    #[test]
    fn atomic_write_replaces_file() -> Result<()> {
        let output_file = NamedTempFile::new("output.nt")?;
        output_file.write_str("old")?;
        write_atomically(output_file.path(), b"new")?;
        output_file.assert("new");
        let temp_path = temporary_sibling(output_file.path())?;
        assert!(!temp_path.exists(), "{} is left behind", temp_path.display());
        Ok(())
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
