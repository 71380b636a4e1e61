use clap::{ArgAction, Parser, Subcommand, ValueHint};
use rdf_convert::default_registry;
use rdf_convert::format::FormatDescriptor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "rdf-convert")]
/// Converts RDF documents between JSON-LD, RDF/JSON, N-Triples, Turtle, RDF/XML and more
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a file from one format to another
    #[command(after_help = formats_help())]
    Convert {
        /// The input source, a file or an http(s) URL
        ///
        /// If no input is given, stdin is read.
        #[arg(value_hint = ValueHint::AnyPath)]
        input: Option<String>,
        /// The format to read the input with
        ///
        /// It can be a format name like "turtle", an extension like "nt" or a MIME type like
        /// "application/n-triples".
        ///
        /// By default the format is guessed from the input name and content.
        #[arg(long)]
        from: Option<String>,
        /// The format to write
        ///
        /// It can be a format name, an extension, a MIME type or "php" for a PHP array of the
        /// RDF/JSON structure.
        #[arg(long, default_value = "jsonld")]
        to: String,
        /// The output file
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Base IRI of the input
        ///
        /// By default the input URL or the absolute file URL is used.
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Print progress messages, twice for debugging details
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
    /// List the supported formats
    Formats,
}

/// The supported input and output formats, as appended to the help of `convert`.
fn formats_help() -> String {
    let registry = default_registry();
    format!(
        "Supported input formats:\n  {}\n\nSupported output formats:\n  {}, php",
        format_names(registry.list_parseable()),
        format_names(registry.list_serializable())
    )
}

fn format_names<'a>(formats: impl Iterator<Item = &'a FormatDescriptor>) -> String {
    formats
        .map(FormatDescriptor::name)
        .collect::<Vec<_>>()
        .join(", ")
}
