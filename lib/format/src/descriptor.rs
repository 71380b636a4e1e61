use std::fmt;

/// The closed set of serialization formats rdf-convert knows how to read or write.
///
/// Each [`FormatDescriptor`] is bound to one of these variants. The parser and serializer
/// dispatchers match on the variant, never on the format name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// [RDF 1.1 JSON Alternate Serialization](https://www.w3.org/TR/rdf-json/)
    RdfJson,
    /// [JSON-LD](https://www.w3.org/TR/json-ld/)
    JsonLd,
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [Turtle](https://www.w3.org/TR/turtle/)
    Turtle,
    /// [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/)
    RdfXml,
    /// [Graphviz DOT](https://graphviz.org/doc/info/lang.html), only written.
    Graphviz,
    /// [N3](https://w3c.github.io/N3/spec/)
    N3,
    /// [N-Quads](https://www.w3.org/TR/n-quads/)
    NQuads,
    /// [TriG](https://www.w3.org/TR/trig/)
    TriG,
}

impl RdfFormat {
    /// All the formats, in the order they are registered by default.
    pub const ALL: [Self; 9] = [
        Self::RdfJson,
        Self::JsonLd,
        Self::NTriples,
        Self::Turtle,
        Self::RdfXml,
        Self::Graphviz,
        Self::N3,
        Self::NQuads,
        Self::TriG,
    ];

    /// The canonical registry name.
    ///
    /// ```
    /// use rdf_convert_format::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::JsonLd.name(), "jsonld")
    /// ```
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RdfJson => "json",
            Self::JsonLd => "jsonld",
            Self::NTriples => "ntriples",
            Self::Turtle => "turtle",
            Self::RdfXml => "rdfxml",
            Self::Graphviz => "dot",
            Self::N3 => "n3",
            Self::NQuads => "nquads",
            Self::TriG => "trig",
        }
    }

    /// A human readable name.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RdfJson => "RDF/JSON Resource-Centric",
            Self::JsonLd => "JSON-LD",
            Self::NTriples => "N-Triples",
            Self::Turtle => "Turtle Terse RDF Triple Language",
            Self::RdfXml => "RDF/XML",
            Self::Graphviz => "Graphviz",
            Self::N3 => "Notation3",
            Self::NQuads => "N-Quads",
            Self::TriG => "TriG",
        }
    }

    /// The MIME types of the format, the canonical one first.
    #[inline]
    pub const fn media_types(self) -> &'static [&'static str] {
        match self {
            Self::RdfJson => &["application/json", "text/json", "application/rdf+json"],
            Self::JsonLd => &["application/ld+json"],
            Self::NTriples => &[
                "application/n-triples",
                "text/plain",
                "text/ntriples",
                "application/ntriples",
                "application/x-ntriples",
            ],
            Self::Turtle => &["text/turtle", "application/turtle", "application/x-turtle"],
            Self::RdfXml => &["application/rdf+xml", "application/xml"],
            Self::Graphviz => &["text/vnd.graphviz"],
            Self::N3 => &["text/n3", "text/rdf+n3"],
            Self::NQuads => &["application/n-quads"],
            Self::TriG => &["application/trig"],
        }
    }

    /// The file extensions of the format, the canonical one first.
    #[inline]
    pub const fn file_extensions(self) -> &'static [&'static str] {
        match self {
            Self::RdfJson => &["json"],
            Self::JsonLd => &["jsonld"],
            Self::NTriples => &["nt"],
            Self::Turtle => &["ttl"],
            Self::RdfXml => &["rdf", "xrdf", "owl"],
            Self::Graphviz => &["gv", "dot"],
            Self::N3 => &["n3"],
            Self::NQuads => &["nq"],
            Self::TriG => &["trig"],
        }
    }

    /// Checks if rdf-convert has a parser for this format.
    #[inline]
    pub const fn supports_parsing(self) -> bool {
        !matches!(self, Self::Graphviz)
    }

    /// Checks if rdf-convert has a serializer for this format.
    #[inline]
    pub const fn supports_serialization(self) -> bool {
        true
    }
}

impl fmt::Display for RdfFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registry entry: the identity of a format and what can be done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    name: String,
    label: String,
    media_types: Vec<String>,
    extensions: Vec<String>,
    has_parser: bool,
    has_serializer: bool,
    format: RdfFormat,
}

impl FormatDescriptor {
    /// Builds a descriptor named `name` for `format`, without MIME types nor file extensions.
    ///
    /// The capabilities are the ones of `format`. The name is stored lowercase.
    pub fn new(name: impl Into<String>, label: impl Into<String>, format: RdfFormat) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            label: label.into(),
            media_types: Vec::new(),
            extensions: Vec::new(),
            has_parser: format.supports_parsing(),
            has_serializer: format.supports_serialization(),
            format,
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_types
            .push(media_type.into().to_ascii_lowercase());
        self
    }

    /// Adds a file extension, with or without its leading dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extensions.push(
            extension
                .strip_prefix('.')
                .unwrap_or(&extension)
                .to_ascii_lowercase(),
        );
        self
    }

    /// Removes the parser capability, even if the format supports it.
    #[must_use]
    pub fn without_parser(mut self) -> Self {
        self.has_parser = false;
        self
    }

    /// Removes the serializer capability, even if the format supports it.
    #[must_use]
    pub fn without_serializer(mut self) -> Self {
        self.has_serializer = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn media_types(&self) -> impl Iterator<Item = &str> + Clone {
        self.media_types.iter().map(String::as_str)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> + Clone {
        self.extensions.iter().map(String::as_str)
    }

    pub fn has_parser(&self) -> bool {
        self.has_parser
    }

    pub fn has_serializer(&self) -> bool {
        self.has_serializer
    }

    /// The concrete format the parser and serializer are bound to.
    pub fn format(&self) -> RdfFormat {
        self.format
    }

    /// Checks the MIME type, ignoring case and parameters like `; charset=utf-8`.
    pub fn has_media_type(&self, media_type: &str) -> bool {
        let media_type = essence(media_type);
        self.media_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(media_type))
    }

    /// Checks the file extension, ignoring case.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

impl From<RdfFormat> for FormatDescriptor {
    fn from(format: RdfFormat) -> Self {
        let descriptor = Self::new(format.name(), format.label(), format);
        let descriptor = format
            .media_types()
            .iter()
            .fold(descriptor, |d, media_type| d.with_media_type(*media_type));
        format
            .file_extensions()
            .iter()
            .fold(descriptor, |d, extension| d.with_extension(*extension))
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Strips the parameters of a MIME type.
pub(crate) fn essence(media_type: &str) -> &str {
    media_type
        .split_once(';')
        .map_or(media_type, |(essence, _)| essence)
        .trim()
}
