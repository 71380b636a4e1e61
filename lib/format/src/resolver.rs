use crate::descriptor::{essence, FormatDescriptor};
use crate::registry::FormatRegistry;
use crate::sniff::sniff;
use rdf_convert_common::{ConvertError, ConvertResult};
use tracing::debug;

/// The sentinel a user passes to ask for the input format to be guessed.
pub const GUESS: &str = "guess";

/// What the caller knows about the input format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormatHint {
    /// Guess from the source name, then from the content.
    #[default]
    Guess,
    /// A format name, MIME type or file extension that must be used as is.
    Named(String),
}

impl FormatHint {
    /// Builds a hint from an optional user value: a missing value and `guess` both mean
    /// [`FormatHint::Guess`].
    pub fn from_option(hint: Option<&str>) -> Self {
        match hint {
            None => Self::Guess,
            Some(hint) if hint.trim().eq_ignore_ascii_case(GUESS) => Self::Guess,
            Some(hint) => Self::Named(hint.trim().to_owned()),
        }
    }
}

impl From<Option<&str>> for FormatHint {
    fn from(hint: Option<&str>) -> Self {
        Self::from_option(hint)
    }
}

impl From<&str> for FormatHint {
    fn from(hint: &str) -> Self {
        Self::from_option(Some(hint))
    }
}

/// Picks the format to parse or serialize with, according to a [`FormatRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct FormatResolver<'r> {
    registry: &'r FormatRegistry,
}

impl<'r> FormatResolver<'r> {
    pub fn new(registry: &'r FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r FormatRegistry {
        self.registry
    }

    /// Picks the format to parse an input with. The first matching rule wins:
    /// 1. A named hint is used exactly. It fails if the hint is unknown, it is never re-guessed.
    /// 2. The extension of `source_name`, if exactly one parseable format declares it.
    /// 3. The signature of `sniffed`, the first bytes of the content.
    ///
    /// ```
    /// use rdf_convert_format::{FormatHint, FormatRegistry, FormatResolver};
    ///
    /// let registry = FormatRegistry::with_builtin_formats();
    /// let resolver = FormatResolver::new(&registry);
    /// let format = resolver.resolve_for_parse(&FormatHint::Guess, Some("data.ttl"), None)?;
    /// assert_eq!(format.name(), "turtle");
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn resolve_for_parse(
        &self,
        hint: &FormatHint,
        source_name: Option<&str>,
        sniffed: Option<&[u8]>,
    ) -> ConvertResult<&'r FormatDescriptor> {
        if let FormatHint::Named(hint) = hint {
            let descriptor = self
                .find(hint)
                .ok_or_else(|| ConvertError::UnknownFormat(hint.clone()))?;
            if !descriptor.has_parser() {
                return Err(ConvertError::NoParserForFormat(descriptor.name().to_owned()));
            }
            debug!("Input format '{}' given explicitly", descriptor.name());
            return Ok(descriptor);
        }

        if let Some(descriptor) = source_name.and_then(|name| self.guess_from_source_name(name)) {
            debug!(
                "Input format '{}' guessed from the source name",
                descriptor.name()
            );
            return Ok(descriptor);
        }

        if let Some(descriptor) = sniffed.and_then(|data| self.guess_from_content(data)) {
            debug!(
                "Input format '{}' guessed from the content",
                descriptor.name()
            );
            return Ok(descriptor);
        }

        Err(ConvertError::FormatGuessFailed {
            source_name: source_name.map(ToOwned::to_owned),
        })
    }

    /// Confirms the format to serialize with.
    ///
    /// `requested` may be a format name, a MIME type or a file extension.
    pub fn resolve_for_serialize(&self, requested: &str) -> ConvertResult<&'r FormatDescriptor> {
        let descriptor = self
            .find(requested.trim())
            .ok_or_else(|| ConvertError::UnknownFormat(requested.to_owned()))?;
        if !descriptor.has_serializer() {
            return Err(ConvertError::NoSerializerForFormat(
                descriptor.name().to_owned(),
            ));
        }
        debug!("Output format '{}'", descriptor.name());
        Ok(descriptor)
    }

    /// Returns the parseable format declaring the extension of `source_name`, if there is
    /// exactly one.
    ///
    /// `source_name` may be a file path or a URL.
    pub fn guess_from_source_name(&self, source_name: &str) -> Option<&'r FormatDescriptor> {
        let extension = extension(source_name)?;
        let mut candidates = self
            .registry
            .formats_for_extension(extension)
            .filter(|d| d.has_parser());
        let candidate = candidates.next()?;
        candidates.next().is_none().then_some(candidate)
    }

    /// Returns the parseable format whose signature is found in the content.
    pub fn guess_from_content(&self, data: &[u8]) -> Option<&'r FormatDescriptor> {
        self.registry
            .get(sniff(data)?)
            .filter(|d| d.has_parser())
    }

    /// Looks a label up as a format name, then as a MIME type, then as a file extension.
    fn find(&self, label: &str) -> Option<&'r FormatDescriptor> {
        if let Some(descriptor) = self.registry.get(label) {
            return Some(descriptor);
        }
        if essence(label).contains('/') {
            return self.registry.lookup_media_type(label);
        }
        let extension = label.strip_prefix('.').unwrap_or(label);
        self.registry.formats_for_extension(extension).next()
    }
}

/// The extension of the last path segment, ignoring URL queries and fragments.
fn extension(source_name: &str) -> Option<&str> {
    let path = source_name
        .split(['?', '#'])
        .next()
        .unwrap_or(source_name);
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, extension) = file_name.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}
