use crate::descriptor::{FormatDescriptor, RdfFormat};
use crate::resolver::GUESS;
use rdf_convert_common::{ConvertError, ConvertResult};
use std::collections::HashMap;

/// The catalog of known formats.
///
/// A registry is filled once, while the process starts, and only read afterwards. Descriptors are
/// kept in registration order, which is also the order of [`list_parseable`](Self::list_parseable)
/// and [`list_serializable`](Self::list_serializable).
///
/// ```
/// use rdf_convert_format::FormatRegistry;
///
/// let registry = FormatRegistry::with_builtin_formats();
/// assert_eq!(registry.lookup("JSONLD")?.label(), "JSON-LD");
/// assert!(registry.list_serializable().any(|d| d.name() == "dot"));
/// assert!(!registry.list_parseable().any(|d| d.name() == "dot"));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: Vec<FormatDescriptor>,
    by_name: HashMap<String, usize>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every [`RdfFormat`] registered under its canonical name, in the
    /// order of [`RdfFormat::ALL`].
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        for format in RdfFormat::ALL {
            registry.push(format.into());
        }
        registry
    }

    /// Adds a format.
    ///
    /// Fails if a format with the same name (ignoring case) already exists or if the name is not
    /// usable, e.g. the reserved `guess`.
    pub fn register(&mut self, descriptor: FormatDescriptor) -> ConvertResult<()> {
        let name = descriptor.name();
        if name.is_empty() || name == GUESS || name.chars().any(char::is_whitespace) {
            return Err(ConvertError::InvalidFormatName(name.to_owned()));
        }
        if self.by_name.contains_key(name) {
            return Err(ConvertError::DuplicateFormat(name.to_owned()));
        }
        self.push(descriptor);
        Ok(())
    }

    fn push(&mut self, descriptor: FormatDescriptor) {
        self.by_name
            .insert(descriptor.name().to_owned(), self.formats.len());
        self.formats.push(descriptor);
    }

    /// Returns the format named `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&FormatDescriptor> {
        let index = match self.by_name.get(name) {
            Some(index) => *index,
            None => *self.by_name.get(&name.to_ascii_lowercase())?,
        };
        self.formats.get(index)
    }

    /// Returns the format named `name`, ignoring case, or fails with
    /// [`ConvertError::UnknownFormat`].
    pub fn lookup(&self, name: &str) -> ConvertResult<&FormatDescriptor> {
        self.get(name)
            .ok_or_else(|| ConvertError::UnknownFormat(name.to_owned()))
    }

    /// Returns the first registered format declaring the MIME type.
    pub fn lookup_media_type(&self, media_type: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|d| d.has_media_type(media_type))
    }

    /// Returns all the formats declaring the file extension, in registration order.
    ///
    /// The iterator only borrows the registry, not `extension`.
    pub fn formats_for_extension(
        &self,
        extension: &str,
    ) -> impl Iterator<Item = &FormatDescriptor> + Clone + '_ {
        let extension = extension.to_owned();
        self.formats
            .iter()
            .filter(move |d| d.has_extension(&extension))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormatDescriptor> {
        self.formats.iter()
    }

    /// The formats that can be read, in registration order.
    pub fn list_parseable(&self) -> impl Iterator<Item = &FormatDescriptor> + Clone {
        self.formats.iter().filter(|d| d.has_parser())
    }

    /// The formats that can be written, in registration order.
    pub fn list_serializable(&self) -> impl Iterator<Item = &FormatDescriptor> + Clone {
        self.formats.iter().filter(|d| d.has_serializer())
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl<'a> IntoIterator for &'a FormatRegistry {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
