//! Error taxonomy for definition loading.
//!
//! Every failure is fatal to the load that raised it. Variants carry the
//! document path and, where one exists, the offending identifier and key,
//! because these errors are authoring mistakes meant to be shown verbatim.

use std::path::PathBuf;

use thiserror::Error;

/// A failure while loading a definition document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document does not exist or cannot be read.
    #[error("the file \"{}\" does not exist or is not readable: {source}", .path.display())]
    ResourceNotFound {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The locator denotes a non-local resource.
    #[error("this is not a local file: \"{locator}\"")]
    NotLocalResource {
        /// The rejected locator.
        locator: String,
    },

    /// The document is not valid YAML.
    #[error("the file \"{}\" does not contain valid YAML: {source}", .path.display())]
    MalformedDocument {
        /// Document path.
        path: PathBuf,
        /// Underlying decoding or parser error.
        source: SyntaxError,
    },

    /// The document root is not a mapping.
    #[error("the definition file \"{}\" is not valid: it should contain a mapping", .path.display())]
    NotAMapping {
        /// Document path.
        path: PathBuf,
    },

    /// The document root has a key other than `imports`, `parameters`, `services`.
    #[error(
        "cannot load \"{}\": unexpected \"{key}\" key, expecting one of \"imports\", \"parameters\", \"services\"",
        .path.display()
    )]
    UnexpectedTopLevelKey {
        /// Document path.
        path: PathBuf,
        /// The unexpected key.
        key: String,
    },

    /// `parameters` is not a mapping.
    #[error("the \"parameters\" key should contain a mapping in \"{}\"", .path.display())]
    InvalidParametersSection {
        /// Document path.
        path: PathBuf,
    },

    /// `services` is not a mapping.
    #[error("the \"services\" key should contain a mapping in \"{}\"", .path.display())]
    InvalidServicesSection {
        /// Document path.
        path: PathBuf,
    },

    /// `imports` is not a sequence.
    #[error("the \"imports\" key should contain a sequence in \"{}\"", .path.display())]
    InvalidImportList {
        /// Document path.
        path: PathBuf,
    },

    /// An entry under `imports` is malformed.
    #[error("invalid import #{index} in \"{}\": {reason}", .path.display())]
    InvalidImportEntry {
        /// Document path.
        path: PathBuf,
        /// Zero-based position of the entry.
        index: usize,
        /// What is wrong with the entry.
        reason: String,
    },

    /// A service entry is neither a mapping nor an `@`-prefixed string.
    #[error(
        "a service definition must be a mapping or a string starting with \"@\" but {found} found for service \"{id}\" in \"{}\"",
        .path.display()
    )]
    InvalidServiceDeclaration {
        /// Document path.
        path: PathBuf,
        /// Service identifier.
        id: String,
        /// YAML type encountered.
        found: &'static str,
    },

    /// `calls` is not a sequence, or one of its entries is malformed.
    #[error("invalid \"calls\" for service \"{id}\" in \"{}\": {reason}", .path.display())]
    InvalidCallsList {
        /// Document path.
        path: PathBuf,
        /// Service identifier.
        id: String,
        /// What is wrong with the list.
        reason: String,
    },

    /// `factory` matches neither `service:method` nor `Type::method`.
    #[error(
        "a \"factory\" must be in the format \"service_name:method_name\" or \"class_name::method_name\", got \"{factory}\" for service \"{id}\" in \"{}\"",
        .path.display()
    )]
    InvalidFactoryFormat {
        /// Document path.
        path: PathBuf,
        /// Service identifier.
        id: String,
        /// The offending factory value.
        factory: String,
    },

    /// A service mapping has none of `class`, `alias`, `factory`.
    #[error(
        "invalid service declaration for \"{id}\" in \"{}\": specify at least a \"class\", \"alias\" or \"factory\" key",
        .path.display()
    )]
    MissingDefinitionKind {
        /// Document path.
        path: PathBuf,
        /// Service identifier.
        id: String,
    },

    /// A directive has a value of the wrong shape.
    #[error("the \"{key}\" key of service \"{id}\" in \"{}\" must be {expected}", .path.display())]
    InvalidDirectiveValue {
        /// Document path.
        path: PathBuf,
        /// Service identifier.
        id: String,
        /// Directive key.
        key: &'static str,
        /// Description of the accepted shape.
        expected: &'static str,
    },

    /// The document uses a feature the loader deliberately rejects.
    #[error("\"{feature}\" is not supported ({subject} in \"{}\")", .path.display())]
    UnsupportedFeature {
        /// Document path.
        path: PathBuf,
        /// Where the feature was found, e.g. `service "mailer"`.
        subject: String,
        /// Label of the rejected feature.
        feature: &'static str,
    },

    /// An import chain revisits a document that is still being loaded.
    #[error("cyclic import detected: {chain}")]
    CyclicImport {
        /// The chain of documents, ending with the revisited one.
        chain: String,
    },

    /// Imports are nested deeper than the configured limit.
    #[error("imports nested deeper than {limit} levels at \"{}\"", .path.display())]
    ImportTooDeep {
        /// Document that would exceed the limit.
        path: PathBuf,
        /// The configured limit.
        limit: usize,
    },
}

/// Why a document could not be parsed.
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// The bytes are not UTF-8.
    #[error("content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// The text is not valid YAML, or a merge key cannot be applied.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Fieldless discriminant of [`DefinitionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    ResourceNotFound,
    NotLocalResource,
    MalformedDocument,
    NotAMapping,
    UnexpectedTopLevelKey,
    InvalidParametersSection,
    InvalidServicesSection,
    InvalidImportList,
    InvalidImportEntry,
    InvalidServiceDeclaration,
    InvalidCallsList,
    InvalidFactoryFormat,
    MissingDefinitionKind,
    InvalidDirectiveValue,
    UnsupportedFeature,
    CyclicImport,
    ImportTooDeep,
}

impl DefinitionError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::NotLocalResource { .. } => ErrorKind::NotLocalResource,
            Self::MalformedDocument { .. } => ErrorKind::MalformedDocument,
            Self::NotAMapping { .. } => ErrorKind::NotAMapping,
            Self::UnexpectedTopLevelKey { .. } => ErrorKind::UnexpectedTopLevelKey,
            Self::InvalidParametersSection { .. } => ErrorKind::InvalidParametersSection,
            Self::InvalidServicesSection { .. } => ErrorKind::InvalidServicesSection,
            Self::InvalidImportList { .. } => ErrorKind::InvalidImportList,
            Self::InvalidImportEntry { .. } => ErrorKind::InvalidImportEntry,
            Self::InvalidServiceDeclaration { .. } => ErrorKind::InvalidServiceDeclaration,
            Self::InvalidCallsList { .. } => ErrorKind::InvalidCallsList,
            Self::InvalidFactoryFormat { .. } => ErrorKind::InvalidFactoryFormat,
            Self::MissingDefinitionKind { .. } => ErrorKind::MissingDefinitionKind,
            Self::InvalidDirectiveValue { .. } => ErrorKind::InvalidDirectiveValue,
            Self::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Self::CyclicImport { .. } => ErrorKind::CyclicImport,
            Self::ImportTooDeep { .. } => ErrorKind::ImportTooDeep,
        }
    }

    /// Returns the rejected feature label for [`DefinitionError::UnsupportedFeature`].
    #[must_use]
    pub const fn unsupported_feature(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedFeature { feature, .. } => Some(*feature),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DefinitionError>;
