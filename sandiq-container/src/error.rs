//! Error types for Sandiq container operations.
//!
//! The container separates "nothing registered" ([`SandiqError::NotFound`])
//! from "registered but could not be built" ([`SandiqError::Resolution`]),
//! so the caller knows whether to register something or to fix a
//! constructor.

use std::fmt;

use sandiq_support::rendering::{render_chain, render_short_chain};

use crate::key::Identifier;

/// Main error type for all Sandiq operations.
#[derive(Debug, thiserror::Error)]
pub enum SandiqError {
    /// Identifier has no definition and does not name a catalogued type.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// A definition or type exists, but an argument could not be supplied.
    #[error(transparent)]
    Resolution(ResolutionError),

    /// Autowiring reached an abstract type that has no concrete binding.
    #[error("{}", .0)]
    Uninstantiable(UninstantiableError),

    /// An identifier was requested while it was already being resolved.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// The resolution path grew past the configured limit.
    #[error("Resolution depth limit of {limit} exceeded while resolving {id}")]
    DepthExceeded { id: Identifier, limit: usize },

    /// A value did not have the shape the caller asked for.
    #[error("Type mismatch for {id}: expected {expected}, found {found}")]
    TypeMismatch {
        id: Identifier,
        expected: &'static str,
        found: String,
    },

    /// Construction code (a factory or a constructor) reported an error.
    #[error("Failed to construct {id}: {source}")]
    Construction {
        id: Identifier,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SandiqError {
    /// Wraps an error raised by user construction code.
    pub fn construction(
        id: impl Into<Identifier>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SandiqError::Construction {
            id: id.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SandiqError::NotFound(_))
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, SandiqError::Resolution(_))
    }
}

/// Error when an identifier has nothing registered.
#[derive(Debug)]
pub struct NotFoundError {
    /// The identifier that was requested
    pub requested: Identifier,
    /// Known identifiers with a similar name
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service '{}' not found in the container", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register it with .set(\"{}\", ...) or add its type to the catalog",
            self.requested
        )
    }
}

/// Why autowiring gave up on a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionReason {
    /// Scalar constructor parameter without a declared default.
    MissingDefault { parameter: &'static str },
    /// The type name is not in the catalog.
    UnknownType,
    /// The constructor failed; see the error source.
    ConstructionFailed,
}

/// Error when a service exists but could not be built.
#[derive(Debug)]
pub struct ResolutionError {
    /// The service being built
    pub service: Identifier,
    pub reason: ResolutionReason,
    /// Identifiers being resolved when the failure happened, outermost first
    pub chain: Vec<Identifier>,
    pub source: Option<Box<SandiqError>>,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ResolutionReason::MissingDefault { parameter } => write!(
                f,
                "Service \"{}\" could not be resolved due constructor parameter \"{parameter}\": \
                 it has no service type and no default value",
                self.service
            )?,
            ResolutionReason::UnknownType => write!(
                f,
                "Service \"{}\" could not be resolved: no constructible type with this name",
                self.service
            )?,
            ResolutionReason::ConstructionFailed => write!(
                f,
                "Service \"{}\" could not be resolved because its constructor failed",
                self.service
            )?,
        }

        if self.chain.len() > 1 {
            write!(f, "\n  Resolution chain: {}", render_chain(&self.chain))?;
        }

        if let Some(source) = &self.source {
            write!(f, "\n  Caused by: {source}")?;
        }

        if let ResolutionReason::MissingDefault { .. } = self.reason {
            write!(
                f,
                "\n  Hint: give the parameter a default or register a factory for \"{}\"",
                self.service
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Error when an abstract type is autowired without a binding.
#[derive(Debug)]
pub struct UninstantiableError {
    pub type_name: Identifier,
    pub chain: Vec<Identifier>,
}

impl fmt::Display for UninstantiableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot instantiate abstract type {}", self.type_name)?;

        if self.chain.len() > 1 {
            write!(f, "\n  Required through: {}", render_chain(&self.chain))?;
        }

        write!(
            f,
            "\n  Hint: bind a concrete type or a factory under \"{}\"",
            self.type_name
        )
    }
}

/// Error when a circular dependency is detected.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Example: ["A", "B", "C", "A"]
    pub chain: Vec<Identifier>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  ")?;

        write!(f, "{}", render_short_chain(&self.chain))?;

        write!(
            f,
            "\n  Hint: break the cycle with a factory that resolves one side later"
        )
    }
}

/// Convenient Result type for Sandiq operations.
pub type Result<T> = std::result::Result<T, SandiqError>;
