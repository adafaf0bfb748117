use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A builtin call does not carry the number of arguments the catalog declares.
    #[snafu(display("{op} expects {expected} arguments, got {actual}"))]
    ArityMismatch { op: &'static str, expected: usize, actual: usize },

    /// Name does not belong to the builtin catalog.
    #[snafu(display("unknown builtin operation '{name}'"))]
    UnknownBuiltin { name: String },

    /// Two functions in one module share a name.
    #[snafu(display("function '{name}' is already defined in this module"))]
    DuplicateFunction { name: String },
}
