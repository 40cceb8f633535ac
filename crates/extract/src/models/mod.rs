mod fragment;
mod identifier;
mod program;

pub use self::fragment::Fragment;
pub use self::identifier::IdentifierSource;
pub use self::program::{Fragments, Program};
