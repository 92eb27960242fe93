pub mod anchor;
pub mod chromosome;

// re-export for cleaner imports
pub use self::anchor::{ReadAnchor, Strand};
pub use self::chromosome::ChromosomeReads;
