pub mod interval;
pub mod target;

// re-export for cleaner imports
pub use self::interval::{GenomicInterval, SignalInterval};
pub use self::target::{Strand, Target};
