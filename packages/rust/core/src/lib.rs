//! Document assembly and generation for per-language llms.txt files.
//!
//! This crate ties the site source, the content normalizer, and artifact
//! storage together: [`assembler`] builds one markdown document per language,
//! [`menu`] derives the two-level navigation tree, and [`pipeline`] runs
//! generation across languages with per-language results.

pub mod assembler;
pub mod menu;
pub mod pipeline;
pub mod snapshot;
pub mod source;

pub use assembler::{Assembler, DocumentSections, SummaryKind};
pub use menu::{MenuNode, MenuSection, MenuTree};
pub use pipeline::{
    GenerationReport, Generator, LanguageOutcome, OutcomeStatus, ProgressReporter, SilentProgress,
    llms_path, public_url,
};
pub use snapshot::{SiteSnapshot, SnapshotSource, undeclared_languages};
pub use source::SiteSource;
