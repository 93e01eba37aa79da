/// Core traits for delta conversion.
///
/// This module defines the `ToDocx` and `ToDelta` traits that connect the
/// delta model with a Word package.
use super::config::ConvertOptions;
use super::op::Delta;
use crate::common::Result;
use crate::ooxml::docx::Package;

/// Types that can be converted into a Word package.
///
/// # Examples
///
/// ```rust
/// use docx_delta::delta::{Delta, Op, ToDocx};
///
/// # fn main() -> Result<(), docx_delta::Error> {
/// let delta = Delta::new()
///     .push(Op::text("Title"))
///     .push(Op::text("\n").with_attr("header", 1));
/// let package = delta.to_docx()?;
/// assert_eq!(package.document().paragraphs().count(), 1);
/// # Ok(())
/// # }
/// ```
pub trait ToDocx {
    /// Convert with default options.
    fn to_docx(&self) -> Result<Package> {
        self.to_docx_with_options(&ConvertOptions::default())
    }

    /// Convert with custom options.
    fn to_docx_with_options(&self, options: &ConvertOptions) -> Result<Package>;
}

/// Types that can be converted into a delta.
///
/// Conversion takes `&mut self`: list families met along the way are
/// normalized to one list kind in place.
pub trait ToDelta {
    /// Convert with default options.
    fn to_delta(&mut self) -> Result<Delta> {
        self.to_delta_with_options(&ConvertOptions::default())
    }

    /// Convert with custom options.
    fn to_delta_with_options(&mut self, options: &ConvertOptions) -> Result<Delta>;
}
