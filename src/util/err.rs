/// Converts errors from their error type (of the submodule) to that of
/// a traffic_matcher::Error variant.
///
/// ```rust,ignore
/// use traffic_matcher::error::DefectError;
/// traffic_matcher::impl_err!(DefectError, Defect);
/// ```
pub mod err_macro {
    #[macro_export]
    macro_rules! impl_err {
        ($from:ty, $variant:ident) => {
            impl From<$from> for $crate::Error {
                fn from(value: $from) -> Self {
                    $crate::Error::$variant(value)
                }
            }
        };
    }

    pub use impl_err;
}
