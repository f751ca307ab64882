use std::fmt::Display;

pub trait ResultExt<T> {
    /// Flatten the error into a string carrying variant, e.g. `.map_err_str(Error::Sign)`
    fn map_err_str<E>(self, variant: impl FnOnce(String) -> E) -> Result<T, E>;
}

impl<T, Source: Display> ResultExt<T> for Result<T, Source> {
    fn map_err_str<E>(self, variant: impl FnOnce(String) -> E) -> Result<T, E> {
        self.map_err(|error| variant(error.to_string()))
    }
}
