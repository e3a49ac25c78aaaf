use crate::World;

/// Boxed error type carried by [`SystemError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a system during a tick.
#[derive(Debug, thiserror::Error)]
#[error("system `{system}` failed: {source}")]
pub struct SystemError {
    pub system: &'static str,
    #[source]
    pub source: BoxError,
}

impl SystemError {
    pub fn new(system: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            system,
            source: source.into(),
        }
    }
}

/// One stage of the per-tick pipeline.
///
/// Systems run in a fixed declared order against a single `World`; there is
/// no parallelism between them, so ordering alone decides what each one sees.
pub trait System {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    fn run(&mut self, world: &mut World) -> Result<(), SystemError>;
}
