/// Freshness of a registered compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Registered but never run.
    #[default]
    BeforeInit,
    /// A dependency changed since the last run.
    Dirty,
    /// Up to date with its dependencies.
    Clean,
}

impl StateSyncStatus {
    pub fn needs_run(self) -> bool {
        matches!(self, Self::BeforeInit | Self::Dirty)
    }
}
