use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The compositor never announced the shell interface. The shell
    /// cannot function without it; callers terminate on this.
    #[error("compositor does not expose the mandatory shell interface (zwlr_layer_shell_v1)")]
    MissingShellCapability,
}
