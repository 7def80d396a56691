use anyhow::Result;

/// Process-wide handle to the ONNX Runtime environment.
///
/// Loading a pipeline requires a reference to this handle, which keeps the
/// "runtime before model" ordering in the type system instead of relying on an
/// ambient global. Committing the environment twice in one process is harmless
/// but not useful; the backing resources live until process exit.
pub struct InferenceRuntime {
    _priv: (),
}

impl InferenceRuntime {
    /// Commit the ONNX Runtime environment, registering the CUDA execution
    /// provider when the `cuda` feature is enabled.
    pub fn init() -> Result<Self> {
        #[cfg(feature = "cuda")]
        ort::init()
            .with_name("stylegan_rs")
            .with_execution_providers([
                ort::execution_providers::CUDAExecutionProvider::default().build()
            ])
            .commit()?;
        #[cfg(not(feature = "cuda"))]
        ort::init().with_name("stylegan_rs").commit()?;

        Ok(Self { _priv: () })
    }
}
