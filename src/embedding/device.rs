use std::fmt;
use std::str::FromStr;

use candle_core::Device;
use tracing::{info, warn};

use super::error::EmbeddingError;

/// Backend the sentence encoder runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBackend {
    Cpu,
    Metal,
    Cuda,
}

impl ComputeBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeBackend::Cpu => "cpu",
            ComputeBackend::Metal => "metal",
            ComputeBackend::Cuda => "cuda",
        }
    }

    /// Whether this build links the backend at all.
    pub fn is_compiled(&self) -> bool {
        match self {
            ComputeBackend::Cpu => true,
            ComputeBackend::Metal => cfg!(feature = "metal"),
            ComputeBackend::Cuda => cfg!(feature = "cuda"),
        }
    }

    fn open(&self) -> Result<Device, EmbeddingError> {
        let unavailable = |reason: String| EmbeddingError::DeviceUnavailable {
            device: self.as_str().to_string(),
            reason,
        };

        if !self.is_compiled() {
            return Err(unavailable(format!(
                "built without the `{}` feature",
                self.as_str()
            )));
        }

        match self {
            ComputeBackend::Cpu => Ok(Device::Cpu),
            ComputeBackend::Metal => Device::new_metal(0).map_err(|e| unavailable(e.to_string())),
            ComputeBackend::Cuda => Device::new_cuda(0).map_err(|e| unavailable(e.to_string())),
        }
    }
}

impl fmt::Display for ComputeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested backend, from `RECOMMENDER_DEVICE`.
///
/// `Auto` tries every compiled GPU backend and settles on CPU; naming a backend makes its
/// absence a load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    #[default]
    Auto,
    Only(ComputeBackend),
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Only(ComputeBackend::Cpu)),
            "metal" => Ok(DevicePreference::Only(ComputeBackend::Metal)),
            "cuda" => Ok(DevicePreference::Only(ComputeBackend::Cuda)),
            other => Err(format!("unknown device '{other}' (expected auto, cpu, metal or cuda)")),
        }
    }
}

/// Opens the device for `preference`, returning it with the backend that was picked.
pub fn open_device(
    preference: DevicePreference,
) -> Result<(Device, ComputeBackend), EmbeddingError> {
    if let DevicePreference::Only(backend) = preference {
        let device = backend.open()?;
        info!(backend = %backend, "Encoder device opened");
        return Ok((device, backend));
    }

    for backend in [ComputeBackend::Metal, ComputeBackend::Cuda]
        .into_iter()
        .filter(ComputeBackend::is_compiled)
    {
        match backend.open() {
            Ok(device) => {
                info!(backend = %backend, "Encoder device opened");
                return Ok((device, backend));
            }
            Err(e) => warn!(error = %e, "GPU backend skipped"),
        }
    }

    info!("No GPU backend available, encoding on CPU");
    Ok((Device::Cpu, ComputeBackend::Cpu))
}
