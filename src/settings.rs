//! Shader Manager Settings
//!
//! Configures where descriptors are looked up and which optional checks run.
//!
//! ```rust,ignore
//! use myth_effects::ShaderSettings;
//!
//! let settings = ShaderSettings {
//!     validate_programs: false,
//!     ..Default::default()
//! };
//! ```

use std::path::{Path, PathBuf};

/// Configuration for a [`ShaderManager`](crate::ShaderManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSettings {
    /// Directory holding program descriptors. Vertex and fragment `file`
    /// attributes are resolved relative to it as well.
    pub program_dir: PathBuf,
    /// Directory holding effect descriptors.
    pub effect_dir: PathBuf,
    /// File extension of both descriptor kinds.
    pub descriptor_extension: String,
    /// Run the schema validator on program descriptors.
    pub validate_programs: bool,
    /// Pre-intern common define names and values on construction.
    pub preload_symbols: bool,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            program_dir: PathBuf::from("shaders"),
            effect_dir: PathBuf::from("shaders/effects"),
            descriptor_extension: "xml".to_string(),
            validate_programs: true,
            preload_symbols: true,
        }
    }
}

impl ShaderSettings {
    /// Path of the descriptor for program `name`.
    #[must_use]
    pub fn program_descriptor(&self, name: &str) -> PathBuf {
        Self::descriptor(&self.program_dir, name, &self.descriptor_extension)
    }

    /// Path of the descriptor for effect `name`.
    #[must_use]
    pub fn effect_descriptor(&self, name: &str) -> PathBuf {
        Self::descriptor(&self.effect_dir, name, &self.descriptor_extension)
    }

    /// Path of a vertex/fragment source named by a program descriptor.
    #[must_use]
    pub fn shader_source(&self, file: &str) -> PathBuf {
        self.program_dir.join(file)
    }

    fn descriptor(dir: &Path, name: &str, extension: &str) -> PathBuf {
        dir.join(format!("{name}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let settings = ShaderSettings::default();
        assert_eq!(
            settings.program_descriptor("model_common"),
            Path::new("shaders/model_common.xml")
        );
        assert_eq!(
            settings.effect_descriptor("model"),
            Path::new("shaders/effects/model.xml")
        );
        assert_eq!(
            settings.shader_source("glsl/model_common.vs"),
            Path::new("shaders/glsl/model_common.vs")
        );
    }
}
