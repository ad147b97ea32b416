//! JSON module images.

use crate::{file::ModuleFormat, metadata::module::ModuleDef, Result};

/// Module image holding the serialized metadata graph as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    /// Indented output
    #[must_use]
    pub fn pretty() -> Self {
        JsonFormat { pretty: true }
    }
}

impl ModuleFormat for JsonFormat {
    fn decode(&self, data: &[u8]) -> Result<ModuleDef> {
        Ok(serde_json::from_slice(data)?)
    }

    /// JSON images first, then PE images of dependencies that were never converted
    fn extensions(&self) -> &'static [&'static str] {
        &["json", "dll", "exe"]
    }

    fn encode(&self, module: &ModuleDef) -> Result<Vec<u8>> {
        let data = if self.pretty {
            serde_json::to_vec_pretty(module)?
        } else {
            serde_json::to_vec(module)?
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::orig_module, Error};

    #[test]
    fn test_encode_decode() {
        let module = orig_module();
        for format in [JsonFormat::default(), JsonFormat::pretty()] {
            let data = format.encode(&module).unwrap();
            assert_eq!(format.decode(&data).unwrap(), module);
        }
    }

    #[test]
    fn test_extensions() {
        assert_eq!(JsonFormat::default().extensions(), &["json", "dll", "exe"]);
    }

    #[test]
    fn test_decode_garbage() {
        let result = JsonFormat::default().decode(b"MZ\x90\x00");
        assert!(matches!(result, Err(Error::Format(_))));
    }
}
