use std::fmt;

use crate::error::Result;

const LOCAL_OBJECT_MIME: &str = "application/x-perspecta-local-object";

/// Payload type negotiated by drag-and-drop and export targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataFlavor {
    mime_type: String,
}

impl DataFlavor {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
        }
    }

    /// Flavor for an in-process object of the given type path.
    pub fn local_object(type_path: &str) -> Self {
        Self::new(format!("{LOCAL_OBJECT_MIME};class={type_path}"))
    }

    /// The one flavor a series can be transferred as.
    pub fn series() -> Self {
        Self::local_object(concat!(env!("CARGO_CRATE_NAME"), "::series::Series"))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

impl fmt::Display for DataFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type)
    }
}

pub trait Transferable {
    fn transfer_flavors(&self) -> Vec<DataFlavor>;

    fn is_flavor_supported(&self, flavor: &DataFlavor) -> bool {
        self.transfer_flavors().contains(flavor)
    }

    fn transfer_data(&self, flavor: &DataFlavor) -> Result<&Self>;
}
