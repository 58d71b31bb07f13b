//! Devices and the breakpoint each one maps to.

use crate::error::{Error, Result};
use crate::style::owned_css::{MediaCondition, MediaQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Breakpoint width in px; `None` is the base (unconditioned) device.
    pub width_media: Option<u32>,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width_media: Option<u32>) -> Self {
        Device {
            id: id.into(),
            name: name.into(),
            width_media,
        }
    }
}

/// Known devices plus the active one.
#[derive(Debug, Clone)]
pub struct DeviceManager {
    devices: Vec<Device>,
    selected: usize,
    condition: MediaCondition,
}

impl Default for DeviceManager {
    fn default() -> Self {
        DeviceManager::new(MediaCondition::MaxWidth)
    }
}

impl DeviceManager {
    /// Desktop, tablet (992px), mobile landscape (768px) and mobile portrait (480px).
    pub fn new(condition: MediaCondition) -> Self {
        DeviceManager {
            devices: vec![
                Device::new("desktop", "Desktop", None),
                Device::new("tablet", "Tablet", Some(992)),
                Device::new("mobileLandscape", "Mobile landscape", Some(768)),
                Device::new("mobilePortrait", "Mobile portrait", Some(480)),
            ],
            selected: 0,
            condition,
        }
    }

    pub fn condition(&self) -> MediaCondition {
        self.condition
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Adds a device, replacing any device with the same id.
    pub fn add(&mut self, device: Device) {
        match self.devices.iter_mut().find(|d| d.id == device.id) {
            Some(existing) => *existing = device,
            None => self.devices.push(device),
        }
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        self.selected = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::UnknownDevice(id.to_string()))?;
        Ok(())
    }

    pub fn selected(&self) -> &Device {
        &self.devices[self.selected]
    }

    /// Breakpoint of the active device, `None` for the base device.
    pub fn selected_media(&self) -> Option<MediaQuery> {
        self.selected()
            .width_media
            .map(|width| MediaQuery::new(self.condition, width))
    }
}
