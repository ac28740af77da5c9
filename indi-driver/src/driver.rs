//! The callback seam between the runtime and driver code.
//!
//! The dispatcher decodes each inbound command and hands the typed
//! payload to these methods. All of them run on the reader task, so a
//! slow callback delays the next inbound element; long work belongs
//! in a spawned task.

use crate::types::property::SwitchState;
use crate::xml::Element;
use crate::{Result, Runtime};
use async_trait::async_trait;

/// One decoded payload from an inbound `newBLOBVector`. `size` is the
/// peer's advertised payload size, `bloblen` the byte count actually
/// decoded into `data`; the two differ when the payload is
/// compressed. The buffer is owned by the receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobPayload {
    pub name: String,
    pub format: String,
    pub size: i64,
    pub bloblen: i64,
    pub data: Vec<u8>,
}

/// Implemented by every driver. Only `get_properties` is mandatory;
/// the rest default to ignoring the traffic, so a driver implements
/// just the kinds it owns.
#[async_trait]
pub trait Driver: Send + Sync {
    /// The peer wants this driver's property definitions, for one
    /// device or (when `device` is `None`) for all of them. The
    /// usual response is a series of `def_*` calls on the runtime.
    async fn get_properties(
        &self,
        rt: &Runtime,
        device: Option<&str>,
    ) -> Result<()>;

    /// An authoritative write to a number property. The typical body
    /// validates and commits through [`Runtime::apply_numbers`], then
    /// acts on the hardware.
    async fn new_number(
        &self,
        _rt: &Runtime,
        _device: &str,
        _name: &str,
        _values: Vec<(String, f64)>,
    ) -> Result<()> {
        Ok(())
    }

    /// An authoritative write to a switch property.
    async fn new_switch(
        &self,
        _rt: &Runtime,
        _device: &str,
        _name: &str,
        _states: Vec<(String, SwitchState)>,
    ) -> Result<()> {
        Ok(())
    }

    /// An authoritative write to a text property.
    async fn new_text(
        &self,
        _rt: &Runtime,
        _device: &str,
        _name: &str,
        _texts: Vec<(String, String)>,
    ) -> Result<()> {
        Ok(())
    }

    /// An authoritative write to a BLOB property.
    async fn new_blob(
        &self,
        _rt: &Runtime,
        _device: &str,
        _name: &str,
        _blobs: Vec<BlobPayload>,
    ) -> Result<()> {
        Ok(())
    }

    /// Traffic from a snooped device, forwarded whole. The runtime
    /// doesn't track which devices a driver watches; filtering on the
    /// element's `device` attribute is the driver's job.
    async fn snoop(&self, _rt: &Runtime, _element: &Element) -> Result<()> {
        Ok(())
    }
}
