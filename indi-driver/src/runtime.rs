//! The driver-facing protocol handle.
//!
//! A [`Runtime`] wraps the outbound stream, the property registry and
//! the BLOB flow controller behind a cheaply-cloneable handle, so any
//! driver task can emit definitions, updates and messages from
//! anywhere. Every public operation here produces exactly one
//! protocol element.

use crate::registry::{Property, Registry};
use crate::types::property::{
    BlobPolicy, BlobVector, LightVector, NumberVector, SwitchVector,
    TextVector,
};
use crate::writer::{timestamp, Writer};
use crate::xml::escape;
use crate::{sexa, Result, PROTOCOL_VERSION};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::{oneshot, Mutex};

/// Per-process settings carried by the runtime.
#[derive(Clone, Debug)]
pub struct Options {
    /// The driver's executable name, used in diagnostics.
    pub name: String,

    /// When set, every inbound element is echoed to the log before it
    /// is dispatched.
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            name: String::from("indi-driver"),
            verbose: false,
        }
    }
}

// The BLOB flow controller. The gate is held for the whole of a
// `set_blob` call, so there is never more than one unacknowledged
// ping on the stream and BLOB emissions are serialized process-wide.

struct BlobGate {
    counter: u64,
    pending: Option<oneshot::Receiver<()>>,
}

struct Inner {
    writer: Writer,
    registry: Registry,
    options: Options,
    blob_gate: Mutex<BlobGate>,
    reply_slot: Mutex<Option<(String, oneshot::Sender<()>)>>,
}

/// Handle to the protocol runtime. Clones share the same stream,
/// registry and flow controller.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl Runtime {
    /// Creates a runtime writing to `sink`. Most drivers go through
    /// [`crate::run`] instead, which wires stdout up here.
    pub fn new(
        sink: impl AsyncWrite + Send + Unpin + 'static,
        options: Options,
    ) -> Runtime {
        Runtime {
            inner: Arc::new(Inner {
                writer: Writer::new(sink),
                registry: Registry::new(),
                options,
                blob_gate: Mutex::new(BlobGate {
                    counter: 0,
                    pending: None,
                }),
                reply_slot: Mutex::new(None),
            }),
        }
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Defines a number property: announces it to the peer and
    /// records it in the registry so inbound writes can be vetted.
    pub async fn def_number(
        &self,
        vp: &Arc<Mutex<NumberVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let (xml, device, name, perm) = {
            let v = vp.lock().await;

            (def_number_xml(&v, msg), v.device.clone(), v.name.clone(), v.perm)
        };

        self.inner
            .registry
            .register_once(&device, &name, perm, Property::Number(vp.clone()))
            .await;
        self.inner.writer.emit(&xml).await
    }

    pub async fn def_switch(
        &self,
        vp: &Arc<Mutex<SwitchVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let (xml, device, name, perm) = {
            let v = vp.lock().await;

            (def_switch_xml(&v, msg), v.device.clone(), v.name.clone(), v.perm)
        };

        self.inner
            .registry
            .register_once(&device, &name, perm, Property::Switch(vp.clone()))
            .await;
        self.inner.writer.emit(&xml).await
    }

    pub async fn def_text(
        &self,
        vp: &Arc<Mutex<TextVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let (xml, device, name, perm) = {
            let v = vp.lock().await;

            (def_text_xml(&v, msg), v.device.clone(), v.name.clone(), v.perm)
        };

        self.inner
            .registry
            .register_once(&device, &name, perm, Property::Text(vp.clone()))
            .await;
        self.inner.writer.emit(&xml).await
    }

    pub async fn def_blob(
        &self,
        vp: &Arc<Mutex<BlobVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let (xml, device, name, perm) = {
            let v = vp.lock().await;

            (def_blob_xml(&v, msg), v.device.clone(), v.name.clone(), v.perm)
        };

        self.inner
            .registry
            .register_once(&device, &name, perm, Property::Blob(vp.clone()))
            .await;
        self.inner.writer.emit(&xml).await
    }

    /// Defines a light property. Lights are output-only and are
    /// deliberately *not* registered: a peer write to one falls out
    /// as a "not defined" rejection.
    pub async fn def_light(
        &self,
        vp: &Arc<Mutex<LightVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let xml = def_light_xml(&*vp.lock().await, msg);

        self.inner.writer.emit(&xml).await
    }

    /// Announces the current values of a number property.
    pub async fn set_number(
        &self,
        vp: &Arc<Mutex<NumberVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let xml = set_number_xml(&*vp.lock().await, msg, false);

        self.inner.writer.emit(&xml).await
    }

    /// Announces new member limits after the driver has adjusted
    /// `min`/`max`/`step` in place.
    pub async fn update_min_max(
        &self,
        vp: &Arc<Mutex<NumberVector>>,
    ) -> Result<()> {
        let xml = set_number_xml(&*vp.lock().await, None, true);

        self.inner.writer.emit(&xml).await
    }

    pub async fn set_switch(
        &self,
        vp: &Arc<Mutex<SwitchVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let xml = set_switch_xml(&*vp.lock().await, msg);

        self.inner.writer.emit(&xml).await
    }

    pub async fn set_text(
        &self,
        vp: &Arc<Mutex<TextVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let xml = set_text_xml(&*vp.lock().await, msg);

        self.inner.writer.emit(&xml).await
    }

    pub async fn set_light(
        &self,
        vp: &Arc<Mutex<LightVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let xml = set_light_xml(&*vp.lock().await, msg);

        self.inner.writer.emit(&xml).await
    }

    /// Announces the current payloads of a BLOB property.
    ///
    /// BLOBs can be large enough to outrun the peer, so emission is
    /// paced: if a previous BLOB's ping is still unacknowledged this
    /// call suspends until the reply arrives, then emits the vector
    /// followed by a fresh `pingRequest`. There is no timeout; a dead
    /// peer parks the caller (and any later `set_blob`) forever.
    pub async fn set_blob(
        &self,
        vp: &Arc<Mutex<BlobVector>>,
        msg: Option<&str>,
    ) -> Result<()> {
        let mut gate = self.inner.blob_gate.lock().await;

        if let Some(pending) = gate.pending.take() {
            let _ = pending.await;
        }

        gate.counter += 1;

        let uid = format!("SetBLOB/{}", gate.counter);
        let xml = set_blob_xml(&*vp.lock().await, msg);

        self.inner.writer.emit(&xml).await?;

        // Park the reply slot before the ping goes out so a fast peer
        // cannot answer a ping nobody is waiting on.

        let (tx, rx) = oneshot::channel();

        *self.inner.reply_slot.lock().await = Some((uid.clone(), tx));
        self.inner
            .writer
            .emit(&format!("<pingRequest uid=\"{}\"/>", uid))
            .await?;
        gate.pending = Some(rx);
        Ok(())
    }

    /// Sends a human-readable message, scoped to a device when one is
    /// given.
    pub async fn message(
        &self,
        device: Option<&str>,
        text: &str,
    ) -> Result<()> {
        let mut xml = String::from("<message");

        if let Some(dev) = device {
            let _ = write!(xml, " device=\"{}\"", escape(dev));
        }

        let _ = write!(
            xml,
            " timestamp=\"{}\" message=\"{}\"/>",
            timestamp(),
            escape(text)
        );
        self.inner.writer.emit(&xml).await
    }

    /// Tells the peer to forget a property, or a whole device when
    /// `name` is `None`. The registry keeps its entry either way.
    pub async fn delete_property(
        &self,
        device: &str,
        name: Option<&str>,
        msg: Option<&str>,
    ) -> Result<()> {
        let mut xml = format!("<delProperty device=\"{}\"", escape(device));

        if let Some(name) = name {
            let _ = write!(xml, " name=\"{}\"", escape(name));
        }

        let _ = write!(xml, " timestamp=\"{}\"", timestamp());
        xml.push_str(&message_attr(msg));
        xml.push_str("/>");
        self.inner.writer.emit(&xml).await
    }

    /// Asks the server to feed us another device's property traffic,
    /// narrowed to one property when `name` is given.
    pub async fn snoop_request(
        &self,
        device: &str,
        name: Option<&str>,
    ) -> Result<()> {
        let mut xml = format!(
            "<getProperties version=\"{}\" device=\"{}\"",
            PROTOCOL_VERSION,
            escape(device)
        );

        if let Some(name) = name {
            let _ = write!(xml, " name=\"{}\"", escape(name));
        }

        xml.push_str("/>");
        self.inner.writer.emit(&xml).await
    }

    /// Sets how the server routes a snooped device's BLOBs to us.
    pub async fn snoop_blob_policy(
        &self,
        device: &str,
        name: Option<&str>,
        policy: BlobPolicy,
    ) -> Result<()> {
        let mut xml = format!("<enableBLOB device=\"{}\"", escape(device));

        if let Some(name) = name {
            let _ = write!(xml, " name=\"{}\"", escape(name));
        }

        let _ = write!(xml, ">{}</enableBLOB>", policy);
        self.inner.writer.emit(&xml).await
    }

    // Answers a peer's ping immediately. Used by the dispatcher.

    pub(crate) async fn ping_reply(&self, uid: &str) -> Result<()> {
        self.inner
            .writer
            .emit(&format!("<pingReply uid=\"{}\"/>", escape(uid)))
            .await
    }

    // Wakes the `set_blob` caller waiting on this uid, if any.

    pub(crate) async fn resolve_ping(&self, uid: &str) {
        let mut slot = self.inner.reply_slot.lock().await;
        let matches = slot.as_ref().map(|(u, _)| u == uid).unwrap_or(false);

        if matches {
            if let Some((_, tx)) = slot.take() {
                let _ = tx.send(());
            }
        }
    }
}

fn message_attr(msg: Option<&str>) -> String {
    match msg {
        Some(m) => format!(" message=\"{}\"", escape(m)),
        None => String::new(),
    }
}

fn def_number_xml(v: &NumberVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<defNumberVector device=\"{}\" name=\"{}\" label=\"{}\" \
         group=\"{}\" state=\"{}\" perm=\"{}\" timeout=\"{}\" \
         timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        escape(&v.label),
        escape(&v.group),
        v.state,
        v.perm,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for n in &v.numbers {
        let _ = write!(
            out,
            "  <defNumber name=\"{}\" label=\"{}\" format=\"{}\" \
             min=\"{}\" max=\"{}\" step=\"{}\">{}</defNumber>\n",
            escape(&n.name),
            escape(&n.label),
            escape(&n.format),
            n.min,
            n.max,
            n.step,
            escape(sexa::number_format(&n.format, n.value).trim())
        );
    }

    out.push_str("</defNumberVector>");
    out
}

fn set_number_xml(v: &NumberVector, msg: Option<&str>, limits: bool) -> String {
    let mut out = format!(
        "<setNumberVector device=\"{}\" name=\"{}\" state=\"{}\" \
         timeout=\"{}\" timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        v.state,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for n in &v.numbers {
        let _ = write!(out, "  <oneNumber name=\"{}\"", escape(&n.name));

        // A limits update echoes the new min/max/step alongside the
        // value so clients can re-range their widgets.

        if limits {
            let _ = write!(
                out,
                " min=\"{}\" max=\"{}\" step=\"{}\"",
                n.min, n.max, n.step
            );
        }

        let _ = write!(
            out,
            ">{}</oneNumber>\n",
            escape(sexa::number_format(&n.format, n.value).trim())
        );
    }

    out.push_str("</setNumberVector>");
    out
}

fn def_switch_xml(v: &SwitchVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<defSwitchVector device=\"{}\" name=\"{}\" label=\"{}\" \
         group=\"{}\" state=\"{}\" perm=\"{}\" rule=\"{}\" timeout=\"{}\" \
         timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        escape(&v.label),
        escape(&v.group),
        v.state,
        v.perm,
        v.rule,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for s in &v.switches {
        let _ = write!(
            out,
            "  <defSwitch name=\"{}\" label=\"{}\">{}</defSwitch>\n",
            escape(&s.name),
            escape(&s.label),
            s.state
        );
    }

    out.push_str("</defSwitchVector>");
    out
}

fn set_switch_xml(v: &SwitchVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<setSwitchVector device=\"{}\" name=\"{}\" state=\"{}\" \
         timeout=\"{}\" timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        v.state,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for s in &v.switches {
        let _ = write!(
            out,
            "  <oneSwitch name=\"{}\">{}</oneSwitch>\n",
            escape(&s.name),
            s.state
        );
    }

    out.push_str("</setSwitchVector>");
    out
}

fn def_text_xml(v: &TextVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<defTextVector device=\"{}\" name=\"{}\" label=\"{}\" \
         group=\"{}\" state=\"{}\" perm=\"{}\" timeout=\"{}\" \
         timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        escape(&v.label),
        escape(&v.group),
        v.state,
        v.perm,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for t in &v.texts {
        let _ = write!(
            out,
            "  <defText name=\"{}\" label=\"{}\">{}</defText>\n",
            escape(&t.name),
            escape(&t.label),
            escape(&t.value)
        );
    }

    out.push_str("</defTextVector>");
    out
}

fn set_text_xml(v: &TextVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<setTextVector device=\"{}\" name=\"{}\" state=\"{}\" \
         timeout=\"{}\" timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        v.state,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for t in &v.texts {
        let _ = write!(
            out,
            "  <oneText name=\"{}\">{}</oneText>\n",
            escape(&t.name),
            escape(&t.value)
        );
    }

    out.push_str("</setTextVector>");
    out
}

fn def_light_xml(v: &LightVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<defLightVector device=\"{}\" name=\"{}\" label=\"{}\" \
         group=\"{}\" state=\"{}\" timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        escape(&v.label),
        escape(&v.group),
        v.state,
        timestamp(),
        message_attr(msg)
    );

    for l in &v.lights {
        let _ = write!(
            out,
            "  <defLight name=\"{}\" label=\"{}\">{}</defLight>\n",
            escape(&l.name),
            escape(&l.label),
            l.state
        );
    }

    out.push_str("</defLightVector>");
    out
}

fn set_light_xml(v: &LightVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<setLightVector device=\"{}\" name=\"{}\" state=\"{}\" \
         timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        v.state,
        timestamp(),
        message_attr(msg)
    );

    for l in &v.lights {
        let _ = write!(
            out,
            "  <oneLight name=\"{}\">{}</oneLight>\n",
            escape(&l.name),
            l.state
        );
    }

    out.push_str("</setLightVector>");
    out
}

fn def_blob_xml(v: &BlobVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<defBLOBVector device=\"{}\" name=\"{}\" label=\"{}\" \
         group=\"{}\" state=\"{}\" perm=\"{}\" timeout=\"{}\" \
         timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        escape(&v.label),
        escape(&v.group),
        v.state,
        v.perm,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for b in &v.blobs {
        let _ = write!(
            out,
            "  <defBLOB name=\"{}\" label=\"{}\"/>\n",
            escape(&b.name),
            escape(&b.label)
        );
    }

    out.push_str("</defBLOBVector>");
    out
}

fn set_blob_xml(v: &BlobVector, msg: Option<&str>) -> String {
    let mut out = format!(
        "<setBLOBVector device=\"{}\" name=\"{}\" state=\"{}\" \
         timeout=\"{}\" timestamp=\"{}\"{}>\n",
        escape(&v.device),
        escape(&v.name),
        v.state,
        v.timeout,
        timestamp(),
        message_attr(msg)
    );

    for b in &v.blobs {
        let encoded = STANDARD.encode(&b.data);
        let _ = write!(
            out,
            "  <oneBLOB name=\"{}\" size=\"{}\" enclen=\"{}\" \
             format=\"{}\">\n{}\n  </oneBLOB>\n",
            escape(&b.name),
            b.size,
            encoded.len(),
            escape(&b.format),
            encoded
        );
    }

    out.push_str("</setBLOBVector>");
    out
}
