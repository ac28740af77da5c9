//! Classifies inbound elements and routes them to the driver.

use crate::driver::{BlobPayload, Driver};
use crate::registry::Property;
use crate::types::property::{Permission, SwitchState};
use crate::types::Error;
use crate::xml::{Element, Framer};
use crate::{sexa, Result, Runtime, PROTOCOL_VERSION};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

// Tags carrying another driver's traffic. These are forwarded to the
// driver's snoop callback unexamined.

const SNOOP_TAGS: &[&str] = &[
    "setNumberVector",
    "setTextVector",
    "setLightVector",
    "setSwitchVector",
    "setBLOBVector",
    "defNumberVector",
    "defTextVector",
    "defLightVector",
    "defSwitchVector",
    "defBLOBVector",
    "message",
    "delProperty",
];

/// The inbound half of the runtime: reads elements off the transport
/// and invokes driver callbacks.
pub struct Dispatcher {
    rt: Runtime,
    driver: Arc<dyn Driver>,
}

// A client announcing a newer protocol than ours is unworkable; the
// driver cannot know what it is missing.

fn version_compatible(client: f64) -> bool {
    client <= PROTOCOL_VERSION
}

impl Dispatcher {
    pub fn new(rt: Runtime, driver: Arc<dyn Driver>) -> Dispatcher {
        Dispatcher { rt, driver }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.rt
    }

    /// Reads the transport until EOF, dispatching each complete
    /// element. Rejected commands are logged and the loop continues;
    /// only transport failures end it.
    pub async fn run<R>(&self, mut rd: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut framer = Framer::new();
        let mut chunk = vec![0u8; 8192];

        loop {
            let n = rd.read(&mut chunk).await?;

            if n == 0 {
                return Ok(());
            }

            framer.feed(&chunk[..n]);

            while let Some(text) = framer.next_element()? {
                if self.rt.options().verbose {
                    debug!("received: {}", text.trim());
                }

                let element = match Element::parse(&text) {
                    Ok(e) => e,
                    Err(e) => {
                        warn!("dropping malformed element -- {}", e);
                        continue;
                    }
                };

                if let Err(e) = self.dispatch(&element).await {
                    match e {
                        // The outbound sink is gone; nothing more we
                        // can tell the peer.
                        Error::OperationError(_) => return Err(e),
                        _ => warn!("{}", e),
                    }
                }
            }
        }
    }

    /// Classifies and handles one inbound element.
    pub async fn dispatch(&self, root: &Element) -> Result<()> {
        match root.name() {
            "getProperties" => self.get_properties(root).await,

            tag if SNOOP_TAGS.contains(&tag) => {
                self.driver.snoop(&self.rt, root).await
            }

            "newNumberVector" => self.new_number(root).await,
            "newSwitchVector" => self.new_switch(root).await,
            "newTextVector" => self.new_text(root).await,
            "newBLOBVector" => self.new_blob(root).await,

            "pingRequest" => match root.attr("uid") {
                Some(uid) => self.rt.ping_reply(uid).await,
                None => Ok(()),
            },

            "pingReply" => {
                if let Some(uid) = root.attr("uid") {
                    self.rt.resolve_ping(uid).await;
                }
                Ok(())
            }

            tag => Err(Error::UnknownCommand(String::from(tag))),
        }
    }

    async fn get_properties(&self, root: &Element) -> Result<()> {
        let Some(version) = root.attr("version") else {
            return Err(Error::ProtocolError(String::from(
                "getProperties requires a 'version' attribute",
            )));
        };

        let client: f64 = version.trim().parse().map_err(|_| {
            Error::ParseError(format!("bad protocol version '{}'", version))
        })?;

        if !version_compatible(client) {
            eprintln!(
                "{}: client version {} > {}",
                self.rt.options().name,
                client,
                PROTOCOL_VERSION
            );
            std::process::exit(1);
        }

        let device = root.attr("device");

        // A request scoped to a single registered property is
        // answered directly with its definition, so a late-joining
        // client can learn it without a round of driver code.

        if let (Some(dev), Some(name)) = (device, root.attr("name")) {
            if let Some(entry) = self.rt.registry().lookup(dev, name).await {
                return match &entry.property {
                    Property::Number(vp) => self.rt.def_number(vp, None).await,
                    Property::Switch(vp) => self.rt.def_switch(vp, None).await,
                    Property::Text(vp) => self.rt.def_text(vp, None).await,
                    Property::Blob(vp) => self.rt.def_blob(vp, None).await,
                };
            }
        }

        self.driver.get_properties(&self.rt, device).await
    }

    // Verifies an authoritative write is aimed at something this
    // driver defined and is allowed to touch.

    async fn check_writable(&self, device: &str, name: &str) -> Result<()> {
        let entry = self
            .rt
            .registry()
            .lookup(device, name)
            .await
            .ok_or_else(|| {
                Error::ProtocolError(format!(
                    "Property {} is not defined in {}.",
                    name, device
                ))
            })?;

        if entry.perm == Permission::ReadOnly {
            return Err(Error::ProtocolError(format!(
                "Cannot set read-only property {}",
                name
            )));
        }
        Ok(())
    }

    async fn new_number(&self, root: &Element) -> Result<()> {
        let (device, name) = device_and_name(root)?;

        self.check_writable(device, name).await?;

        let mut values = Vec::new();

        for child in children_of(root, "oneNumber") {
            let Some(member) = child.attr("name") else {
                self.member_error(device, name, "a member has no name").await?;
                continue;
            };

            match sexa::scan_sexa(child.text()) {
                Ok(v) => values.push((String::from(member), v)),
                Err(_) => {
                    self.member_error(
                        device,
                        name,
                        &format!(
                            "member {} has a bad value '{}'",
                            member,
                            child.text().trim()
                        ),
                    )
                    .await?
                }
            }
        }

        if values.is_empty() {
            return self.empty_batch(device, name).await;
        }

        self.driver.new_number(&self.rt, device, name, values).await
    }

    async fn new_switch(&self, root: &Element) -> Result<()> {
        let (device, name) = device_and_name(root)?;

        self.check_writable(device, name).await?;

        let mut states = Vec::new();

        for child in children_of(root, "oneSwitch") {
            let Some(member) = child.attr("name") else {
                self.member_error(device, name, "a member has no name").await?;
                continue;
            };

            // Historical tolerance: anything starting with "On" is
            // on, but only exactly "Off" is off.

            let body = child.text().trim();

            if body.starts_with("On") {
                states.push((String::from(member), SwitchState::On))
            } else if body == "Off" {
                states.push((String::from(member), SwitchState::Off))
            } else {
                self.member_error(
                    device,
                    name,
                    &format!("member {} has a bad state '{}'", member, body),
                )
                .await?
            }
        }

        if states.is_empty() {
            return self.empty_batch(device, name).await;
        }

        self.driver.new_switch(&self.rt, device, name, states).await
    }

    async fn new_text(&self, root: &Element) -> Result<()> {
        let (device, name) = device_and_name(root)?;

        self.check_writable(device, name).await?;

        let mut texts = Vec::new();

        for child in children_of(root, "oneText") {
            let Some(member) = child.attr("name") else {
                self.member_error(device, name, "a member has no name").await?;
                continue;
            };

            texts.push((String::from(member), String::from(child.text())))
        }

        if texts.is_empty() {
            return self.empty_batch(device, name).await;
        }

        self.driver.new_text(&self.rt, device, name, texts).await
    }

    async fn new_blob(&self, root: &Element) -> Result<()> {
        let (device, name) = device_and_name(root)?;

        self.check_writable(device, name).await?;

        let mut blobs = Vec::new();

        for child in children_of(root, "oneBLOB") {
            let (Some(member), Some(format), Some(size)) = (
                child.attr("name"),
                child.attr("format"),
                child.attr("size"),
            ) else {
                self.member_error(
                    device,
                    name,
                    "a BLOB member is missing its name, format or size",
                )
                .await?;
                continue;
            };

            let Ok(size) = size.trim().parse::<i64>() else {
                self.member_error(
                    device,
                    name,
                    &format!("member {} has a bad size", member),
                )
                .await?;
                continue;
            };

            let body = child.text().as_bytes();

            // An explicit enclen bounds the encoded payload;
            // otherwise the whole body is it.

            let encoded = match child.attr("enclen") {
                None => body,
                Some(enclen) => match enclen.trim().parse::<usize>() {
                    Ok(n) if n <= body.len() => &body[..n],
                    _ => {
                        self.member_error(
                            device,
                            name,
                            &format!("member {} has a bad enclen", member),
                        )
                        .await?;
                        continue;
                    }
                },
            };

            let encoded: Vec<u8> = encoded
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();

            match STANDARD.decode(&encoded) {
                Ok(data) => blobs.push(BlobPayload {
                    name: String::from(member),
                    format: String::from(format),
                    size,
                    bloblen: data.len() as i64,
                    data,
                }),
                Err(_) => {
                    self.member_error(
                        device,
                        name,
                        &format!("member {} has a bad payload", member),
                    )
                    .await?
                }
            }
        }

        if blobs.is_empty() {
            return self.empty_batch(device, name).await;
        }

        self.driver.new_blob(&self.rt, device, name, blobs).await
    }

    // A bad member doesn't abort its batch; the peer just gets told.

    async fn member_error(
        &self,
        device: &str,
        name: &str,
        detail: &str,
    ) -> Result<()> {
        self.rt
            .message(Some(device), &format!("{}: {}", name, detail))
            .await
    }

    async fn empty_batch(&self, device: &str, name: &str) -> Result<()> {
        self.rt
            .message(
                Some(device),
                &format!("{}: update contained no valid members", name),
            )
            .await
    }
}

fn device_and_name(root: &Element) -> Result<(&str, &str)> {
    let device = root.attr("device").ok_or_else(|| {
        Error::ProtocolError(format!(
            "{} requires a 'device' attribute",
            root.name()
        ))
    })?;
    let name = root.attr("name").ok_or_else(|| {
        Error::ProtocolError(format!(
            "{} requires a 'name' attribute",
            root.name()
        ))
    })?;

    Ok((device, name))
}

fn children_of<'a>(
    root: &'a Element,
    tag: &'a str,
) -> impl Iterator<Item = &'a Element> {
    root.children().iter().filter(move |c| c.name() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::property::{
        Permission, PropertyState, Switch, SwitchRule, SwitchVector, Text,
        TextVector,
    };
    use crate::Options;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use tokio::io::{AsyncReadExt, DuplexStream};
    use tokio::sync::Mutex;

    // Records every callback so tests can assert exactly what the
    // dispatcher let through.

    #[derive(Default)]
    struct Recorder {
        calls: StdMutex<Vec<String>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Driver for Recorder {
        async fn get_properties(
            &self,
            _rt: &Runtime,
            device: Option<&str>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("get:{}", device.unwrap_or("*")));
            Ok(())
        }

        async fn new_number(
            &self,
            _rt: &Runtime,
            device: &str,
            name: &str,
            values: Vec<(String, f64)>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("number:{}:{}:{:?}", device, name, values));
            Ok(())
        }

        async fn new_switch(
            &self,
            _rt: &Runtime,
            device: &str,
            name: &str,
            states: Vec<(String, SwitchState)>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("switch:{}:{}:{:?}", device, name, states));
            Ok(())
        }

        async fn new_text(
            &self,
            _rt: &Runtime,
            device: &str,
            name: &str,
            texts: Vec<(String, String)>,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("text:{}:{}:{:?}", device, name, texts));
            Ok(())
        }

        async fn new_blob(
            &self,
            _rt: &Runtime,
            device: &str,
            name: &str,
            blobs: Vec<BlobPayload>,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(format!(
                "blob:{}:{}:{:?}",
                device,
                name,
                blobs
                    .iter()
                    .map(|b| (b.name.clone(), b.size, b.bloblen, b.data.clone()))
                    .collect::<Vec<_>>()
            ));
            Ok(())
        }

        async fn snoop(
            &self,
            _rt: &Runtime,
            element: &Element,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("snoop:{}", element.name()));
            Ok(())
        }
    }

    fn fixture() -> (Dispatcher, Arc<Recorder>, DuplexStream) {
        let (wr, rd) = tokio::io::duplex(1 << 20);
        let rt = Runtime::new(wr, Options::default());
        let driver = Arc::new(Recorder::default());

        (Dispatcher::new(rt, driver.clone()), driver, rd)
    }

    async fn collect(d: Dispatcher, mut rd: DuplexStream) -> String {
        drop(d);

        let mut out = String::new();

        rd.read_to_string(&mut out).await.unwrap();
        out
    }

    fn parse(text: &str) -> Element {
        Element::parse(text).unwrap()
    }

    async fn define_connection(d: &Dispatcher) {
        let vp = Arc::new(Mutex::new(SwitchVector {
            device: String::from("Mount"),
            name: String::from("CONNECTION"),
            label: String::from("Connection"),
            group: String::from(""),
            perm: Permission::ReadWrite,
            rule: SwitchRule::OneOfMany,
            timeout: 60.0,
            state: PropertyState::Idle,
            switches: vec![
                Switch::new("CONNECT", "Connect", SwitchState::Off),
                Switch::new("DISCONNECT", "Disconnect", SwitchState::On),
            ],
        }));

        d.runtime().def_switch(&vp, None).await.unwrap();
    }

    async fn define_driver_info(d: &Dispatcher) {
        let vp = Arc::new(Mutex::new(TextVector {
            device: String::from("Cam"),
            name: String::from("DRIVER_INFO"),
            label: String::from("Driver info"),
            group: String::from(""),
            perm: Permission::ReadOnly,
            timeout: 0.0,
            state: PropertyState::Idle,
            texts: vec![Text::new("VERSION", "Version", "1.0")],
        }));

        d.runtime().def_text(&vp, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_properties_reaches_driver() {
        let (d, driver, _rd) = fixture();

        d.dispatch(&parse("<getProperties version=\"1.7\"/>"))
            .await
            .unwrap();
        d.dispatch(&parse(
            "<getProperties version=\"1.7\" device=\"Cam\"/>",
        ))
        .await
        .unwrap();

        assert_eq!(driver.calls(), ["get:*", "get:Cam"]);
    }

    #[tokio::test]
    async fn test_get_properties_requires_version() {
        let (d, driver, _rd) = fixture();

        assert!(d.dispatch(&parse("<getProperties/>")).await.is_err());
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_late_joiner_gets_definition_echo() {
        let (d, driver, rd) = fixture();

        define_connection(&d).await;
        d.dispatch(&parse(
            "<getProperties version=\"1.7\" device=\"Mount\" \
             name=\"CONNECTION\"/>",
        ))
        .await
        .unwrap();

        // The registry answered; the driver was not consulted.

        assert!(driver.calls().is_empty());

        let out = collect(d, rd).await;

        assert_eq!(out.matches("<defSwitchVector").count(), 2);
        assert_eq!(
            out.matches("<defSwitch name=\"CONNECT\" label=\"Connect\">Off</defSwitch>")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_unscoped_get_properties_falls_through_to_driver() {
        let (d, driver, _rd) = fixture();

        define_connection(&d).await;
        d.dispatch(&parse(
            "<getProperties version=\"1.7\" device=\"Mount\" \
             name=\"UNDEFINED\"/>",
        ))
        .await
        .unwrap();

        assert_eq!(driver.calls(), ["get:Mount"]);
    }

    #[tokio::test]
    async fn test_snoop_traffic_is_forwarded_whole() {
        let (d, driver, _rd) = fixture();

        d.dispatch(&parse(
            "<setNumberVector device=\"Other\" name=\"X\">\
             <oneNumber name=\"A\">1</oneNumber></setNumberVector>",
        ))
        .await
        .unwrap();
        d.dispatch(&parse("<message device=\"Other\" message=\"hi\"/>"))
            .await
            .unwrap();
        d.dispatch(&parse("<delProperty device=\"Other\"/>"))
            .await
            .unwrap();

        assert_eq!(
            driver.calls(),
            ["snoop:setNumberVector", "snoop:message", "snoop:delProperty"]
        );
    }

    #[tokio::test]
    async fn test_undefined_property_is_rejected() {
        let (d, driver, _rd) = fixture();

        let err = d
            .dispatch(&parse(
                "<newSwitchVector device=\"Mount\" name=\"CONNECTION\">\
                 <oneSwitch name=\"CONNECT\">On</oneSwitch>\
                 </newSwitchVector>",
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::ProtocolError(String::from(
                "Property CONNECTION is not defined in Mount."
            ))
        );
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_property_is_rejected() {
        let (d, driver, _rd) = fixture();

        define_driver_info(&d).await;

        let err = d
            .dispatch(&parse(
                "<newTextVector device=\"Cam\" name=\"DRIVER_INFO\">\
                 <oneText name=\"VERSION\">evil</oneText></newTextVector>",
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::ProtocolError(String::from(
                "Cannot set read-only property DRIVER_INFO"
            ))
        );
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_new_switch_decodes_and_skips_bad_states() {
        let (d, driver, rd) = fixture();

        define_connection(&d).await;
        d.dispatch(&parse(
            "<newSwitchVector device=\"Mount\" name=\"CONNECTION\">\
             <oneSwitch name=\"CONNECT\">On</oneSwitch>\
             <oneSwitch name=\"DISCONNECT\">sideways</oneSwitch>\
             </newSwitchVector>",
        ))
        .await
        .unwrap();

        assert_eq!(
            driver.calls(),
            ["switch:Mount:CONNECTION:[(\"CONNECT\", On)]"]
        );

        let out = collect(d, rd).await;

        assert!(out.contains("bad state &apos;sideways&apos;"));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_driver() {
        let (d, driver, rd) = fixture();

        define_connection(&d).await;
        d.dispatch(&parse(
            "<newSwitchVector device=\"Mount\" name=\"CONNECTION\">\
             <oneSwitch name=\"CONNECT\">sideways</oneSwitch>\
             </newSwitchVector>",
        ))
        .await
        .unwrap();

        assert!(driver.calls().is_empty());

        let out = collect(d, rd).await;

        assert!(out.contains("update contained no valid members"));
    }

    #[tokio::test]
    async fn test_new_number_parses_sexagesimal() {
        let (d, driver, _rd) = fixture();
        let vp = Arc::new(Mutex::new(crate::types::property::NumberVector {
            device: String::from("Mount"),
            name: String::from("EQUATORIAL_EOD_COORD"),
            label: String::from("Coords"),
            group: String::from(""),
            perm: Permission::ReadWrite,
            timeout: 60.0,
            state: PropertyState::Idle,
            numbers: vec![crate::types::property::Number::new(
                "RA", "RA", "%9.6m", 0.0, 24.0, 0.0, 0.0,
            )],
        }));

        d.runtime().def_number(&vp, None).await.unwrap();
        d.dispatch(&parse(
            "<newNumberVector device=\"Mount\" name=\"EQUATORIAL_EOD_COORD\">\
             <oneNumber name=\"RA\">12:30:00</oneNumber></newNumberVector>",
        ))
        .await
        .unwrap();

        assert_eq!(
            driver.calls(),
            ["number:Mount:EQUATORIAL_EOD_COORD:[(\"RA\", 12.5)]"]
        );
    }

    #[tokio::test]
    async fn test_new_blob_decodes_base64() {
        let (d, driver, _rd) = fixture();
        let vp = Arc::new(Mutex::new(crate::types::property::BlobVector {
            device: String::from("Cam"),
            name: String::from("UPLOAD"),
            label: String::from("Upload"),
            group: String::from(""),
            perm: Permission::ReadWrite,
            timeout: 0.0,
            state: PropertyState::Idle,
            blobs: vec![crate::types::property::Blob::new("FILE", "File")],
        }));

        d.runtime().def_blob(&vp, None).await.unwrap();

        // "AQIDBA==" is [1, 2, 3, 4]; trailing junk is cut off by the
        // explicit enclen and embedded whitespace is tolerated.

        d.dispatch(&parse(
            "<newBLOBVector device=\"Cam\" name=\"UPLOAD\">\
             <oneBLOB name=\"FILE\" format=\".bin\" size=\"4\" \
             enclen=\"9\">AQID\nBA==junk</oneBLOB></newBLOBVector>",
        ))
        .await
        .unwrap();

        assert_eq!(
            driver.calls(),
            ["blob:Cam:UPLOAD:[(\"FILE\", 4, 4, [1, 2, 3, 4])]"]
        );
    }

    #[tokio::test]
    async fn test_missing_attributes_are_rejected() {
        let (d, _driver, _rd) = fixture();

        let err = d
            .dispatch(&parse("<newTextVector name=\"X\"/>"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::ProtocolError(String::from(
                "newTextVector requires a 'device' attribute"
            ))
        );
    }

    #[tokio::test]
    async fn test_unknown_command_is_soft() {
        let (d, _driver, _rd) = fixture();
        let err = d.dispatch(&parse("<fooBar/>")).await.unwrap_err();

        assert_eq!(err, Error::UnknownCommand(String::from("fooBar")));
        assert_eq!(err.to_string(), "Unknown command: fooBar");
    }

    #[tokio::test]
    async fn test_ping_request_is_answered() {
        let (d, _driver, rd) = fixture();

        d.dispatch(&parse("<pingRequest uid=\"abc/1\"/>")).await.unwrap();

        let out = collect(d, rd).await;

        assert_eq!(out, "<pingReply uid=\"abc/1\"/>\n");
    }

    #[tokio::test]
    async fn test_run_loop_dispatches_a_stream() {
        let (d, driver, _rd) = fixture();
        let (mut client, server) = tokio::io::duplex(4096);

        tokio::io::AsyncWriteExt::write_all(
            &mut client,
            b"<getProperties version=\"1.7\"/>\
              <getProperties version=\"1.7\" device=\"Cam\"/><bogus/>",
        )
        .await
        .unwrap();
        drop(client);

        d.run(server).await.unwrap();
        assert_eq!(driver.calls(), ["get:*", "get:Cam"]);
    }

    #[tokio::test]
    async fn test_ping_reply_unblocks_blob_sender() {
        let (d, _driver, _rd) = fixture();
        let vp = Arc::new(Mutex::new(crate::types::property::BlobVector {
            device: String::from("Cam"),
            name: String::from("CCD1"),
            label: String::from("Image"),
            group: String::from(""),
            perm: Permission::ReadOnly,
            timeout: 60.0,
            state: PropertyState::Ok,
            blobs: vec![crate::types::property::Blob::new("CCD1", "Image")],
        }));

        d.runtime().set_blob(&vp, None).await.unwrap();

        let rt = d.runtime().clone();
        let vp2 = vp.clone();
        let second = tokio::spawn(async move {
            rt.set_blob(&vp2, None).await.unwrap();
        });

        tokio::task::yield_now().await;
        assert!(!second.is_finished());

        d.dispatch(&parse("<pingReply uid=\"SetBLOB/1\"/>"))
            .await
            .unwrap();
        second.await.unwrap();
    }

    #[test]
    fn test_version_compatibility() {
        assert!(version_compatible(1.7));
        assert!(version_compatible(1.0));
        assert!(!version_compatible(9.9));
    }
}
