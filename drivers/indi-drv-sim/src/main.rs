#![deny(unsafe_code)]

//! A simulated camera driver.
//!
//! Owns one device with a connection switch, an exposure control, a
//! read-only info property and an image BLOB. An "exposure" sleeps
//! for the requested duration and then emits a synthetic frame, which
//! is enough to exercise every part of the runtime from a real INDI
//! server or from `indiserver`-less piping on the command line.

use async_trait::async_trait;
use clap::{Arg, ArgAction, Command};
use indi_driver::types::property::{
    Blob, BlobVector, Number, NumberVector, Permission, PropertyState,
    Switch, SwitchRule, SwitchState, SwitchVector, Text, TextVector,
};
use indi_driver::{config, Driver, Options, Result, Runtime};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

struct Simulator {
    device: String,
    connection: Arc<Mutex<SwitchVector>>,
    exposure: Arc<Mutex<NumberVector>>,
    info: Arc<Mutex<TextVector>>,
    image: Arc<Mutex<BlobVector>>,
}

impl Simulator {
    const WIDTH: usize = 64;
    const HEIGHT: usize = 64;

    fn new(device: &str) -> Simulator {
        let device = String::from(device);

        Simulator {
            connection: Arc::new(Mutex::new(SwitchVector {
                device: device.clone(),
                name: String::from("CONNECTION"),
                label: String::from("Connection"),
                group: String::from("Main Control"),
                perm: Permission::ReadWrite,
                rule: SwitchRule::OneOfMany,
                timeout: 60.0,
                state: PropertyState::Idle,
                switches: vec![
                    Switch::new("CONNECT", "Connect", SwitchState::Off),
                    Switch::new("DISCONNECT", "Disconnect", SwitchState::On),
                ],
            })),
            exposure: Arc::new(Mutex::new(NumberVector {
                device: device.clone(),
                name: String::from("CCD_EXPOSURE"),
                label: String::from("Expose"),
                group: String::from("Main Control"),
                perm: Permission::ReadWrite,
                timeout: 60.0,
                state: PropertyState::Idle,
                numbers: vec![Number::new(
                    "CCD_EXPOSURE_VALUE",
                    "Duration (s)",
                    "%5.2f",
                    0.0,
                    10.0,
                    0.1,
                    1.0,
                )],
            })),
            info: Arc::new(Mutex::new(TextVector {
                device: device.clone(),
                name: String::from("DRIVER_INFO"),
                label: String::from("Driver info"),
                group: String::from("General Info"),
                perm: Permission::ReadOnly,
                timeout: 0.0,
                state: PropertyState::Idle,
                texts: vec![
                    Text::new("DRIVER_NAME", "Name", "Simulated Camera"),
                    Text::new(
                        "DRIVER_VERSION",
                        "Version",
                        env!("CARGO_PKG_VERSION"),
                    ),
                ],
            })),
            image: Arc::new(Mutex::new(BlobVector {
                device: device.clone(),
                name: String::from("CCD1"),
                label: String::from("Image data"),
                group: String::from("Image Info"),
                perm: Permission::ReadOnly,
                timeout: 60.0,
                state: PropertyState::Idle,
                blobs: vec![Blob::new("CCD1", "Image")],
            })),
            device,
        }
    }

    async fn connected(&self) -> bool {
        self.connection
            .lock()
            .await
            .find("CONNECT")
            .map(|s| s.state == SwitchState::On)
            .unwrap_or(false)
    }

    // Restores whatever the user saved last time. Values arrive
    // through the same validation as a live client's would.

    async fn restore_settings(&self, rt: &Runtime) -> Result<()> {
        if let Some(v) = config::get_config_number(
            None,
            &self.device,
            "CCD_EXPOSURE",
            "CCD_EXPOSURE_VALUE",
        ) {
            rt.apply_numbers(
                &self.exposure,
                &[(String::from("CCD_EXPOSURE_VALUE"), v)],
            )
            .await?;
            rt.set_number(&self.exposure, None).await?;
        }
        Ok(())
    }

    async fn save_settings(&self, rt: &Runtime) -> Result<()> {
        let exposure = self.exposure.lock().await;

        rt.save_config(None, &self.device, false, |w| {
            w.save_numbers(&exposure)
        })
        .await
    }

    // A fake frame: a diagonal gradient.

    fn synthesize_frame() -> Vec<u8> {
        let mut frame = Vec::with_capacity(Self::WIDTH * Self::HEIGHT);

        for y in 0..Self::HEIGHT {
            for x in 0..Self::WIDTH {
                frame.push(((x + y) % 256) as u8)
            }
        }
        frame
    }

    async fn expose(&self, rt: &Runtime, seconds: f64) -> Result<()> {
        {
            let mut v = self.exposure.lock().await;

            v.state = PropertyState::Busy;
        }
        rt.set_number(&self.exposure, None).await?;

        tokio::time::sleep(tokio::time::Duration::from_secs_f64(seconds))
            .await;

        {
            let mut v = self.image.lock().await;
            let frame = Self::synthesize_frame();

            if let Some(b) = v.find_mut("CCD1") {
                b.size = frame.len() as i64;
                b.bloblen = frame.len() as i64;
                b.format = String::from(".bin");
                b.data = frame;
            }
            v.state = PropertyState::Ok;
        }

        {
            let mut v = self.exposure.lock().await;

            v.state = PropertyState::Ok;
        }
        rt.set_number(&self.exposure, Some("Exposure complete")).await?;
        rt.set_blob(&self.image, None).await
    }
}

#[async_trait]
impl Driver for Simulator {
    async fn get_properties(
        &self,
        rt: &Runtime,
        device: Option<&str>,
    ) -> Result<()> {
        if let Some(device) = device {
            if device != self.device {
                return Ok(());
            }
        }

        rt.def_switch(&self.connection, None).await?;
        rt.def_text(&self.info, None).await?;
        rt.def_number(&self.exposure, None).await?;
        rt.def_blob(&self.image, None).await
    }

    async fn new_switch(
        &self,
        rt: &Runtime,
        device: &str,
        name: &str,
        states: Vec<(String, SwitchState)>,
    ) -> Result<()> {
        if device != self.device || name != "CONNECTION" {
            return Ok(());
        }

        rt.apply_switches(&self.connection, &states).await?;

        let connecting = self.connected().await;

        {
            let mut v = self.connection.lock().await;

            v.state = PropertyState::Ok;
        }

        if connecting {
            info!("client connected");
            rt.set_switch(&self.connection, Some("Simulator connected"))
                .await?;
            self.restore_settings(rt).await
        } else {
            info!("client disconnected");

            if let Err(e) = self.save_settings(rt).await {
                warn!("couldn't save settings -- {}", e)
            }
            rt.set_switch(&self.connection, Some("Simulator disconnected"))
                .await
        }
    }

    async fn new_number(
        &self,
        rt: &Runtime,
        device: &str,
        name: &str,
        values: Vec<(String, f64)>,
    ) -> Result<()> {
        if device != self.device || name != "CCD_EXPOSURE" {
            return Ok(());
        }

        if !self.connected().await {
            return rt
                .message(Some(device), "Connect before exposing")
                .await;
        }

        rt.apply_numbers(&self.exposure, &values).await?;

        let seconds = self
            .exposure
            .lock()
            .await
            .find("CCD_EXPOSURE_VALUE")
            .map(|n| n.value)
            .unwrap_or(0.0);

        self.expose(rt, seconds).await
    }
}

#[tokio::main]
async fn main() {
    let matches = Command::new("indi-drv-sim")
        .version(clap::crate_version!())
        .about("Simulated-camera INDI driver")
        .arg(
            Arg::new("device")
                .long("device")
                .value_name("NAME")
                .default_value("CCD Simulator")
                .help("Device name to expose"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Echo every inbound element to the log"),
        )
        .get_matches();

    // Logs must go to stderr; stdout belongs to the protocol.

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Unable to set global default subscriber");

    let device = matches
        .get_one::<String>("device")
        .cloned()
        .unwrap_or_else(|| String::from("CCD Simulator"));
    let options = Options {
        name: String::from("indi-drv-sim"),
        verbose: matches.get_flag("verbose"),
    };

    let driver = Arc::new(Simulator::new(&device));

    info!("starting driver for {}", &device);

    if let Err(e) = indi_driver::run(driver, options).await {
        eprintln!("ERROR: {e:?}")
    }
}
