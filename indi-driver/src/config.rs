//! On-disk property snapshots.
//!
//! Saved configuration reuses the wire grammar: a `<INDIDriver>` root
//! whose children are `new*Vector` elements, so restoring state is
//! just replaying the file through the dispatcher and the ordinary
//! permission checks and applicators. Files live under `~/.indi/` by
//! default; `$INDICONFIG` overrides the location.

use crate::types::property::{
    BlobVector, NumberVector, SwitchState, SwitchVector, TextVector,
};
use crate::types::Error;
use crate::xml::{escape, Element};
use crate::{sexa, Dispatcher, Result, Runtime};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// The per-user configuration directory, `$HOME/.indi`.
pub fn config_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".indi"))
        .ok_or_else(|| Error::ConfigError(String::from("HOME is not set")))
}

/// The device's configuration file: `$INDICONFIG` when set, else
/// `~/.indi/<device>_config.xml`.
pub fn config_path(device: &str) -> Result<PathBuf> {
    match std::env::var_os("INDICONFIG") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(config_dir()?.join(format!("{}_config.xml", device))),
    }
}

/// The pristine-copy sibling of [`config_path`], with a `.default`
/// suffix.
pub fn default_config_path(device: &str) -> Result<PathBuf> {
    let mut path = config_path(device)?.into_os_string();

    path.push(".default");
    Ok(path.into())
}

fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir()?;

    if !dir.exists() {
        use std::os::unix::fs::DirBuilderExt;

        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(&dir)
            .map_err(|e| {
                Error::ConfigError(format!(
                    "can't create {}: {}",
                    dir.display(),
                    e
                ))
            })?;
    }

    check_ownership(&dir)?;
    Ok(dir)
}

// A root-owned config under a non-root driver is a classic sudo
// accident; refuse early with the fix spelled out rather than fail
// on every write.

fn check_ownership(path: &Path) -> Result<()> {
    use std::os::unix::fs::MetadataExt;

    let md = match std::fs::metadata(path) {
        Ok(md) => md,
        Err(_) => return Ok(()),
    };

    if md.uid() == 0 && !rustix::process::geteuid().is_root() {
        return Err(Error::ConfigError(format!(
            "{} is owned by root; run 'chown -R $USER ~/.indi' and \
             restart the driver",
            path.display()
        )));
    }
    Ok(())
}

fn resolve(file: Option<&Path>, device: &str) -> Result<PathBuf> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            if std::env::var_os("INDICONFIG").is_none() {
                ensure_config_dir()?;
            }
            config_path(device)
        }
    }
}

/// Writes one configuration snapshot. Created with the wrapper's
/// opening tag already written; each `save_*` appends one property;
/// `finish` writes the closing tag and flushes.
pub struct ConfigWriter {
    out: BufWriter<File>,
}

impl ConfigWriter {
    pub fn create(file: Option<&Path>, device: &str) -> Result<ConfigWriter> {
        let path = resolve(file, device)?;

        check_ownership(&path)?;

        let out = File::create(&path).map_err(|e| {
            Error::ConfigError(format!(
                "can't create {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut out = BufWriter::new(out);

        writeln!(out, "<INDIDriver>")?;
        Ok(ConfigWriter { out })
    }

    pub fn save_numbers(&mut self, v: &NumberVector) -> Result<()> {
        writeln!(
            self.out,
            "<newNumberVector device=\"{}\" name=\"{}\">",
            escape(&v.device),
            escape(&v.name)
        )?;

        for n in &v.numbers {
            writeln!(
                self.out,
                "  <oneNumber name=\"{}\">{}</oneNumber>",
                escape(&n.name),
                n.value
            )?;
        }

        writeln!(self.out, "</newNumberVector>")?;
        Ok(())
    }

    pub fn save_switches(&mut self, v: &SwitchVector) -> Result<()> {
        writeln!(
            self.out,
            "<newSwitchVector device=\"{}\" name=\"{}\">",
            escape(&v.device),
            escape(&v.name)
        )?;

        for s in &v.switches {
            writeln!(
                self.out,
                "  <oneSwitch name=\"{}\">{}</oneSwitch>",
                escape(&s.name),
                s.state
            )?;
        }

        writeln!(self.out, "</newSwitchVector>")?;
        Ok(())
    }

    pub fn save_texts(&mut self, v: &TextVector) -> Result<()> {
        writeln!(
            self.out,
            "<newTextVector device=\"{}\" name=\"{}\">",
            escape(&v.device),
            escape(&v.name)
        )?;

        for t in &v.texts {
            writeln!(
                self.out,
                "  <oneText name=\"{}\">{}</oneText>",
                escape(&t.name),
                escape(&t.value)
            )?;
        }

        writeln!(self.out, "</newTextVector>")?;
        Ok(())
    }

    pub fn save_blobs(&mut self, v: &BlobVector) -> Result<()> {
        writeln!(
            self.out,
            "<newBLOBVector device=\"{}\" name=\"{}\">",
            escape(&v.device),
            escape(&v.name)
        )?;

        for b in &v.blobs {
            let encoded = STANDARD.encode(&b.data);

            writeln!(
                self.out,
                "  <oneBLOB name=\"{}\" size=\"{}\" enclen=\"{}\" \
                 format=\"{}\">{}</oneBLOB>",
                escape(&b.name),
                b.size,
                encoded.len(),
                escape(&b.format),
                encoded
            )?;
        }

        writeln!(self.out, "</newBLOBVector>")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        writeln!(self.out, "</INDIDriver>")?;
        self.out.flush()?;
        Ok(())
    }
}

impl Runtime {
    /// Snapshot helper: opens the writer, lets `fill` append the
    /// properties worth keeping, closes the file and (unless
    /// `silent`) tells the peer.
    pub async fn save_config<F>(
        &self,
        file: Option<&Path>,
        device: &str,
        silent: bool,
        fill: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut ConfigWriter) -> Result<()>,
    {
        let mut writer = ConfigWriter::create(file, device)?;

        fill(&mut writer)?;
        writer.finish()?;

        if !silent {
            self.message(Some(device), "Configuration saved.").await?;
        }
        Ok(())
    }
}

impl Dispatcher {
    /// Restores saved state by replaying the file's elements through
    /// the ordinary dispatch path. Elements for other devices are
    /// skipped; when `property` is given, only that property is
    /// replayed and the scan stops there.
    ///
    /// I/O, parse and ownership failures come back in the `Result`
    /// only; nothing about them goes on the wire. The peer just gets
    /// the load confirmation, and only when `silent` is unset.
    pub async fn load_config(
        &self,
        file: Option<&Path>,
        device: &str,
        property: Option<&str>,
        silent: bool,
    ) -> Result<()> {
        let result = self.replay_config(file, device, property).await;

        if result.is_ok() && !silent {
            self.runtime()
                .message(Some(device), "Configuration loaded.")
                .await?;
        }
        result
    }

    async fn replay_config(
        &self,
        file: Option<&Path>,
        device: &str,
        property: Option<&str>,
    ) -> Result<()> {
        let path = resolve(file, device)?;

        check_ownership(&path)?;

        let text =
            tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::ConfigError(format!(
                    "can't open {}: {}",
                    path.display(),
                    e
                ))
            })?;
        let root = Element::parse(&text).map_err(|e| {
            Error::ConfigError(format!("{}: {}", path.display(), e))
        })?;

        for child in root.children() {
            if child.attr("device") != Some(device) {
                continue;
            }

            if let Some(wanted) = property {
                if child.attr("name") != Some(wanted) {
                    continue;
                }
            }

            // One bad entry shouldn't cost the rest of the file.

            if let Err(e) = self.dispatch(child).await {
                warn!("config replay: {}", e)
            }

            if property.is_some() {
                break;
            }
        }
        Ok(())
    }
}

/// Writes the pristine copy of a device's configuration, once.
/// Returns `true` when the copy happened and `false` when the
/// destination already existed.
pub fn save_default(
    src: Option<&Path>,
    dst: Option<&Path>,
    device: &str,
) -> Result<bool> {
    let src = match src {
        Some(path) => path.to_path_buf(),
        None => config_path(device)?,
    };
    let dst = match dst {
        Some(path) => path.to_path_buf(),
        None => default_config_path(device)?,
    };

    if dst.exists() {
        return Ok(false);
    }

    std::fs::copy(&src, &dst).map_err(|e| {
        Error::ConfigError(format!(
            "can't copy {} to {}: {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;
    Ok(true)
}

/// Removes a device's saved configuration.
pub fn purge_config(file: Option<&Path>, device: &str) -> Result<()> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => config_path(device)?,
    };

    std::fs::remove_file(&path).map_err(|e| {
        Error::ConfigError(format!("can't remove {}: {}", path.display(), e))
    })
}

// The probe helpers open, parse and walk the file for one value.
// Anything that goes wrong on the way is a plain "not there".

fn load_root(file: Option<&Path>, device: &str) -> Option<Element> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => config_path(device).ok()?,
    };
    let text = std::fs::read_to_string(path).ok()?;

    Element::parse(&text).ok()
}

fn find_vector<'a>(
    root: &'a Element,
    device: &str,
    property: &str,
) -> Option<&'a Element> {
    root.children().iter().find(|c| {
        c.attr("device") == Some(device) && c.attr("name") == Some(property)
    })
}

fn find_member<'a>(vector: &'a Element, member: &str) -> Option<&'a Element> {
    vector.children().iter().find(|c| c.attr("name") == Some(member))
}

/// Looks up one saved switch position.
pub fn get_config_switch(
    file: Option<&Path>,
    device: &str,
    property: &str,
    member: &str,
) -> Option<SwitchState> {
    let root = load_root(file, device)?;
    let member = find_member(find_vector(&root, device, property)?, member)?;

    member.text().trim().parse().ok()
}

/// Returns the index of the first saved member that is on.
pub fn get_config_on_switch_index(
    file: Option<&Path>,
    device: &str,
    property: &str,
) -> Option<usize> {
    let root = load_root(file, device)?;

    find_vector(&root, device, property)?
        .children()
        .iter()
        .position(|c| c.text().trim() == "On")
}

/// Returns the name of the first saved member that is on.
pub fn get_config_on_switch_name(
    file: Option<&Path>,
    device: &str,
    property: &str,
) -> Option<String> {
    let root = load_root(file, device)?;

    find_vector(&root, device, property)?
        .children()
        .iter()
        .find(|c| c.text().trim() == "On")
        .and_then(|c| c.attr("name"))
        .map(String::from)
}

/// Looks up one saved number value.
pub fn get_config_number(
    file: Option<&Path>,
    device: &str,
    property: &str,
    member: &str,
) -> Option<f64> {
    let root = load_root(file, device)?;
    let member = find_member(find_vector(&root, device, property)?, member)?;

    sexa::scan_sexa(member.text()).ok()
}

/// Looks up one saved text value.
pub fn get_config_text(
    file: Option<&Path>,
    device: &str,
    property: &str,
    member: &str,
) -> Option<String> {
    let root = load_root(file, device)?;
    let member = find_member(find_vector(&root, device, property)?, member)?;

    Some(String::from(member.text()))
}
