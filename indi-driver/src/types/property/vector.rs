//! The vector property containers and their members.
//!
//! Storage for these values is owned by the driver; the runtime only
//! holds shared references to them (see the registry). Fields are
//! public so drivers can build vectors with struct literals.

use super::{Permission, PropertyState, SwitchRule, SwitchState};

/// One numeric member. `format` is a printf-like specification used
/// when the value is put on the wire; a trailing `m` selects the
/// sexagesimal form.
#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub name: String,
    pub label: String,
    pub format: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl Number {
    pub fn new(
        name: &str,
        label: &str,
        format: &str,
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    ) -> Number {
        Number {
            name: String::from(name),
            label: String::from(label),
            format: String::from(format),
            min,
            max,
            step,
            value,
        }
    }
}

/// A named, ordered collection of numeric members.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberVector {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub perm: Permission,
    pub timeout: f64,
    pub state: PropertyState,
    pub numbers: Vec<Number>,
}

impl NumberVector {
    pub fn find(&self, name: &str) -> Option<&Number> {
        self.numbers.iter().find(|n| n.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Number> {
        self.numbers.iter_mut().find(|n| n.name == name)
    }
}

/// One switch member.
#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub name: String,
    pub label: String,
    pub state: SwitchState,
}

impl Switch {
    pub fn new(name: &str, label: &str, state: SwitchState) -> Switch {
        Switch {
            name: String::from(name),
            label: String::from(label),
            state,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchVector {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub perm: Permission,
    pub rule: SwitchRule,
    pub timeout: f64,
    pub state: PropertyState,
    pub switches: Vec<Switch>,
}

impl SwitchVector {
    pub fn find(&self, name: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Switch> {
        self.switches.iter_mut().find(|s| s.name == name)
    }

    /// Returns the first member that is on.
    pub fn on_switch(&self) -> Option<&Switch> {
        self.switches.iter().find(|s| s.state == SwitchState::On)
    }

    /// Returns the index of the first member that is on.
    pub fn on_index(&self) -> Option<usize> {
        self.switches.iter().position(|s| s.state == SwitchState::On)
    }

    /// Turns every member off.
    pub fn reset(&mut self) {
        for s in self.switches.iter_mut() {
            s.state = SwitchState::Off
        }
    }
}

/// One text member.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl Text {
    pub fn new(name: &str, label: &str, value: &str) -> Text {
        Text {
            name: String::from(name),
            label: String::from(label),
            value: String::from(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextVector {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub perm: Permission,
    pub timeout: f64,
    pub state: PropertyState,
    pub texts: Vec<Text>,
}

impl TextVector {
    pub fn find(&self, name: &str) -> Option<&Text> {
        self.texts.iter().find(|t| t.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Text> {
        self.texts.iter_mut().find(|t| t.name == name)
    }
}

/// One light member. Lights reuse the vector state vocabulary for
/// their value.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub name: String,
    pub label: String,
    pub state: PropertyState,
}

impl Light {
    pub fn new(name: &str, label: &str, state: PropertyState) -> Light {
        Light {
            name: String::from(name),
            label: String::from(label),
            state,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightVector {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub state: PropertyState,
    pub lights: Vec<Light>,
}

impl LightVector {
    pub fn find(&self, name: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.name == name)
    }
}

/// One binary member. `size` is the advertised payload size and
/// `bloblen` the byte count actually held in `data`; the two differ
/// when the payload is compressed. `format` is a suffix describing
/// the encoding (".fits", ".z", ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub name: String,
    pub label: String,
    pub format: String,
    pub size: i64,
    pub bloblen: i64,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(name: &str, label: &str) -> Blob {
        Blob {
            name: String::from(name),
            label: String::from(label),
            format: String::new(),
            size: 0,
            bloblen: 0,
            data: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlobVector {
    pub device: String,
    pub name: String,
    pub label: String,
    pub group: String,
    pub perm: Permission,
    pub timeout: f64,
    pub state: PropertyState,
    pub blobs: Vec<Blob>,
}

impl BlobVector {
    pub fn find(&self, name: &str) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Blob> {
        self.blobs.iter_mut().find(|b| b.name == name)
    }
}
