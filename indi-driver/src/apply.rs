//! Applies peer-supplied values to driver-owned vectors.
//!
//! Every applicator runs two passes over the locked vector: a
//! validation pass first, then a mutation pass only if every entry
//! validated. A failing batch leaves the vector's values untouched,
//! flags its state, reports the problem to the peer and returns the
//! same text as an error.

use crate::driver::BlobPayload;
use crate::types::property::{
    BlobVector, NumberVector, PropertyState, SwitchRule, SwitchState,
    SwitchVector, TextVector,
};
use crate::types::Error;
use crate::{Result, Runtime};
use std::sync::Arc;
use tokio::sync::Mutex;

impl Runtime {
    /// Copies `values` into the named members of `vp`. Each value
    /// must land inside its member's `[min, max]`; the whole batch is
    /// rejected if any name is unknown or any value is out of range.
    pub async fn apply_numbers(
        &self,
        vp: &Arc<Mutex<NumberVector>>,
        values: &[(String, f64)],
    ) -> Result<()> {
        let failure = {
            let mut v = vp.lock().await;
            let mut failure = None;

            for (name, value) in values {
                match v.find(name) {
                    None => {
                        failure = Some(format!(
                            "{} is not a member of {}",
                            name, v.name
                        ));
                        break;
                    }
                    Some(n) if *value < n.min || *value > n.max => {
                        failure = Some(format!(
                            "Value {} for {} is out of range. \
                             Valid range is from {} to {}",
                            value, name, n.min, n.max
                        ));
                        break;
                    }
                    Some(_) => (),
                }
            }

            if failure.is_none() {
                for (name, value) in values {
                    if let Some(n) = v.find_mut(name) {
                        n.value = *value
                    }
                }
            } else {
                v.state = PropertyState::Alert;
            }
            failure
        };

        match failure {
            None => Ok(()),
            Some(msg) => {
                self.set_number(vp, Some(&msg)).await?;
                Err(Error::ProtocolError(msg))
            }
        }
    }

    /// Copies `states` into the named members of `vp`, enforcing the
    /// vector's switch rule. A `OneOfMany` batch that would leave
    /// zero or several members on is rolled back whole.
    pub async fn apply_switches(
        &self,
        vp: &Arc<Mutex<SwitchVector>>,
        states: &[(String, SwitchState)],
    ) -> Result<()> {
        let failure = {
            let mut v = vp.lock().await;
            let mut failure = None;

            for (name, _) in states {
                if v.find(name).is_none() {
                    failure = Some(format!(
                        "{} is not a member of {}",
                        name, v.name
                    ));
                    break;
                }
            }

            if failure.is_none() {
                if v.rule == SwitchRule::OneOfMany {
                    let previous = v.on_index();

                    v.reset();

                    for (name, state) in states {
                        if let Some(s) = v.find_mut(name) {
                            s.state = *state
                        }
                    }

                    let on = v
                        .switches
                        .iter()
                        .filter(|s| s.state == SwitchState::On)
                        .count();

                    if on != 1 {
                        v.reset();

                        if let Some(i) = previous {
                            v.switches[i].state = SwitchState::On
                        }

                        failure = Some(String::from(if on == 0 {
                            "No switch is on."
                        } else {
                            "Too many switches are on."
                        }));
                    }
                } else {
                    for (name, state) in states {
                        if let Some(s) = v.find_mut(name) {
                            s.state = *state
                        }
                    }
                }
            }

            if failure.is_some() {
                v.state = PropertyState::Idle;
            }
            failure
        };

        match failure {
            None => Ok(()),
            Some(msg) => {
                self.set_switch(vp, Some(&msg)).await?;
                Err(Error::ProtocolError(msg))
            }
        }
    }

    /// Replaces the values of the named text members.
    pub async fn apply_texts(
        &self,
        vp: &Arc<Mutex<TextVector>>,
        texts: &[(String, String)],
    ) -> Result<()> {
        let failure = {
            let mut v = vp.lock().await;
            let mut failure = None;

            for (name, _) in texts {
                if v.find(name).is_none() {
                    failure = Some(format!(
                        "{} is not a member of {}",
                        name, v.name
                    ));
                    break;
                }
            }

            if failure.is_none() {
                for (name, value) in texts {
                    if let Some(t) = v.find_mut(name) {
                        t.value = value.clone()
                    }
                }
            } else {
                v.state = PropertyState::Idle;
            }
            failure
        };

        match failure {
            None => Ok(()),
            Some(msg) => {
                self.set_text(vp, Some(&msg)).await?;
                Err(Error::ProtocolError(msg))
            }
        }
    }

    /// Stores incoming payloads in the named BLOB members. The
    /// payloads are consumed; their buffers move into the vector.
    pub async fn apply_blobs(
        &self,
        vp: &Arc<Mutex<BlobVector>>,
        payloads: Vec<BlobPayload>,
    ) -> Result<()> {
        let (device, failure) = {
            let mut v = vp.lock().await;
            let mut failure = None;

            for payload in &payloads {
                if v.find(&payload.name).is_none() {
                    failure = Some(format!(
                        "{} is not a member of {}",
                        payload.name, v.name
                    ));
                    break;
                }
            }

            if failure.is_none() {
                for payload in payloads {
                    if let Some(b) = v.find_mut(&payload.name) {
                        b.size = payload.size;
                        b.bloblen = payload.bloblen;
                        b.format = payload.format;
                        b.data = payload.data;
                    }
                }
            } else {
                v.state = PropertyState::Alert;
            }
            (v.device.clone(), failure)
        };

        match failure {
            None => Ok(()),
            Some(msg) => {
                self.message(Some(&device), &msg).await?;
                Err(Error::ProtocolError(msg))
            }
        }
    }
}
