// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Per-signature diagnostics produced while rules run.

use log::debug;

use crate::signature::Signature;

/// Receives the human-readable findings of a rule.
///
/// Messages tied to a signature are prefixed with its identity so findings
/// can be told apart when a file carries several signatures.
pub trait SignatureLogger {
    /// Record a message about `signature`.
    fn log_signature_message(&mut self, signature: &Signature, message: &str);

    /// Record a message that is not tied to a signature.
    fn log_message(&mut self, message: &str);
}

/// A [`SignatureLogger`] that keeps every message in order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemorySignatureLogger {
    messages: Vec<String>,
}

impl MemorySignatureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl SignatureLogger for MemorySignatureLogger {
    fn log_signature_message(&mut self, signature: &Signature, message: &str) {
        let message = match signature.identity() {
            Some(identity) => format!("Signature {identity}: {message}"),
            None => message.to_owned(),
        };
        debug!("{message}");
        self.messages.push(message);
    }

    fn log_message(&mut self, message: &str) {
        debug!("{message}");
        self.messages.push(message.to_owned());
    }
}

/// A [`SignatureLogger`] that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSignatureLogger;

impl SignatureLogger for NullSignatureLogger {
    fn log_signature_message(&mut self, _signature: &Signature, _message: &str) {}

    fn log_message(&mut self, _message: &str) {}
}
