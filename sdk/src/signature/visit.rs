// Copyright 2022 Adobe. All rights reserved.
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

use super::{Graph, Signature, SignatureKind};

/// Iterator returned by [`Graph::visit_all`].
///
/// Children of a node are its countersignatures (only when the mask asks for
/// countersignature kinds) followed by its nested signatures. The walk keeps
/// an explicit stack so attacker-controlled nesting depth cannot exhaust the
/// call stack.
pub struct VisitAll<'a> {
    stack: Vec<&'a Signature>,
    kind: SignatureKind,
    deep: bool,
}

impl<'a> VisitAll<'a> {
    pub(super) fn new(graph: &'a Graph, kind: SignatureKind, deep: bool) -> Self {
        Self {
            stack: graph.signatures().iter().rev().collect(),
            kind,
            deep,
        }
    }
}

impl<'a> Iterator for VisitAll<'a> {
    type Item = &'a Signature;

    fn next(&mut self) -> Option<&'a Signature> {
        while let Some(signature) = self.stack.pop() {
            let matched = signature.kind().intersects(self.kind);

            if matched || self.deep {
                self.stack
                    .extend(signature.nested().signatures().iter().rev());

                if self.kind.intersects(SignatureKind::ANY_COUNTER_SIGNATURE) {
                    self.stack
                        .extend(signature.counter_signatures().signatures().iter().rev());
                }
            }

            if matched {
                return Some(signature);
            }
        }

        None
    }
}
