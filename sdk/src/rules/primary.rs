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

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    signature::Graph,
};

/// Rule 10014: only one signature sits at the top level; further
/// signatures belong in the nested attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct SinglePrimarySignatureRule;

impl RuleDescriptor for SinglePrimarySignatureRule {
    fn rule_id(&self) -> u32 {
        10014
    }

    fn rule_name(&self) -> &'static str {
        "Single primary signature"
    }

    fn short_description(&self) -> &'static str {
        "Limit to a single primary signature."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for SinglePrimarySignatureRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        if graph.len() > 1 {
            logger.log_message("Multiple primary signatures exist.");
            return RuleResult::Fail;
        }
        RuleResult::Pass
    }
}
