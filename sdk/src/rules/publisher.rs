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

use authlint_crypto::oids;
use log::debug;
use url::Url;

use super::{RuleDescriptor, RuleResult, SignatureRule};
use crate::{
    config::{CheckConfiguration, RuleSet},
    logger::SignatureLogger,
    publisher::PublisherInformation,
    signature::{Graph, Signature, SignatureKind},
};

fn publisher_information(signature: &Signature) -> Option<PublisherInformation> {
    let value = signature.signed_attributes().values(oids::OPUS_INFO).next()?;

    match PublisherInformation::from_der(value) {
        Ok(info) => Some(info),
        Err(err) => {
            debug!("unable to decode publisher information: {err}");
            None
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

fn is_https(url: &str) -> bool {
    let scheme = url.get(..6).unwrap_or_default();
    scheme.eq_ignore_ascii_case("https:")
}

/// Rule 10004
#[derive(Clone, Copy, Debug, Default)]
pub struct PublisherInformationPresentRule;

impl RuleDescriptor for PublisherInformationPresentRule {
    fn rule_id(&self) -> u32 {
        10004
    }

    fn rule_name(&self) -> &'static str {
        "Publisher Information Present"
    }

    fn short_description(&self) -> &'static str {
        "Checks that the signature provided publisher information."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for PublisherInformationPresentRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            let Some(info) = publisher_information(signature) else {
                logger.log_signature_message(
                    signature,
                    "Signature does not have any publisher information.",
                );
                result = RuleResult::Fail;
                continue;
            };

            if is_blank(info.description.as_deref()) {
                logger.log_signature_message(
                    signature,
                    "Signature does not have an accompanying description.",
                );
                result = RuleResult::Fail;
            }

            match info.url.as_deref() {
                url if is_blank(url) => {
                    logger.log_signature_message(
                        signature,
                        "Signature does not have an accompanying URL.",
                    );
                    result = RuleResult::Fail;
                }
                Some(url) if Url::parse(url.trim()).is_err() => {
                    logger.log_signature_message(
                        signature,
                        "Signature's accompanying URL is not a valid URI.",
                    );
                    result = RuleResult::Fail;
                }
                _ => {}
            }
        }

        result
    }
}

/// Rule 10005
#[derive(Clone, Copy, Debug, Default)]
pub struct PublisherInformationUrlHttpsRule;

impl RuleDescriptor for PublisherInformationUrlHttpsRule {
    fn rule_id(&self) -> u32 {
        10005
    }

    fn rule_name(&self) -> &'static str {
        "Publisher Information URL HTTPS Rule"
    }

    fn short_description(&self) -> &'static str {
        "Checks that the signature uses HTTPS for the publisher's URL."
    }

    fn rule_set(&self) -> RuleSet {
        RuleSet::ALL
    }
}

impl SignatureRule for PublisherInformationUrlHttpsRule {
    fn validate(
        &self,
        graph: &Graph,
        logger: &mut dyn SignatureLogger,
        _config: &CheckConfiguration,
    ) -> RuleResult {
        let mut result = RuleResult::Pass;

        for signature in graph.visit_all(SignatureKind::ANY_SIGNATURE, true) {
            let info = match publisher_information(signature) {
                Some(info) if !info.is_empty() => info,
                _ => {
                    logger.log_signature_message(
                        signature,
                        "Signature does not have any publisher information.",
                    );
                    result = RuleResult::Fail;
                    continue;
                }
            };

            match info.url.as_deref() {
                url if is_blank(url) => {
                    logger.log_signature_message(
                        signature,
                        "Signature does not have an accompanying URL.",
                    );
                    result = RuleResult::Fail;
                }
                Some(url) if !is_https(url) => {
                    logger.log_signature_message(
                        signature,
                        &format!(
                            "Signature's publisher information URL \"{url}\" does not use the secure HTTPS scheme."
                        ),
                    );
                    result = RuleResult::Fail;
                }
                _ => {}
            }
        }

        result
    }
}
