//! Vendor extension properties for 2.1/3.0 output.
//!
//! Address-book applications that predate vCard 4.0 carry gender, spouse,
//! anniversary and messenger handles in `X-` properties. Each transform
//! derives its properties from the canonical card and is enabled separately.

use std::fmt;

use kartei_core::config::CompatConfig;

use crate::rfc::vcard::core::{
    ParameterSet, PropertyKind, RelationKind, VCard, VCardProperty, VCardValue,
};

/// Derives extension properties from a card.
pub trait CompatTransform: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the properties to append; empty when the card has nothing to
    /// carry.
    fn synthesize(&self, card: &VCard) -> Vec<VCardProperty>;
}

/// Builds the transforms enabled in `config`.
#[must_use]
pub fn transforms_for(config: &CompatConfig) -> Vec<Box<dyn CompatTransform>> {
    let mut transforms: Vec<Box<dyn CompatTransform>> = Vec::new();
    if config.x_gender {
        transforms.push(Box::new(GenderExtension));
    }
    if config.x_spouse {
        transforms.push(Box::new(SpouseExtension));
    }
    if config.x_anniversary {
        transforms.push(Box::new(AnniversaryExtension));
    }
    if config.x_instant_messenger {
        transforms.push(Box::new(InstantMessengerExtension));
    }
    transforms
}

/// `GENDER` as `X-GENDER` and `X-WAB-GENDER`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenderExtension;

impl CompatTransform for GenderExtension {
    fn name(&self) -> &'static str {
        "gender"
    }

    fn synthesize(&self, card: &VCard) -> Vec<VCardProperty> {
        let Some(sex) = card
            .first(PropertyKind::Gender)
            .and_then(|p| p.value.component(0).or_else(|| p.as_text()))
        else {
            return Vec::new();
        };

        let (label, wab) = match sex.trim().to_ascii_uppercase().as_str() {
            "M" => ("Male", "2"),
            "F" => ("Female", "1"),
            _ => return Vec::new(),
        };
        vec![
            VCardProperty::text("X-GENDER", label),
            VCardProperty::text("X-WAB-GENDER", wab),
        ]
    }
}

/// A text `RELATED;TYPE=spouse` as the spouse extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpouseExtension;

impl CompatTransform for SpouseExtension {
    fn name(&self) -> &'static str {
        "spouse"
    }

    fn synthesize(&self, card: &VCard) -> Vec<VCardProperty> {
        let spouse = card
            .properties_of(PropertyKind::Related)
            .filter(|p| p.params.relation.contains(RelationKind::SPOUSE))
            .find_map(VCardProperty::as_text);

        spouse.map_or_else(Vec::new, |name| {
            ["X-SPOUSE", "X-EVOLUTION-SPOUSE", "X-MS-SPOUSE"]
                .into_iter()
                .map(|key| VCardProperty::text(key, name))
                .collect()
        })
    }
}

/// `ANNIVERSARY` as `YYYY-MM-DD` in the anniversary extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnniversaryExtension;

impl CompatTransform for AnniversaryExtension {
    fn name(&self) -> &'static str {
        "anniversary"
    }

    fn synthesize(&self, card: &VCard) -> Vec<VCardProperty> {
        let Some(date) = card
            .first(PropertyKind::Anniversary)
            .and_then(|p| p.value.as_date_and_or_time())
            .and_then(|value| value.date())
        else {
            return Vec::new();
        };

        let rendered = date.format("%Y-%m-%d").to_string();
        ["X-ANNIVERSARY", "X-EVOLUTION-ANNIVERSARY", "X-MS-ANNIVERSARY"]
            .into_iter()
            .map(|key| VCardProperty::text(key, rendered.clone()))
            .collect()
    }
}

const MESSENGER_SCHEMES: &[(&str, &str)] = &[
    ("aim", "X-AIM"),
    ("icq", "X-ICQ"),
    ("xmpp", "X-JABBER"),
    ("msnim", "X-MSN"),
    ("skype", "X-SKYPE"),
    ("ymsgr", "X-YAHOO"),
    ("gg", "X-GADUGADU"),
    ("gtalk", "X-GOOGLE-TALK"),
];

/// `IMPP` handles as the messenger-specific extension of their URI scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantMessengerExtension;

impl CompatTransform for InstantMessengerExtension {
    fn name(&self) -> &'static str {
        "instant-messenger"
    }

    fn synthesize(&self, card: &VCard) -> Vec<VCardProperty> {
        card.properties_of(PropertyKind::Impp)
            .filter_map(|impp| {
                let uri = impp.value.as_uri().or_else(|| impp.as_text())?;
                let (scheme, rest) = uri.split_once(':')?;
                let key = MESSENGER_SCHEMES
                    .iter()
                    .find(|(s, _)| s.eq_ignore_ascii_case(scheme.trim()))
                    .map(|(_, key)| *key)?;
                let handle = messenger_handle(rest);
                if handle.is_empty() {
                    return None;
                }

                let mut params = ParameterSet::new();
                params.usage = impp.params.usage;
                Some(VCardProperty {
                    group: impp.group.clone(),
                    name: key.to_string(),
                    params,
                    value: VCardValue::Text(handle.to_string()),
                })
            })
            .collect()
    }
}

/// Extracts the account from the scheme-specific part of an IM URI.
fn messenger_handle(rest: &str) -> &str {
    let rest = rest.trim().trim_start_matches("//");
    if let Some((_, query)) = rest.split_once("screenname=") {
        return query.split('&').next().unwrap_or_default();
    }
    rest.split('?').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::vcard::core::{DateAndOrTime, Usage, VCardVersion};
    use chrono::NaiveDate;

    fn card_with(properties: Vec<VCardProperty>) -> VCard {
        let mut card = VCard::with_version(VCardVersion::V4_0);
        for property in properties {
            card.add_property(property);
        }
        card
    }

    fn names(properties: &[VCardProperty]) -> Vec<&str> {
        properties.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn gender_extension() {
        let card = card_with(vec![VCardProperty::new(
            "GENDER",
            VCardValue::components(["F", "it's complicated"]),
        )]);
        let properties = GenderExtension.synthesize(&card);
        assert_eq!(names(&properties), ["X-GENDER", "X-WAB-GENDER"]);
        assert_eq!(properties[0].as_text(), Some("Female"));
        assert_eq!(properties[1].as_text(), Some("1"));

        let card = card_with(vec![VCardProperty::new("GENDER", VCardValue::components(["U"]))]);
        assert!(GenderExtension.synthesize(&card).is_empty());
    }

    #[test]
    fn spouse_extension_needs_text_value() {
        let mut params = ParameterSet::new();
        params.relation.insert(RelationKind::SPOUSE);
        let text = VCardProperty::text("RELATED", "Jane Doe").with_params(params.clone());
        let uri = VCardProperty::uri("RELATED", "urn:uuid:1234").with_params(params);

        let properties = SpouseExtension.synthesize(&card_with(vec![uri.clone(), text]));
        assert_eq!(
            names(&properties),
            ["X-SPOUSE", "X-EVOLUTION-SPOUSE", "X-MS-SPOUSE"]
        );
        assert!(properties.iter().all(|p| p.as_text() == Some("Jane Doe")));

        assert!(SpouseExtension.synthesize(&card_with(vec![uri])).is_empty());
    }

    #[test]
    fn anniversary_extension() {
        let date = NaiveDate::from_ymd_opt(2009, 8, 8).unwrap();
        let card = card_with(vec![VCardProperty::new(
            "ANNIVERSARY",
            DateAndOrTime::from(date),
        )]);
        let properties = AnniversaryExtension.synthesize(&card);
        assert_eq!(properties.len(), 3);
        assert!(properties.iter().all(|p| p.as_text() == Some("2009-08-08")));

        let partial = card_with(vec![VCardProperty::new(
            "ANNIVERSARY",
            DateAndOrTime::Partial("--0808".into()),
        )]);
        assert!(AnniversaryExtension.synthesize(&partial).is_empty());
    }

    #[test]
    fn messenger_extension_by_scheme() {
        let mut params = ParameterSet::new();
        params.usage.insert(Usage::WORK);
        let card = card_with(vec![
            VCardProperty::uri("IMPP", "xmpp:alice@example.com").with_params(params),
            VCardProperty::uri("IMPP", "aim:goim?screenname=alice42&message=hi"),
            VCardProperty::uri("IMPP", "sip:alice@example.com"),
        ]);
        let properties = InstantMessengerExtension.synthesize(&card);
        assert_eq!(names(&properties), ["X-JABBER", "X-AIM"]);
        assert_eq!(properties[0].as_text(), Some("alice@example.com"));
        assert!(properties[0].params.usage.contains(Usage::WORK));
        assert_eq!(properties[1].as_text(), Some("alice42"));
    }

    #[test]
    fn transforms_follow_flags() {
        let config = CompatConfig {
            x_gender: true,
            x_instant_messenger: true,
            ..CompatConfig::default()
        };
        let transforms = transforms_for(&config);
        let enabled: Vec<&str> = transforms.iter().map(|t| t.name()).collect();
        assert_eq!(enabled, ["gender", "instant-messenger"]);
        assert!(transforms_for(&CompatConfig::default()).is_empty());
    }
}
