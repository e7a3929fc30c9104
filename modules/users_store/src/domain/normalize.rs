//! Turns partial user records into fully-populated [`User`] values.
//!
//! Every missing field, top-level or nested, takes a fixed literal default.
//! Normalization never fails.

use crate::contract::model::{
    Address, Bank, Company, Coordinates, Crypto, Hair, RawAddress, RawUser, User, UserId,
    UserPatch,
};

/// Image assigned to optimistic placeholders that were created without one.
pub const PLACEHOLDER_IMAGE: &str = "https://robohash.org/default";

fn or_str(v: &Option<String>, default: &str) -> String {
    v.clone().unwrap_or_else(|| default.to_string())
}

/// Literal defaults for one embedded address block.
struct AddressDefaults {
    address: &'static str,
    city: &'static str,
    state: &'static str,
    postal_code: &'static str,
    lat: f64,
    lng: f64,
}

const HOME_ADDRESS: AddressDefaults = AddressDefaults {
    address: "626 Main Street",
    city: "Phoenix",
    state: "Mississippi",
    postal_code: "29112",
    lat: -77.16213,
    lng: -92.084824,
};

const COMPANY_ADDRESS: AddressDefaults = AddressDefaults {
    address: "263 Tenth Street",
    city: "San Francisco",
    state: "",
    postal_code: "",
    lat: 0.0,
    lng: 0.0,
};

fn normalize_address(raw: Option<&RawAddress>, d: &AddressDefaults) -> Address {
    let empty = RawAddress::default();
    let a = raw.unwrap_or(&empty);
    let coords = a.coordinates.unwrap_or_default();
    Address {
        address: or_str(&a.address, d.address),
        city: or_str(&a.city, d.city),
        state: or_str(&a.state, d.state),
        state_code: or_str(&a.state_code, ""),
        postal_code: or_str(&a.postal_code, d.postal_code),
        coordinates: Coordinates {
            lat: coords.lat.unwrap_or(d.lat),
            lng: coords.lng.unwrap_or(d.lng),
        },
        country: or_str(&a.country, ""),
    }
}

/// Build a complete user from a partial record.
pub fn normalize_user(data: &RawUser) -> User {
    let hair = data.hair.clone().unwrap_or_default();
    let bank = data.bank.clone().unwrap_or_default();
    let company = data.company.clone().unwrap_or_default();
    let crypto = data.crypto.clone().unwrap_or_default();

    User {
        id: data.id.unwrap_or(0),
        first_name: or_str(&data.first_name, ""),
        last_name: or_str(&data.last_name, ""),
        maiden_name: or_str(&data.maiden_name, ""),
        age: data.age.unwrap_or(0),
        gender: or_str(&data.gender, "male"),
        email: or_str(&data.email, ""),
        phone: or_str(&data.phone, ""),
        username: or_str(&data.username, ""),
        password: or_str(&data.password, ""),
        birth_date: or_str(&data.birth_date, ""),
        image: or_str(&data.image, ""),
        blood_group: or_str(&data.blood_group, "-O"),
        height: data.height.unwrap_or(193.24),
        weight: data.weight.unwrap_or(63.16),
        eye_color: or_str(&data.eye_color, "Green"),
        hair: Hair {
            color: or_str(&hair.color, "Brown"),
            kind: or_str(&hair.kind, "Curly"),
        },
        ip: or_str(&data.ip, "42.48.100.32"),
        address: normalize_address(data.address.as_ref(), &HOME_ADDRESS),
        mac_address: or_str(&data.mac_address, "47:fa:41:18:ec:eb"),
        university: or_str(&data.university, "University of Wisconsin--Madison"),
        bank: Bank {
            card_expire: or_str(&bank.card_expire, "05/28"),
            card_number: or_str(&bank.card_number, "3693233511855044"),
            card_type: or_str(&bank.card_type, "Diners Club International"),
            currency: or_str(&bank.currency, "GBP"),
            iban: or_str(&bank.iban, "GB74MH2UZLR9TRPHYNU8F8"),
        },
        company: Company {
            department: or_str(&company.department, "Sales"),
            name: or_str(&company.name, "Dooley, Kozey and Cronin"),
            title: or_str(&company.title, "Sales Manager"),
            address: normalize_address(company.address.as_ref(), &COMPANY_ADDRESS),
        },
        ein: or_str(&data.ein, ""),
        ssn: or_str(&data.ssn, ""),
        user_agent: or_str(&data.user_agent, ""),
        crypto: Crypto {
            coin: or_str(&crypto.coin, "Bitcoin"),
            wallet: or_str(&crypto.wallet, "0xb9fc2fe63b2a6c003f1c324c3bfa53259162181a"),
            network: or_str(&crypto.network, "Ethereum (ERC20)"),
        },
        role: or_str(&data.role, "user"),
    }
}

/// Placeholder shown while a create call is in flight.
pub fn optimistic_user(payload: &RawUser, temp_id: UserId) -> User {
    let mut raw = payload.clone();
    raw.id = Some(temp_id);
    raw.image = Some(or_str(&payload.image, PLACEHOLDER_IMAGE));
    normalize_user(&raw)
}

/// Shallow merge of `patch` over `current`, then normalize.
///
/// A nested object present in the patch replaces the whole nested object;
/// its missing fields fall back to defaults, not to the previous values.
pub fn merge_patch(current: &User, patch: &UserPatch) -> User {
    let base = RawUser::from(current);
    let merged = RawUser {
        id: patch.id.or(base.id),
        first_name: patch.first_name.clone().or(base.first_name),
        last_name: patch.last_name.clone().or(base.last_name),
        maiden_name: patch.maiden_name.clone().or(base.maiden_name),
        age: patch.age.or(base.age),
        gender: patch.gender.clone().or(base.gender),
        email: patch.email.clone().or(base.email),
        phone: patch.phone.clone().or(base.phone),
        username: patch.username.clone().or(base.username),
        password: patch.password.clone().or(base.password),
        birth_date: patch.birth_date.clone().or(base.birth_date),
        image: patch.image.clone().or(base.image),
        blood_group: patch.blood_group.clone().or(base.blood_group),
        height: patch.height.or(base.height),
        weight: patch.weight.or(base.weight),
        eye_color: patch.eye_color.clone().or(base.eye_color),
        hair: patch.hair.clone().or(base.hair),
        ip: patch.ip.clone().or(base.ip),
        address: patch.address.clone().or(base.address),
        mac_address: patch.mac_address.clone().or(base.mac_address),
        university: patch.university.clone().or(base.university),
        bank: patch.bank.clone().or(base.bank),
        company: patch.company.clone().or(base.company),
        ein: patch.ein.clone().or(base.ein),
        ssn: patch.ssn.clone().or(base.ssn),
        user_agent: patch.user_agent.clone().or(base.user_agent),
        crypto: patch.crypto.clone().or(base.crypto),
        role: patch.role.clone().or(base.role),
    };
    normalize_user(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{RawAddress, RawCompany, RawCoordinates};

    #[test]
    fn empty_record_gets_every_default() {
        let u = normalize_user(&RawUser::default());

        assert_eq!(u.id, 0);
        assert_eq!(u.first_name, "");
        assert_eq!(u.last_name, "");
        assert_eq!(u.maiden_name, "");
        assert_eq!(u.age, 0);
        assert_eq!(u.gender, "male");
        assert_eq!(u.email, "");
        assert_eq!(u.phone, "");
        assert_eq!(u.username, "");
        assert_eq!(u.password, "");
        assert_eq!(u.birth_date, "");
        assert_eq!(u.image, "");
        assert_eq!(u.blood_group, "-O");
        assert_eq!(u.height, 193.24);
        assert_eq!(u.weight, 63.16);
        assert_eq!(u.eye_color, "Green");
        assert_eq!(u.hair.color, "Brown");
        assert_eq!(u.hair.kind, "Curly");
        assert_eq!(u.ip, "42.48.100.32");

        assert_eq!(u.address.address, "626 Main Street");
        assert_eq!(u.address.city, "Phoenix");
        assert_eq!(u.address.state, "Mississippi");
        assert_eq!(u.address.state_code, "");
        assert_eq!(u.address.postal_code, "29112");
        assert_eq!(u.address.coordinates.lat, -77.16213);
        assert_eq!(u.address.coordinates.lng, -92.084824);
        assert_eq!(u.address.country, "");

        assert_eq!(u.mac_address, "47:fa:41:18:ec:eb");
        assert_eq!(u.university, "University of Wisconsin--Madison");

        assert_eq!(u.bank.card_expire, "05/28");
        assert_eq!(u.bank.card_number, "3693233511855044");
        assert_eq!(u.bank.card_type, "Diners Club International");
        assert_eq!(u.bank.currency, "GBP");
        assert_eq!(u.bank.iban, "GB74MH2UZLR9TRPHYNU8F8");

        assert_eq!(u.company.department, "Sales");
        assert_eq!(u.company.name, "Dooley, Kozey and Cronin");
        assert_eq!(u.company.title, "Sales Manager");
        assert_eq!(u.company.address.address, "263 Tenth Street");
        assert_eq!(u.company.address.city, "San Francisco");
        assert_eq!(u.company.address.state, "");
        assert_eq!(u.company.address.state_code, "");
        assert_eq!(u.company.address.postal_code, "");
        assert_eq!(u.company.address.coordinates.lat, 0.0);
        assert_eq!(u.company.address.coordinates.lng, 0.0);
        assert_eq!(u.company.address.country, "");

        assert_eq!(u.crypto.coin, "Bitcoin");
        assert_eq!(u.crypto.wallet, "0xb9fc2fe63b2a6c003f1c324c3bfa53259162181a");
        assert_eq!(u.crypto.network, "Ethereum (ERC20)");

        assert_eq!(u.role, "user");
        assert_eq!(u.ein, "");
        assert_eq!(u.ssn, "");
        assert_eq!(u.user_agent, "");
    }

    #[test]
    fn present_fields_win_over_defaults_at_every_depth() {
        let raw = RawUser {
            id: Some(5),
            first_name: Some("Ann".into()),
            role: Some("admin".into()),
            company: Some(RawCompany {
                name: Some("Acme".into()),
                address: Some(RawAddress {
                    city: Some("Oslo".into()),
                    coordinates: Some(RawCoordinates {
                        lat: Some(59.9),
                        lng: None,
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let u = normalize_user(&raw);
        assert_eq!(u.id, 5);
        assert_eq!(u.first_name, "Ann");
        assert_eq!(u.role, "admin");
        assert_eq!(u.company.name, "Acme");
        assert_eq!(u.company.department, "Sales");
        assert_eq!(u.company.address.city, "Oslo");
        assert_eq!(u.company.address.address, "263 Tenth Street");
        assert_eq!(u.company.address.coordinates.lat, 59.9);
        assert_eq!(u.company.address.coordinates.lng, 0.0);
    }

    #[test]
    fn optimistic_user_uses_temp_id_and_placeholder_image() {
        let payload = RawUser {
            id: Some(99),
            first_name: Some("Temp".into()),
            ..Default::default()
        };
        let u = optimistic_user(&payload, -1);
        assert_eq!(u.id, -1);
        assert_eq!(u.first_name, "Temp");
        assert_eq!(u.image, PLACEHOLDER_IMAGE);

        let with_image = RawUser {
            image: Some("https://example.com/a.png".into()),
            ..Default::default()
        };
        assert_eq!(optimistic_user(&with_image, -2).image, "https://example.com/a.png");
    }

    #[test]
    fn merge_patch_overlays_top_level_fields() {
        let current = normalize_user(&RawUser {
            id: Some(3),
            first_name: Some("Old".into()),
            email: Some("old@example.com".into()),
            ..Default::default()
        });
        let patch = UserPatch {
            first_name: Some("New".into()),
            ..Default::default()
        };

        let merged = merge_patch(&current, &patch);
        assert_eq!(merged.id, 3);
        assert_eq!(merged.first_name, "New");
        assert_eq!(merged.email, "old@example.com");
    }

    #[test]
    fn merge_patch_replaces_nested_objects_wholesale() {
        let current = normalize_user(&RawUser {
            address: Some(RawAddress {
                city: Some("Lisbon".into()),
                country: Some("Portugal".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let patch = UserPatch {
            address: Some(RawAddress {
                city: Some("Porto".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = merge_patch(&current, &patch);
        assert_eq!(merged.address.city, "Porto");
        // previous nested value is not carried over
        assert_eq!(merged.address.country, "");
        assert_eq!(merged.address.address, "626 Main Street");
    }
}
